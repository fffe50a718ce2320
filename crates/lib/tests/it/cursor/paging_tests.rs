use tabula::{
    CursorState,
    cursor::{Cursor, Page, PageState, QuerySpec},
};

use crate::helpers::{CountingFetcher, FlakyFetcher};

#[test]
fn test_pages_fetched_lazily() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();

    let mut seen = Vec::new();
    while cursor.has_next().unwrap() {
        seen.push(cursor.try_next().unwrap().unwrap());
        // Never more than one page ahead of the consumer
        assert_eq!(fetcher.call_count(), seen.len().div_ceil(2).max(1));
    }

    assert_eq!(seen, [0, 1, 2, 3, 4]);
    assert_eq!(cursor.consumed(), 5);
    assert_eq!(cursor.pages_fetched(), 3);
    assert!(!cursor.has_next().unwrap());
    assert_eq!(fetcher.call_count(), 3);
}

#[test]
fn test_page_states_are_passed_back() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();
    cursor.iter().for_each(drop);

    assert_eq!(
        fetcher.calls(),
        [None, Some("2".to_string()), Some("4".to_string())]
    );
}

#[test]
fn test_empty_pages_with_token_are_skipped() {
    let fetcher = |_: &QuerySpec, state: Option<&PageState>| {
        Ok::<_, tabula::Error>(match state.map(PageState::as_str) {
            None => Page::empty().with_next_page_state("1"),
            Some("1") => Page::empty().with_next_page_state("2"),
            _ => Page::new(vec!["last"]),
        })
    };
    let mut cursor = Cursor::from_fetcher(fetcher, QuerySpec::new());

    assert!(cursor.has_next().unwrap());
    assert_eq!(cursor.pages_fetched(), 3);
    assert!(cursor.to_list().unwrap_err().is_cursor_state_error());
    assert_eq!(cursor.try_next().unwrap(), Some("last"));
}

#[test]
fn test_empty_result_set() {
    let fetcher = CountingFetcher::new(0, 3);
    let mut cursor = fetcher.cursor();
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.state(), CursorState::Started);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_failed_fetch_retries_same_page() {
    let fetcher = FlakyFetcher::new(1);
    let mut cursor = Cursor::from_fetcher(fetcher, QuerySpec::new());

    assert_eq!(cursor.try_next().unwrap(), Some("a"));
    assert_eq!(cursor.try_next().unwrap(), Some("b"));

    let err = cursor.try_next().unwrap_err();
    assert!(err.is_transport_error());
    assert_eq!(cursor.state(), CursorState::Started);
    assert_eq!(cursor.consumed(), 2);

    assert_eq!(cursor.try_next().unwrap(), Some("c"));
    assert_eq!(cursor.try_next().unwrap(), None);
}

#[test]
fn test_retry_reuses_page_state() {
    let fetcher = std::sync::Arc::new(FlakyFetcher::new(2));
    let mut cursor: Cursor<&'static str> =
        Cursor::new(fetcher.clone(), QuerySpec::new());

    let results: Vec<_> = cursor.iter().take(6).collect();
    let ok: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(ok, [&"a", &"b", &"c"]);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 2);

    let calls = fetcher.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        [
            None,
            Some("p2".to_string()),
            Some("p2".to_string()),
            Some("p2".to_string())
        ]
    );
}

#[test]
fn test_to_list_closes_on_failure() {
    let mut cursor = Cursor::from_fetcher(FlakyFetcher::new(1), QuerySpec::new());

    assert!(cursor.to_list().is_err());
    assert_eq!(cursor.state(), CursorState::Closed);
    assert!(cursor.to_list().unwrap().is_empty());
}

#[test]
fn test_stream_stops_after_first_error() {
    let mut cursor = Cursor::from_fetcher(FlakyFetcher::new(5), QuerySpec::new());

    let results: Vec<_> = cursor.stream().unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[2].is_err());
    assert_eq!(cursor.state(), CursorState::Closed);
}

#[test]
fn test_stream_closes_when_dropped_early() {
    let fetcher = CountingFetcher::new(10, 2);
    let mut cursor = fetcher.cursor();
    {
        let mut stream = cursor.stream().unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), 0);
    }
    assert_eq!(cursor.state(), CursorState::Closed);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_for_each_visits_all() {
    let fetcher = CountingFetcher::new(7, 3);
    let mut cursor = fetcher.cursor();
    let mut sum = 0;
    cursor.for_each(|n| sum += n).unwrap();
    assert_eq!(sum, 21);
    assert_eq!(cursor.state(), CursorState::Closed);
}

#[test]
fn test_map_transforms_items() {
    let fetcher = CountingFetcher::new(4, 3);
    let cursor = fetcher.cursor();
    let mut doubled = cursor.map(|n| n * 2).unwrap();

    assert_eq!(doubled.to_list().unwrap(), [0, 2, 4, 6]);
    assert_eq!(cursor.state(), CursorState::Idle);
}

#[test]
fn test_consume_buffer_does_not_fetch() {
    let fetcher = CountingFetcher::new(5, 3);
    let mut cursor = fetcher.cursor();
    assert_eq!(cursor.consume_buffer(2), Vec::<usize>::new());

    cursor.has_next().unwrap();
    assert_eq!(cursor.consume_buffer(5), [0, 1, 2]);
    assert_eq!(cursor.consumed(), 3);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_sort_vector_from_first_page() {
    let fetcher = |_: &QuerySpec, state: Option<&PageState>| {
        Ok::<_, tabula::Error>(match state {
            None => Page::new(vec![1, 2])
                .with_sort_vector(vec![0.5, 0.25])
                .with_next_page_state("next"),
            Some(_) => Page::new(vec![3]).with_sort_vector(vec![9.0]),
        })
    };
    let mut cursor = Cursor::from_fetcher(fetcher, QuerySpec::new())
        .include_sort_vector(true)
        .unwrap();

    assert_eq!(cursor.sort_vector().unwrap(), Some(&[0.5f32, 0.25][..]));
    assert_eq!(cursor.state(), CursorState::Started);
    cursor.iter().for_each(drop);
    assert_eq!(cursor.sort_vector().unwrap(), Some(&[0.5f32, 0.25][..]));
}
