use tabula::{Cursor, CursorState, cursor::CursorError, doc::Doc};

use crate::helpers::{CountingFetcher, tagged_collection};

#[test]
fn test_new_cursor_is_idle() {
    let fetcher = CountingFetcher::new(5, 2);
    let cursor = fetcher.cursor();
    assert_eq!(cursor.state(), CursorState::Idle);
    assert_eq!(cursor.consumed(), 0);
    assert_eq!(fetcher.call_count(), 0);
}

#[test]
fn test_has_next_starts_cursor() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();

    assert!(cursor.has_next().unwrap());
    assert_eq!(cursor.state(), CursorState::Started);
    assert_eq!(cursor.buffered(), 2);
    assert_eq!(cursor.consumed(), 0);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_mutator_on_idle_returns_new_cursor() {
    let collection = tagged_collection(4, 10);
    let original = collection.find_all();
    let limited = original.limit(2).unwrap();

    assert_eq!(original.query().limit(), None);
    assert_eq!(limited.query().limit(), Some(2));
    assert_eq!(limited.state(), CursorState::Idle);
}

#[test]
fn test_mutator_on_started_is_rejected() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();
    cursor.try_next().unwrap();

    let err = cursor.limit(1).unwrap_err();
    assert!(err.is_cursor_state_error());
    match err {
        tabula::Error::Cursor(CursorError::InvalidState { state, operation }) => {
            assert_eq!(state, CursorState::Started);
            assert_eq!(operation, "limit");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mutator_on_closed_is_rejected() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();
    cursor.close();

    let err = cursor.filter(Doc::new()).unwrap_err();
    assert_eq!(err.to_string(), "Cannot filter a cursor in state closed");
}

#[test]
fn test_close_mid_iteration() {
    let fetcher = CountingFetcher::new(10, 3);
    let mut cursor = fetcher.cursor();
    assert_eq!(cursor.try_next().unwrap(), Some(0));

    cursor.close();
    assert_eq!(cursor.state(), CursorState::Closed);
    assert_eq!(cursor.buffered(), 0);
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.try_next().unwrap(), None);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_close_is_idempotent() {
    let fetcher = CountingFetcher::new(3, 3);
    let mut cursor = fetcher.cursor();
    cursor.close();
    cursor.close();
    assert_eq!(cursor.state(), CursorState::Closed);
    assert_eq!(fetcher.call_count(), 0);
}

#[test]
fn test_exhausted_cursor_stays_started() {
    let fetcher = CountingFetcher::new(2, 5);
    let mut cursor = fetcher.cursor();
    assert_eq!(cursor.iter().count(), 2);

    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.state(), CursorState::Started);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_bulk_operations_reject_started_cursor() {
    let fetcher = CountingFetcher::new(4, 2);
    let mut cursor = fetcher.cursor();
    cursor.try_next().unwrap();

    assert!(cursor.to_list().unwrap_err().is_cursor_state_error());
    assert!(cursor.for_each(|_| {}).unwrap_err().is_cursor_state_error());
    assert!(cursor.stream().is_err());
    // A rejected bulk call leaves the cursor usable
    assert_eq!(cursor.try_next().unwrap(), Some(1));
}

#[test]
fn test_rewind_restarts_from_first_page() {
    let fetcher = CountingFetcher::new(3, 2);
    let mut cursor = fetcher.cursor();
    assert_eq!(cursor.try_next().unwrap(), Some(0));
    assert_eq!(cursor.try_next().unwrap(), Some(1));

    cursor.rewind().unwrap();
    assert_eq!(cursor.state(), CursorState::Idle);
    assert_eq!(cursor.consumed(), 0);
    assert_eq!(cursor.to_list().unwrap(), [0, 1, 2]);
    let second = Some("2".to_string());
    assert_eq!(fetcher.calls(), [None, None, second]);
}

#[test]
fn test_closed_cursor_cannot_be_rewound() {
    let fetcher = CountingFetcher::new(3, 2);
    let mut cursor = fetcher.cursor();
    assert_eq!(cursor.to_list().unwrap(), [0, 1, 2]);
    let fetches = fetcher.call_count();

    let err = cursor.rewind().unwrap_err();
    match err {
        tabula::Error::Cursor(CursorError::InvalidState { state, operation }) => {
            assert_eq!(state, CursorState::Closed);
            assert_eq!(operation, "rewind");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(cursor.state(), CursorState::Closed);
    assert!(cursor.to_list().unwrap().is_empty());
    assert_eq!(fetcher.call_count(), fetches);
}

#[test]
fn test_for_each_panic_still_closes() {
    let fetcher = CountingFetcher::new(5, 2);
    let mut cursor = fetcher.cursor();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        cursor.for_each(|n| {
            if n == 1 {
                panic!("consumer failed");
            }
        })
    }));

    assert!(outcome.is_err());
    assert_eq!(cursor.state(), CursorState::Closed);
    assert_eq!(cursor.buffered(), 0);
    assert!(!cursor.has_next().unwrap());
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_debug_output() {
    let cursor: Cursor<usize> = CountingFetcher::new(1, 1).cursor();
    let debug = format!("{cursor:?}");
    assert!(debug.contains("state: Idle"));
    assert!(debug.contains("consumed: 0"));
}
