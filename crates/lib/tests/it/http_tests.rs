//! Find command rendering and response parsing, without a live server.

use serde_json::json;
use tabula::{
    config::ClientConfig,
    cursor::{PageState, QuerySpec},
    doc::{Doc, Value},
    http::{FindCommand, HttpPageFetcher, TransportError, parse_find_response},
};

#[test]
fn test_find_command_with_all_options() {
    let query = QuerySpec::new()
        .with_filter(Doc::new().with("meta.k", 1))
        .with_projection(Doc::new().with("name", 1))
        .with_sort(Doc::new().with("age", -1))
        .with_skip(5)
        .with_limit(10)
        .with_include_sort_vector(true)
        .with_page_size(50);
    let token = PageState::new("abc");

    let json = FindCommand::from_query(&query, Some(&token))
        .to_json()
        .unwrap();

    assert_eq!(
        json,
        json!({
            "find": {
                "filter": {"meta.k": 1},
                "projection": {"name": 1},
                "sort": {"age": -1},
                "options": {
                    "skip": 5,
                    "limit": 10,
                    "includeSortVector": true,
                    "pageState": "abc"
                }
            }
        })
    );
}

#[test]
fn test_find_command_uses_extended_json() {
    let query = QuerySpec::new().with_filter(Doc::new().with("blob", &[1u8, 2, 3][..]));
    let json = FindCommand::from_query(&query, None).to_json().unwrap();
    assert_eq!(json["find"]["filter"]["blob"], json!({"$binary": "AQID"}));
}

#[test]
fn test_parse_response_page() {
    let response = json!({
        "data": {
            "documents": [{"_id": 1, "name": "ada"}, {"_id": 2, "name": "alan"}],
            "nextPageState": "tok-2"
        },
        "status": {"sortVector": [0.5, 1.0]}
    });

    let page = parse_find_response(&response).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].get("name"), Some(&Value::from("alan")));
    assert_eq!(page.next_page_state.as_ref().map(PageState::as_str), Some("tok-2"));
    assert_eq!(page.sort_vector, Some(vec![0.5, 1.0]));
    assert!(page.has_more());
}

#[test]
fn test_parse_last_page() {
    let response = json!({"data": {"documents": [], "nextPageState": null}});
    let page = parse_find_response(&response).unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_more());
    assert_eq!(page.sort_vector, None);
}

#[test]
fn test_parse_api_errors() {
    let response = json!({
        "errors": [{"message": "no such collection"}, {"message": "bad filter"}]
    });
    let err = parse_find_response(&response).unwrap_err();
    assert!(err.is_transport_error());
    assert_eq!(
        err.to_string(),
        "Server reported errors: no such collection; bad filter"
    );
}

#[test]
fn test_parse_malformed_responses() {
    for response in [
        json!({}),
        json!({"data": {}}),
        json!({"data": {"documents": [1]}}),
        json!({"data": {"documents": [], "nextPageState": 3}}),
        json!({"data": {"documents": []}, "status": {"sortVector": ["x"]}}),
    ] {
        assert!(parse_find_response(&response).is_err(), "{response}");
    }
}

#[test]
fn test_status_accessor() {
    let err = TransportError::Status {
        status: 503,
        body: String::new(),
    };
    assert_eq!(err.status(), Some(503));
    assert!(!err.is_api_error());
}

#[test]
fn test_fetcher_targets_collection_url() {
    let config = ClientConfig {
        keyspace: "shop".to_string(),
        token: Some("secret".to_string()),
        ..Default::default()
    };
    let fetcher = HttpPageFetcher::new(&config, "orders").unwrap();

    assert_eq!(
        fetcher.url().as_str(),
        "http://localhost:8181/api/json/v1/shop/orders"
    );
    let rendered = format!("{fetcher:?}");
    assert!(rendered.contains("has_token: true"));
    assert!(!rendered.contains("secret"));
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let config = ClientConfig {
        // Reserved port that nothing listens on
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout_ms: 500,
        ..Default::default()
    };
    let fetcher = HttpPageFetcher::new(&config, "items").unwrap();
    let mut cursor = fetcher.cursor(QuerySpec::new());

    let err = cursor.has_next().unwrap_err();
    assert!(err.is_transport_error());
}
