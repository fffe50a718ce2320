use serde::{Deserialize, Serialize};
use serde_json::json;
use tabula::doc::{Doc, Value};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Product {
    name: String,
    price: f64,
    tags: Vec<String>,
    #[serde(rename = "meta.v2")]
    dotted: bool,
}

#[test]
fn test_dotted_keys_round_trip_verbatim() {
    let json = json!({"a.b": {"c&d": 1}});
    let doc = Doc::from_json(&json).unwrap();

    assert!(doc.get("a.b").is_some());
    assert_eq!(doc.read_i64("a&.b.c&&d").unwrap(), Some(1));
    assert_eq!(doc.to_json(), json);
}

#[test]
fn test_key_order_is_preserved() {
    let doc = Doc::parse_json(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
    assert_eq!(doc.to_json_string(), r#"{"z":1,"a":2,"m":3}"#);
}

#[test]
fn test_object_mapping() {
    let product = Product {
        name: "lamp".to_string(),
        price: 12.5,
        tags: vec!["home".to_string()],
        dotted: true,
    };

    let doc = Doc::from_object(&product).unwrap();
    assert_eq!(doc.get("meta.v2"), Some(&Value::Bool(true)));
    assert_eq!(doc.read_string("tags.0").unwrap(), Some("home".to_string()));

    let back: Product = doc.to_object().unwrap();
    assert_eq!(back, product);
}

#[test]
fn test_to_object_failure_is_serialization_error() {
    let doc = Doc::new().with("name", 5);
    let err = doc.to_object::<Product>().unwrap_err();
    assert!(err.is_serialization_error());
}

#[test]
fn test_parse_json_rejects_non_objects() {
    assert!(Doc::parse_json("[1, 2]").is_err());
    let err = Doc::parse_json("{not json").unwrap_err();
    assert!(matches!(err, tabula::Error::Serialize(_)));
}

#[test]
fn test_serde_through_serde_json() {
    let mut doc = Doc::new();
    doc.append("meta.k", 1).unwrap();

    let text = serde_json::to_string(&doc).unwrap();
    assert_eq!(text, r#"{"meta":{"k":1}}"#);

    let back: Doc = serde_json::from_str(&text).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_null_survives_round_trip() {
    let doc = Doc::from_json(&json!({"gone": null})).unwrap();
    assert_eq!(doc.read("gone").unwrap(), Some(&Value::Null));
    assert_eq!(doc.to_json(), json!({"gone": null}));
}
