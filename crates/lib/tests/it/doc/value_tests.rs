use chrono::{TimeZone, Utc};
use tabula::doc::{Doc, DocError, List, Value};
use uuid::Uuid;

#[test]
fn test_value_type_names() {
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::from(1.5).type_name(), "float");
    assert_eq!(Value::from(Doc::new()).type_name(), "doc");
    assert_eq!(Value::from(List::new()).type_name(), "list");
}

#[test]
fn test_scalar_and_container_classification() {
    assert!(Value::Null.is_scalar());
    assert!(Value::from(Uuid::nil()).is_scalar());
    assert!(Value::from(List::new()).is_container());
    assert!(!Value::from("text").is_container());
}

#[test]
fn test_option_conversion() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn test_try_from_widening() {
    let int = Value::Int(3);
    assert_eq!(f64::try_from(&int).unwrap(), 3.0);
    assert_eq!(i32::try_from(&int).unwrap(), 3);

    let float = Value::Float(3.0);
    let err = i64::try_from(&float).unwrap_err();
    assert!(matches!(err, DocError::TypeMismatch { .. }));
}

#[test]
fn test_timestamp_and_uuid_accessors() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let id = Uuid::new_v4();
    let doc = Doc::new().with("at", ts).with("id", id);

    assert_eq!(doc.get("at").and_then(Value::as_timestamp), Some(ts));
    assert_eq!(doc.get("id").and_then(Value::as_uuid), Some(id));
    assert_eq!(doc.get("at").unwrap().to_string(), "2024-05-01T12:00:00+00:00");
}

#[test]
fn test_display_nested() {
    let mut doc = Doc::new().with("n", 1);
    doc.append("meta.tags", vec![Value::from("a"), Value::from(true)])
        .unwrap();
    assert_eq!(doc.to_string(), "{n: 1, meta: {tags: [a, true]}}");
}
