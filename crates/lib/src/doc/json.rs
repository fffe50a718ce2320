//! JSON conversion for documents.
//!
//! Documents travel over the wire as JSON objects. Scalars without a JSON
//! counterpart use single-key wrapper objects:
//!
//! | Value | JSON |
//! |---|---|
//! | `Timestamp` | `{"$date": <epoch millis>}` |
//! | `Uuid` | `{"$uuid": "<hyphenated>"}` |
//! | `Binary` | `{"$binary": "<base64>"}` |
//!
//! Keys are copied with literal access only, so a key containing `.` or `&`
//! survives a round trip unchanged.
//!
//! ```
//! use serde_json::json;
//! use tabula::doc::Doc;
//!
//! let doc = Doc::from_json(&json!({"a.b": 1, "meta": {"k": [true, null]}}))?;
//! assert!(doc.get("a.b").is_some());
//! assert_eq!(doc.read_bool("meta.k.0")?, Some(true));
//! assert_eq!(doc.to_json_string(), r#"{"a.b":1,"meta":{"k":[true,null]}}"#);
//! # Ok::<(), tabula::Error>(())
//! ```

use base64ct::{Base64, Encoding};
use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Map, Number, Value as Json};
use uuid::Uuid;

use super::{Doc, errors::DocError, list::List, value::Value};
use crate::constants::{BINARY_KEY, DATE_KEY, UUID_KEY};

impl Value {
    /// Converts this value to JSON.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::Number((*n).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Binary(bytes) => wrapper(BINARY_KEY, Json::String(Base64::encode_string(bytes))),
            Value::Timestamp(ts) => wrapper(DATE_KEY, Json::Number(ts.timestamp_millis().into())),
            Value::Uuid(id) => wrapper(UUID_KEY, Json::String(id.to_string())),
            Value::List(list) => Json::Array(list.iter().map(Value::to_json).collect()),
            Value::Doc(doc) => doc.to_json(),
        }
    }

    /// Converts JSON into a value.
    ///
    /// Integers that fit in `i64` become [`Value::Int`]; every other number
    /// becomes [`Value::Float`].
    pub fn from_json(json: &Json) -> Result<Value, DocError> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().ok_or_else(|| DocError::InvalidJson {
                    reason: format!("unrepresentable number {n}"),
                })?),
            },
            Json::String(s) => Value::Text(s.clone()),
            Json::Array(items) => Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>, _>>()?
                    .into(),
            ),
            Json::Object(map) => match extended_scalar(map)? {
                Some(value) => value,
                None => Value::Doc(doc_from_map(map)?),
            },
        })
    }
}

fn wrapper(key: &str, inner: Json) -> Json {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), inner);
    Json::Object(map)
}

/// Decodes a single-key wrapper object, or returns `None` for plain objects.
fn extended_scalar(map: &Map<String, Json>) -> Result<Option<Value>, DocError> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((key, inner)) = map.iter().next() else {
        return Ok(None);
    };

    let invalid = |what: &str| DocError::InvalidJson {
        reason: format!("invalid {key} value: {what}"),
    };

    let value = match key.as_str() {
        DATE_KEY => {
            let millis = inner.as_i64().ok_or_else(|| invalid("expected epoch millis"))?;
            let ts = DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| invalid("timestamp out of range"))?;
            Value::Timestamp(ts)
        }
        UUID_KEY => {
            let text = inner.as_str().ok_or_else(|| invalid("expected string"))?;
            Value::Uuid(Uuid::parse_str(text).map_err(|e| invalid(&e.to_string()))?)
        }
        BINARY_KEY => {
            let text = inner.as_str().ok_or_else(|| invalid("expected string"))?;
            Value::Binary(Base64::decode_vec(text).map_err(|e| invalid(&e.to_string()))?)
        }
        _ => return Ok(None),
    };

    Ok(Some(value))
}

fn doc_from_map(map: &Map<String, Json>) -> Result<Doc, DocError> {
    let mut doc = Doc::new();
    for (key, value) in map {
        doc.put(key.as_str(), Value::from_json(value)?);
    }
    Ok(doc)
}

impl Doc {
    /// Converts this document to a JSON object.
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Serializes this document to a compact JSON string.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Builds a document from a JSON object.
    pub fn from_json(json: &Json) -> crate::Result<Doc> {
        match json {
            Json::Object(map) => Ok(doc_from_map(map)?),
            other => Err(DocError::InvalidJson {
                reason: format!("expected an object, found {}", json_kind(other)),
            }
            .into()),
        }
    }

    /// Parses a JSON string into a document.
    pub fn parse_json(text: &str) -> crate::Result<Doc> {
        let json: Json = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    /// Maps a serializable object into a document.
    ///
    /// ```
    /// # use tabula::doc::Doc;
    /// #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    /// struct Product {
    ///     name: String,
    ///     price: f64,
    /// }
    ///
    /// let product = Product { name: "lamp".into(), price: 9.5 };
    /// let doc = Doc::from_object(&product)?;
    /// assert_eq!(doc.read_f64("price")?, Some(9.5));
    /// assert_eq!(doc.to_object::<Product>()?, product);
    /// # Ok::<(), tabula::Error>(())
    /// ```
    pub fn from_object<T: Serialize>(object: &T) -> crate::Result<Doc> {
        let json = serde_json::to_value(object).map_err(|e| DocError::SerializationFailed {
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Maps this document into a typed object.
    pub fn to_object<T: DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            DocError::DeserializationFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Doc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Doc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Doc::from_json(&json).map_err(serde::de::Error::custom)
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
