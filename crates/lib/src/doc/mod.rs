//! Document trees and their addressing verbs.
//!
//! A [`Doc`] is an insertion-ordered map from string keys to [`Value`]s, where
//! a value may itself be a [`List`] or a nested `Doc`. The tree never
//! interprets dots in its keys; only the addressing layer does.
//!
//! Two families of verbs coexist and must not be confused:
//!
//! | Verb | Path form | Escaping | Navigates |
//! |---|---|---|---|
//! | [`Doc::put`] / [`Doc::get`] | one literal key | no | no |
//! | [`Doc::get_raw`] | raw segments | no | yes |
//! | [`Doc::append`] / [`Doc::read`] | escaped path string | yes | yes |
//! | [`Doc::append_raw`] | raw segments | no | yes |
//!
//! # Usage
//!
//! ```
//! use tabula::doc::{Doc, Value};
//!
//! let mut doc = Doc::new();
//!
//! // Literal access stores the key verbatim
//! doc.put("a.b", 1);
//! assert_eq!(doc.get("a.b"), Some(&Value::Int(1)));
//! assert_eq!(doc.read("a.b")?, None);
//!
//! // Escaping-aware access navigates and creates intermediate documents
//! doc.append("meta.v1&.2", "x")?;
//! assert_eq!(doc.read_string("meta.v1&.2")?, Some("x".to_string()));
//! assert!(doc.get_raw(&["meta", "v1.2"]).is_some());
//! # Ok::<(), tabula::Error>(())
//! ```

use std::fmt;

use indexmap::IndexMap;

pub mod errors;
pub mod json;
pub mod list;
pub mod navigate;
pub mod path;
pub mod value;

pub use errors::DocError;
pub use list::List;
pub use path::{PathBuf, PathError};
pub use value::Value;

// Re-export the macro from crate root
pub use crate::path;

/// A mutable, insertion-ordered document tree.
///
/// Equality is order-sensitive, matching the order documents serialize in.
///
/// # Examples
///
/// ```
/// # use tabula::doc::Doc;
/// let mut doc = Doc::new();
/// doc.append("user.profile.name", "Alice")?;
/// doc.append("user.age", 30)?;
///
/// assert_eq!(doc.read_i64("user.age")?, Some(30));
/// assert_eq!(doc.read_string("user.profile.name")?, Some("Alice".to_string()));
/// assert_eq!(doc.read_string("user.missing")?, None);
///
/// // A present value of the wrong kind is an error, not a miss
/// assert!(doc.read_i64("user.profile.name").is_err());
/// # Ok::<(), tabula::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Doc {
    children: IndexMap<String, Value>,
}

impl Doc {
    /// Creates a new empty document
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
        }
    }

    /// Returns the number of top-level keys
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the document has no keys
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over top-level entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.children.iter()
    }

    /// Iterates over top-level keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.children.keys()
    }

    /// Iterates over top-level values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.children.values()
    }

    // Literal verbs

    /// Stores `value` under the literal `key`, returning the previous value.
    ///
    /// The key is never parsed: `put("a.b", v)` creates a single top-level key
    /// named `a.b`.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.children.insert(key.into(), value.into())
    }

    /// Looks up the literal top-level `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.children.get(key)
    }

    /// Mutable counterpart of [`Doc::get`].
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.children.get_mut(key)
    }

    /// Navigates raw segments without applying any escaping.
    ///
    /// ```
    /// # use tabula::doc::Doc;
    /// let mut doc = Doc::new();
    /// doc.append_raw(&["a", "b.c"], true)?;
    /// assert_eq!(doc.get_raw(&["a", "b.c"]), Some(&true.into()));
    /// assert_eq!(doc.get_raw(&["a", "b", "c"]), None);
    /// # Ok::<(), tabula::Error>(())
    /// ```
    pub fn get_raw<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        navigate::read(self, segments)
    }

    /// Returns the value under `key`, inserting the result of `default` first
    /// if the key is missing.
    pub fn get_or_insert(
        &mut self,
        key: impl Into<String>,
        default: impl FnOnce() -> Value,
    ) -> &mut Value {
        self.children.entry(key.into()).or_insert_with(default)
    }

    // Escaping-aware verbs

    /// Writes `value` at an escaped path, creating intermediate documents.
    ///
    /// Any scalar or list found at an intermediate position is replaced by an
    /// empty document. Returns `self` so calls can be chained.
    pub fn append(&mut self, path: &str, value: impl Into<Value>) -> crate::Result<&mut Self> {
        let path = PathBuf::parse(path)?;
        self.append_raw(path.segments(), value)
    }

    /// Writes `value` at raw segments, creating intermediate documents.
    pub fn append_raw<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        value: impl Into<Value>,
    ) -> crate::Result<&mut Self> {
        if segments.is_empty() {
            return Err(DocError::EmptyPath {
                operation: "append",
            }
            .into());
        }
        navigate::write(self, segments, value.into())?;
        Ok(self)
    }

    /// Reads the value at an escaped path.
    ///
    /// `Ok(None)` means the path does not resolve. A stored null is returned
    /// as `Some(&Value::Null)`.
    pub fn read(&self, path: &str) -> crate::Result<Option<&Value>> {
        let path = PathBuf::parse(path)?;
        Ok(navigate::read(self, path.segments()))
    }

    /// Mutable counterpart of [`Doc::read`].
    pub fn read_mut(&mut self, path: &str) -> crate::Result<Option<&mut Value>> {
        let path = PathBuf::parse(path)?;
        Ok(navigate::read_mut(self, path.segments()))
    }

    /// Removes the value at an escaped path, returning it.
    ///
    /// Empty ancestor documents are left in place.
    pub fn remove(&mut self, path: &str) -> crate::Result<Option<Value>> {
        let path = PathBuf::parse(path)?;
        Ok(navigate::remove(self, path.segments()))
    }

    /// Removes the value at raw segments, returning it.
    pub fn remove_raw<S: AsRef<str>>(&mut self, segments: &[S]) -> Option<Value> {
        navigate::remove(self, segments)
    }

    /// Returns true if an escaped path resolves to a value, null included.
    pub fn contains_key(&self, path: &str) -> crate::Result<bool> {
        Ok(self.read(path)?.is_some())
    }

    /// Returns true if raw segments resolve to a value.
    pub fn contains_raw<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        navigate::contains(self, segments)
    }

    // Typed readers

    /// Reads an escaped path and converts the value with `TryFrom`.
    ///
    /// A missing path and a stored null both read as `Ok(None)`. A value of
    /// an incompatible kind is a [`DocError::TypeMismatch`] naming the path.
    pub fn read_as<'a, T>(&'a self, path: &str) -> crate::Result<Option<T>>
    where
        T: TryFrom<&'a Value, Error = DocError>,
    {
        match self.read(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::try_from(value)
                .map(Some)
                .map_err(|e| e.at_path(path).into()),
        }
    }

    /// Reads a text value
    pub fn read_string(&self, path: &str) -> crate::Result<Option<String>> {
        self.read_as(path)
    }

    /// Reads an integer that fits in 32 bits
    pub fn read_i32(&self, path: &str) -> crate::Result<Option<i32>> {
        self.read_as(path)
    }

    /// Reads an integer
    pub fn read_i64(&self, path: &str) -> crate::Result<Option<i64>> {
        self.read_as(path)
    }

    /// Reads a number, widening integers to floating point
    pub fn read_f64(&self, path: &str) -> crate::Result<Option<f64>> {
        self.read_as(path)
    }

    /// Reads a boolean
    pub fn read_bool(&self, path: &str) -> crate::Result<Option<bool>> {
        self.read_as(path)
    }

    /// Reads a list without cloning it
    pub fn read_list(&self, path: &str) -> crate::Result<Option<&List>> {
        match self.read(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::List(list)) => Ok(Some(list)),
            Some(other) => Err(DocError::TypeMismatch {
                path: path.to_string(),
                expected: "list",
                actual: other.type_name(),
            }
            .into()),
        }
    }

    /// Reads a nested document without cloning it
    pub fn read_doc(&self, path: &str) -> crate::Result<Option<&Doc>> {
        match self.read(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Doc(doc)) => Ok(Some(doc)),
            Some(other) => Err(DocError::TypeMismatch {
                path: path.to_string(),
                expected: "doc",
                actual: other.type_name(),
            }
            .into()),
        }
    }
}

impl PartialEq for Doc {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality ignores order
        self.children.len() == other.children.len()
            && self.children.iter().eq(other.children.iter())
    }
}

// Builder pattern methods
impl Doc {
    /// Builder method to store a literal key and return self
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Doc {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            children: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Doc {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}
