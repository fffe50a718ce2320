//! Segment-by-segment navigation over document trees.
//!
//! These functions take raw segments and never apply escaping; the
//! escaping-aware verbs on [`Doc`] parse their path first and then call in
//! here.
//!
//! Navigation rules, per segment:
//! - a `Doc` looks the segment up as a literal key;
//! - a `List` accepts a segment made only of ASCII digits as a 0-based index;
//! - anything else is a miss.
//!
//! A miss is never an error: readers return `None`.

use tracing::trace;

use super::{Doc, errors::DocError, value::Value};

/// Parses a list index segment.
///
/// Only non-empty, all-digit segments qualify, so `-1` and `+1` are misses
/// rather than indices.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Reads the value at `path`, or `None` if any step misses.
pub fn read<'a, S: AsRef<str>>(root: &'a Doc, path: &[S]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = root.children.get(first.as_ref())?;

    for segment in rest {
        current = match current {
            Value::Doc(doc) => doc.children.get(segment.as_ref())?,
            Value::List(list) => list.get(parse_index(segment.as_ref())?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Mutable counterpart of [`read`].
pub fn read_mut<'a, S: AsRef<str>>(root: &'a mut Doc, path: &[S]) -> Option<&'a mut Value> {
    let (first, rest) = path.split_first()?;
    let mut current = root.children.get_mut(first.as_ref())?;

    for segment in rest {
        current = match current {
            Value::Doc(doc) => doc.children.get_mut(segment.as_ref())?,
            Value::List(list) => list.get_mut(parse_index(segment.as_ref())?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Returns true if [`read`] finds a value at `path`.
pub fn contains<S: AsRef<str>>(root: &Doc, path: &[S]) -> bool {
    read(root, path).is_some()
}

/// Writes `value` at `path`, creating intermediate documents as needed.
///
/// Every intermediate position that is missing or holds anything other than a
/// document (a scalar or a list) is replaced by a fresh empty document. The
/// final segment is always stored as a literal key; list indices are not
/// writable through this function.
///
/// Returns the value previously stored under the final key.
pub fn write<S: AsRef<str>>(
    root: &mut Doc,
    path: &[S],
    value: Value,
) -> Result<Option<Value>, DocError> {
    if path.is_empty() {
        return Err(DocError::EmptyPath { operation: "write" });
    }
    Ok(write_into(root, path, value))
}

fn write_into<S: AsRef<str>>(doc: &mut Doc, path: &[S], value: Value) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    let key = first.as_ref();
    if rest.is_empty() {
        return doc.children.insert(key.to_string(), value);
    }

    match doc.children.entry(key.to_string()).or_insert(Value::Null) {
        Value::Doc(child) => write_into(child, rest, value),
        slot => {
            trace!(
                segment = key,
                replaced = slot.type_name(),
                "Creating intermediate document"
            );
            let mut child = Doc::new();
            let previous = write_into(&mut child, rest, value);
            *slot = Value::Doc(child);
            previous
        }
    }
}

/// Removes the value at `path` from its parent document.
///
/// Only the final key is deleted. Ancestors are left in place even when the
/// removal leaves them empty. Returns `None` when nothing was removed, which
/// includes a parent that is a list rather than a document.
pub fn remove<S: AsRef<str>>(root: &mut Doc, path: &[S]) -> Option<Value> {
    let (last, parents) = path.split_last()?;

    let parent = if parents.is_empty() {
        root
    } else {
        read_mut(root, parents)?.as_doc_mut()?
    };

    parent.children.shift_remove(last.as_ref())
}
