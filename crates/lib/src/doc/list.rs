//! Ordered list type for documents.

use super::{errors::DocError, value::Value};

/// An ordered sequence of [`Value`]s.
///
/// Path navigation reads list elements by 0-based index. Writing through a
/// path never indexes into a list; mutate elements through the list itself.
///
/// ```
/// # use tabula::doc::{List, Value};
/// let mut list = List::new();
/// list.push("a");
/// list.push(2);
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(0), Some(&Value::Text("a".to_string())));
/// assert_eq!(list.get(5), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    items: Vec<Value>,
}

impl List {
    /// Creates a new empty list
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a value, returning its index
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.items.push(value.into());
        self.items.len() - 1
    }

    /// Inserts a value at `index`, shifting later elements right
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<(), DocError> {
        if index > self.items.len() {
            return Err(DocError::ListIndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, value.into());
        Ok(())
    }

    /// Gets the element at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Gets a mutable reference to the element at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Replaces the element at `index`, returning the previous value
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Option<Value> {
        self.items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    /// Removes and returns the element at `index`
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Returns an iterator over the elements
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Returns a mutable iterator over the elements
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.items.iter_mut()
    }

    /// Removes all elements
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the elements as a slice
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Clones the elements into a vector
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.clone()
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
