//! The page-fetching capability a cursor is driven by.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::query::QuerySpec;

/// Opaque continuation token returned with a page.
///
/// Its presence means the server has more results; the cursor passes it back
/// verbatim to fetch the next page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageState(String);

impl PageState {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    /// Items in server order
    pub items: Vec<R>,
    /// Token for the following page, `None` at the end of the stream
    pub next_page_state: Option<PageState>,
    /// Sort vector echoed by the server, when it was requested
    pub sort_vector: Option<Vec<f32>>,
}

impl<R> Page<R> {
    /// Creates a final page holding `items`.
    pub fn new(items: Vec<R>) -> Self {
        Self {
            items,
            next_page_state: None,
            sort_vector: None,
        }
    }

    /// Creates a final page with no items.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_next_page_state(mut self, page_state: impl Into<String>) -> Self {
        self.next_page_state = Some(PageState::new(page_state));
        self
    }

    pub fn with_sort_vector(mut self, sort_vector: Vec<f32>) -> Self {
        self.sort_vector = Some(sort_vector);
        self
    }

    /// Returns true if another page follows this one.
    pub fn has_more(&self) -> bool {
        self.next_page_state.is_some()
    }

    /// Maps every item, keeping the token and sort vector.
    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_state: self.next_page_state,
            sort_vector: self.sort_vector,
        }
    }
}

/// Fetches one page of results for a query.
///
/// `page_state` is `None` for the first page and the token returned by the
/// previous page afterwards. Implementations own transport concerns such as
/// timeouts and retries; a cursor never retries on its own.
///
/// Any closure with the matching signature is a fetcher:
///
/// ```
/// use tabula::cursor::{Cursor, Page, PageState, QuerySpec};
///
/// let fetcher = |_: &QuerySpec, state: Option<&PageState>| {
///     Ok::<_, tabula::Error>(match state {
///         None => Page::new(vec![1, 2]).with_next_page_state("2"),
///         Some(_) => Page::new(vec![3]),
///     })
/// };
///
/// let mut cursor = Cursor::from_fetcher(fetcher, QuerySpec::new());
/// assert_eq!(cursor.to_list()?, vec![1, 2, 3]);
/// # Ok::<(), tabula::Error>(())
/// ```
pub trait PageFetcher<R>: Send + Sync {
    fn fetch(&self, query: &QuerySpec, page_state: Option<&PageState>) -> crate::Result<Page<R>>;
}

impl<R, F> PageFetcher<R> for F
where
    F: Fn(&QuerySpec, Option<&PageState>) -> crate::Result<Page<R>> + Send + Sync,
{
    fn fetch(&self, query: &QuerySpec, page_state: Option<&PageState>) -> crate::Result<Page<R>> {
        self(query, page_state)
    }
}
