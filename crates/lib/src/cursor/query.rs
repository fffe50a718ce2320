//! Query descriptors threaded through page fetches.

use crate::{config::ClientConfig, doc::Doc};

/// Immutable description of a find query.
///
/// The cursor never interprets the filter, projection or sort documents; it
/// hands them to its [`PageFetcher`](super::PageFetcher) unchanged on every
/// page. `with_*` methods consume the query and return an updated copy.
///
/// ```
/// use tabula::{cursor::QuerySpec, doc::Doc};
///
/// let query = QuerySpec::new()
///     .with_filter(Doc::new().with("status", "active"))
///     .with_limit(10)
///     .with_page_size(5);
///
/// assert_eq!(query.limit(), Some(10));
/// assert_eq!(query.page_size(), Some(5));
/// assert!(query.projection().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    filter: Option<Doc>,
    projection: Option<Doc>,
    sort: Option<Doc>,
    skip: Option<u64>,
    limit: Option<u64>,
    include_similarity: bool,
    include_sort_vector: bool,
    page_size: Option<usize>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty query carrying the configured page-size hint.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            page_size: config.page_size,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Doc) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_projection(mut self, projection: Doc) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_sort(mut self, sort: Doc) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_include_similarity(mut self, include: bool) -> Self {
        self.include_similarity = include;
        self
    }

    pub fn with_include_sort_vector(mut self, include: bool) -> Self {
        self.include_sort_vector = include;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn filter(&self) -> Option<&Doc> {
        self.filter.as_ref()
    }

    pub fn projection(&self) -> Option<&Doc> {
        self.projection.as_ref()
    }

    pub fn sort(&self) -> Option<&Doc> {
        self.sort.as_ref()
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn include_similarity(&self) -> bool {
        self.include_similarity
    }

    pub fn include_sort_vector(&self) -> bool {
        self.include_sort_vector
    }

    /// Page-size hint; fetchers may ignore it
    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }
}
