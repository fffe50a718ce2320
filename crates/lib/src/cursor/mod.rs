//! Paginated cursors over server-paged result streams.
//!
//! A [`Cursor`] buffers one page of results at a time and asks its
//! [`PageFetcher`] for the next page, passing back the continuation token of
//! the previous one, only once the buffer runs dry.
//!
//! # State machine
//!
//! ```text
//! Idle ──first has_next/next──▶ Started ──close──▶ Closed
//!  │                                                  ▲
//!  └──────────────────────close───────────────────────┘
//! ```
//!
//! - Query mutators (`filter`, `limit`, ...) are only allowed while `Idle`
//!   and return a new cursor, leaving the original untouched.
//! - A `Started` cursor whose last page carried no token reports no more
//!   elements but stays `Started`.
//! - A `Closed` cursor discards its buffer and never fetches again.
//!
//! # Concurrency
//!
//! Every iteration method takes `&mut self`, so a cursor is driven by one
//! thread at a time. Each fetch blocks the calling thread for one round trip
//! of the fetcher. Cursors derived through mutators share only the fetcher
//! and may be iterated from different threads.
//!
//! # Usage
//!
//! ```
//! use tabula::{cursor::MemoryCollection, doc::Doc};
//!
//! let collection = MemoryCollection::new("people");
//! for name in ["ada", "alan", "grace"] {
//!     collection.insert_one(Doc::new().with("name", name));
//! }
//!
//! let mut cursor = collection.find_all().page_size(2)?;
//! let mut names = Vec::new();
//! while let Some(doc) = cursor.try_next()? {
//!     names.push(doc.read_string("name")?.unwrap_or_default());
//! }
//! assert_eq!(names, ["ada", "alan", "grace"]);
//! assert_eq!(collection.fetch_count(), 2);
//! # Ok::<(), tabula::Error>(())
//! ```

use std::{collections::VecDeque, fmt, sync::Arc};

use tracing::{debug, trace};

use crate::doc::Doc;

pub mod errors;
pub mod memory;
pub mod page;
pub mod query;

pub use errors::CursorError;
pub use memory::MemoryCollection;
pub use page::{Page, PageFetcher, PageState};
pub use query::QuerySpec;

/// Lifecycle state of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Created, nothing fetched yet; the query may still change
    Idle,
    /// Iteration has begun
    Started,
    /// Terminal; the buffer has been discarded
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorState::Idle => "idle",
            CursorState::Started => "started",
            CursorState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A lazily evaluated, buffered iterator over paged results.
///
/// Items are yielded in the order the fetcher returns them. A failed fetch
/// leaves the cursor exactly as it was, so calling [`Cursor::has_next`] again
/// re-requests the same page.
pub struct Cursor<R> {
    fetcher: Arc<dyn PageFetcher<R>>,
    query: QuerySpec,
    state: CursorState,
    buffer: VecDeque<R>,
    page_state: Option<PageState>,
    exhausted: bool,
    pages_fetched: usize,
    consumed: usize,
    sort_vector: Option<Vec<f32>>,
}

impl<R> Cursor<R> {
    /// Creates an idle cursor over a shared fetcher.
    pub fn new(fetcher: Arc<dyn PageFetcher<R>>, query: QuerySpec) -> Self {
        Self {
            fetcher,
            query,
            state: CursorState::Idle,
            buffer: VecDeque::new(),
            page_state: None,
            exhausted: false,
            pages_fetched: 0,
            consumed: 0,
            sort_vector: None,
        }
    }

    /// Creates an idle cursor that owns `fetcher`.
    pub fn from_fetcher<F>(fetcher: F, query: QuerySpec) -> Self
    where
        F: PageFetcher<R> + 'static,
    {
        Self::new(Arc::new(fetcher), query)
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    /// Number of items handed out so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of fetched items not yet handed out
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of pages fetched since creation or the last rewind
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns true if another item is available, fetching pages as needed.
    ///
    /// Always `false` once the cursor is closed.
    pub fn has_next(&mut self) -> crate::Result<bool> {
        self.fill_buffer()?;
        Ok(!self.buffer.is_empty())
    }

    /// Returns the next item, or `None` when the stream is exhausted or the
    /// cursor is closed.
    pub fn try_next(&mut self) -> crate::Result<Option<R>> {
        self.fill_buffer()?;
        let item = self.buffer.pop_front();
        if item.is_some() {
            self.consumed += 1;
        }
        Ok(item)
    }

    /// Returns a pull iterator over the remaining items.
    ///
    /// Unlike [`Cursor::stream`], this is allowed in any state and never
    /// closes the cursor.
    pub fn iter(&mut self) -> Iter<'_, R> {
        Iter { cursor: self }
    }

    /// Removes up to `n` already buffered items without fetching.
    pub fn consume_buffer(&mut self, n: usize) -> Vec<R> {
        let n = n.min(self.buffer.len());
        let items: Vec<R> = self.buffer.drain(..n).collect();
        self.consumed += items.len();
        items
    }

    /// Returns the sort vector echoed by the first page.
    ///
    /// Fetches the first page if the cursor is still idle. Only present when
    /// the query asked for it and the server supplied one.
    pub fn sort_vector(&mut self) -> crate::Result<Option<&[f32]>> {
        if self.state == CursorState::Idle {
            self.fill_buffer()?;
        }
        Ok(self.sort_vector.as_deref())
    }

    /// Closes the cursor and discards its buffer.
    ///
    /// An in-flight fetch cannot be aborted; closing only prevents further
    /// ones.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        debug!(
            consumed = self.consumed,
            discarded = self.buffer.len(),
            "Closing cursor"
        );
        self.transition(CursorState::Closed);
        self.buffer.clear();
        self.page_state = None;
    }

    /// Returns a started cursor to `Idle`, so the next step fetches from the
    /// first page again.
    ///
    /// Closing is permanent: rewinding a closed cursor is a
    /// [`CursorError::InvalidState`].
    pub fn rewind(&mut self) -> crate::Result<()> {
        if self.state == CursorState::Closed {
            return Err(CursorError::InvalidState {
                state: self.state,
                operation: "rewind",
            }
            .into());
        }
        debug!(from = %self.state, consumed = self.consumed, "Rewinding cursor");
        self.transition(CursorState::Idle);
        self.buffer.clear();
        self.page_state = None;
        self.exhausted = false;
        self.pages_fetched = 0;
        self.consumed = 0;
        self.sort_vector = None;
        Ok(())
    }

    /// Drains all remaining items into a vector and closes the cursor.
    ///
    /// Only an idle cursor can be drained. A closed cursor yields an empty
    /// vector without fetching; a started one is a
    /// [`CursorError::InvalidState`]. The cursor is closed even when a fetch
    /// fails.
    pub fn to_list(&mut self) -> crate::Result<Vec<R>> {
        let mut items = Vec::new();
        self.consume_all("to_list", |item| items.push(item))?;
        Ok(items)
    }

    /// Calls `f` on every remaining item and closes the cursor.
    ///
    /// Follows the same state rules as [`Cursor::to_list`]. The cursor is
    /// closed even when `f` panics.
    pub fn for_each(&mut self, f: impl FnMut(R)) -> crate::Result<()> {
        self.consume_all("for_each", f)
    }

    /// Returns a borrowing iterator that stops after the first error and
    /// closes the cursor when dropped.
    ///
    /// Follows the same state rules as [`Cursor::to_list`].
    pub fn stream(&mut self) -> crate::Result<Stream<'_, R>> {
        let done = self.check_bulk("stream")?;
        Ok(Stream {
            cursor: self,
            done,
        })
    }

    /// Returns `Ok(true)` for a closed cursor, which bulk operations treat as
    /// empty.
    fn check_bulk(&self, operation: &'static str) -> crate::Result<bool> {
        match self.state {
            CursorState::Idle => Ok(false),
            CursorState::Closed => Ok(true),
            CursorState::Started => Err(CursorError::InvalidState {
                state: self.state,
                operation,
            }
            .into()),
        }
    }

    fn consume_all(&mut self, operation: &'static str, mut f: impl FnMut(R)) -> crate::Result<()> {
        if self.check_bulk(operation)? {
            return Ok(());
        }

        // Closes on every exit, including a panic inside `f`
        let mut guard = CloseOnDrop { cursor: self };
        while let Some(item) = guard.cursor.try_next()? {
            f(item);
        }
        Ok(())
    }

    fn fill_buffer(&mut self) -> crate::Result<()> {
        match self.state {
            CursorState::Closed => return Ok(()),
            CursorState::Idle => self.transition(CursorState::Started),
            CursorState::Started => {}
        }

        while self.buffer.is_empty() && !self.exhausted {
            self.fetch_next_page()?;
        }
        Ok(())
    }

    fn fetch_next_page(&mut self) -> crate::Result<()> {
        let page = self.fetcher.fetch(&self.query, self.page_state.as_ref())?;

        self.pages_fetched += 1;
        debug!(
            page = self.pages_fetched,
            items = page.items.len(),
            has_more = page.has_more(),
            "Fetched cursor page"
        );

        if self.sort_vector.is_none() {
            self.sort_vector = page.sort_vector;
        }
        self.exhausted = page.next_page_state.is_none();
        self.page_state = page.next_page_state;
        self.buffer.extend(page.items);
        Ok(())
    }

    fn transition(&mut self, next: CursorState) {
        if self.state != next {
            trace!(from = %self.state, to = %next, "Cursor state transition");
            self.state = next;
        }
    }

    /// Builds a new idle cursor over an updated query.
    fn derive(
        &self,
        operation: &'static str,
        update: impl FnOnce(QuerySpec) -> QuerySpec,
    ) -> crate::Result<Cursor<R>> {
        if self.state != CursorState::Idle {
            return Err(CursorError::InvalidState {
                state: self.state,
                operation,
            }
            .into());
        }
        Ok(Cursor::new(
            Arc::clone(&self.fetcher),
            update(self.query.clone()),
        ))
    }

    // Copy-on-write query mutators

    pub fn filter(&self, filter: Doc) -> crate::Result<Cursor<R>> {
        self.derive("filter", |q| q.with_filter(filter))
    }

    pub fn projection(&self, projection: Doc) -> crate::Result<Cursor<R>> {
        self.derive("projection", |q| q.with_projection(projection))
    }

    pub fn sort(&self, sort: Doc) -> crate::Result<Cursor<R>> {
        self.derive("sort", |q| q.with_sort(sort))
    }

    pub fn skip(&self, skip: u64) -> crate::Result<Cursor<R>> {
        self.derive("skip", |q| q.with_skip(skip))
    }

    pub fn limit(&self, limit: u64) -> crate::Result<Cursor<R>> {
        self.derive("limit", |q| q.with_limit(limit))
    }

    pub fn include_similarity(&self, include: bool) -> crate::Result<Cursor<R>> {
        self.derive("include_similarity", |q| q.with_include_similarity(include))
    }

    pub fn include_sort_vector(&self, include: bool) -> crate::Result<Cursor<R>> {
        self.derive("include_sort_vector", |q| {
            q.with_include_sort_vector(include)
        })
    }

    pub fn page_size(&self, page_size: usize) -> crate::Result<Cursor<R>> {
        self.derive("page_size", |q| q.with_page_size(page_size))
    }
}

impl<R: 'static> Cursor<R> {
    /// Returns an idle cursor whose items are mapped through `f`.
    ///
    /// Mapping happens per page, as pages arrive.
    pub fn map<T, F>(&self, f: F) -> crate::Result<Cursor<T>>
    where
        F: Fn(R) -> T + Send + Sync + 'static,
    {
        if self.state != CursorState::Idle {
            return Err(CursorError::InvalidState {
                state: self.state,
                operation: "map",
            }
            .into());
        }
        let fetcher = MappedFetcher {
            inner: Arc::clone(&self.fetcher),
            map: f,
        };
        Ok(Cursor::from_fetcher(fetcher, self.query.clone()))
    }
}

struct MappedFetcher<R, F> {
    inner: Arc<dyn PageFetcher<R>>,
    map: F,
}

impl<R, T, F> PageFetcher<T> for MappedFetcher<R, F>
where
    F: Fn(R) -> T + Send + Sync,
{
    fn fetch(&self, query: &QuerySpec, page_state: Option<&PageState>) -> crate::Result<Page<T>> {
        Ok(self.inner.fetch(query, page_state)?.map(&self.map))
    }
}

impl<R> fmt::Debug for Cursor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("query", &self.query)
            .field("buffered", &self.buffer.len())
            .field("consumed", &self.consumed)
            .field("pages_fetched", &self.pages_fetched)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

/// Borrowing pull iterator returned by [`Cursor::iter`].
///
/// A failed fetch yields `Some(Err(_))` and the following call retries the
/// same page. Dropping the iterator leaves the cursor open.
pub struct Iter<'a, R> {
    cursor: &'a mut Cursor<R>,
}

impl<R> Iterator for Iter<'_, R> {
    type Item = crate::Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.try_next().transpose()
    }
}

impl<'a, R> IntoIterator for &'a mut Cursor<R> {
    type Item = crate::Result<R>;
    type IntoIter = Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Closes the borrowed cursor when dropped.
struct CloseOnDrop<'a, R> {
    cursor: &'a mut Cursor<R>,
}

impl<R> Drop for CloseOnDrop<'_, R> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// Borrowing iterator returned by [`Cursor::stream`].
pub struct Stream<'a, R> {
    cursor: &'a mut Cursor<R>,
    done: bool,
}

impl<R> Iterator for Stream<'_, R> {
    type Item = crate::Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.try_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> Drop for Stream<'_, R> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}
