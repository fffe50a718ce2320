//! In-memory document collection.
//!
//! [`MemoryCollection`] answers find queries the way a document API server
//! does (equality filters, sort, skip, limit, projection and paging through
//! continuation tokens) without any network. It backs tests and local
//! prototyping, and doubles as the reference [`PageFetcher`] implementation.

use std::{
    cmp::Ordering,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

use tracing::debug;
use uuid::Uuid;

use super::{Cursor, CursorError, Page, PageFetcher, PageState, QuerySpec};
use crate::{
    constants::{DEFAULT_PAGE_SIZE, ID_FIELD},
    doc::{Doc, PathBuf, Value, navigate},
};

/// A thread-safe, insertion-ordered collection of documents.
///
/// Cloning is cheap and clones share the same documents.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    docs: RwLock<Vec<Doc>>,
    fetches: AtomicUsize,
    default_page_size: usize,
}

impl MemoryCollection {
    /// Creates an empty collection with the default page size.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_page_size(name, DEFAULT_PAGE_SIZE)
    }

    /// Creates an empty collection serving `page_size` documents per page
    /// unless a query asks otherwise.
    pub fn with_page_size(name: impl Into<String>, page_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                docs: RwLock::new(Vec::new()),
                fetches: AtomicUsize::new(0),
                default_page_size: page_size.max(1),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts a document, assigning a random `_id` if it has none.
    ///
    /// Returns the document's id.
    pub fn insert_one(&self, mut doc: Doc) -> Value {
        let id = doc
            .get_or_insert(ID_FIELD, || Value::Uuid(Uuid::new_v4()))
            .clone();
        self.inner
            .docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(doc);
        id
    }

    /// Inserts documents in order, returning their ids.
    pub fn insert_many(&self, docs: impl IntoIterator<Item = Doc>) -> Vec<Value> {
        docs.into_iter().map(|doc| self.insert_one(doc)).collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pages served so far
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(AtomicOrdering::SeqCst)
    }

    /// Opens an idle cursor over `query`.
    pub fn find(&self, query: QuerySpec) -> Cursor<Doc> {
        Cursor::from_fetcher(self.clone(), query)
    }

    /// Opens an idle cursor over every document.
    pub fn find_all(&self) -> Cursor<Doc> {
        self.find(QuerySpec::new())
    }

    /// Runs filter, sort, skip and limit, returning the full result set.
    fn evaluate(&self, query: &QuerySpec) -> crate::Result<Vec<Doc>> {
        let filter = match query.filter() {
            Some(filter) => parse_fields(filter)?,
            None => Vec::new(),
        };
        let sort = match query.sort() {
            Some(sort) => parse_fields(sort)?,
            None => Vec::new(),
        };

        let docs = self
            .inner
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut matching: Vec<&Doc> = docs
            .iter()
            .filter(|doc| {
                filter
                    .iter()
                    .all(|(path, expected)| navigate::read(doc, path.segments()) == Some(*expected))
            })
            .collect();

        if !sort.is_empty() {
            // Stable, so ties keep insertion order
            matching.sort_by(|a, b| compare_docs(a, b, &sort));
        }

        let skip = usize::try_from(query.skip().unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit()
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl PageFetcher<Doc> for MemoryCollection {
    fn fetch(&self, query: &QuerySpec, page_state: Option<&PageState>) -> crate::Result<Page<Doc>> {
        let offset = match page_state {
            None => 0,
            Some(state) => {
                state
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| CursorError::InvalidPageState {
                        page_state: state.to_string(),
                    })?
            }
        };

        let results = self.evaluate(query)?;
        let page_size = query
            .page_size()
            .unwrap_or(self.inner.default_page_size)
            .max(1);
        let end = offset.saturating_add(page_size).min(results.len());

        let projection = match query.projection() {
            Some(projection) => Some(Projection::parse(projection)?),
            None => None,
        };
        let items: Vec<Doc> = results
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|doc| match &projection {
                Some(projection) => projection.apply(doc),
                None => doc.clone(),
            })
            .collect();

        self.inner.fetches.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(
            collection = %self.inner.name,
            offset,
            items = items.len(),
            total = results.len(),
            "Served page"
        );

        let page = Page::new(items);
        Ok(if end < results.len() {
            page.with_next_page_state(end.to_string())
        } else {
            page
        })
    }
}

/// Parses the keys of a filter, sort or projection document as escaped paths.
fn parse_fields(doc: &Doc) -> crate::Result<Vec<(PathBuf, &Value)>> {
    doc.iter()
        .map(|(key, value)| Ok::<_, crate::Error>((PathBuf::parse(key)?, value)))
        .collect()
}

fn compare_docs(a: &Doc, b: &Doc, sort: &[(PathBuf, &Value)]) -> Ordering {
    for (path, direction) in sort {
        let ordering = compare_values(
            navigate::read(a, path.segments()),
            navigate::read(b, path.segments()),
        );
        let ordering = if direction.as_int() == Some(-1) {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Orders values of different kinds by a fixed kind rank, and values of the
/// same kind naturally. Missing sorts before everything.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Int(_) | Value::Float(_)) => 2,
            Some(Value::Text(_)) => 3,
            Some(Value::Doc(_)) => 4,
            Some(Value::List(_)) => 5,
            Some(Value::Binary(_)) => 6,
            Some(Value::Uuid(_)) => 7,
            Some(Value::Bool(_)) => 8,
            Some(Value::Timestamp(_)) => 9,
        }
    }

    match (a, b) {
        (Some(Value::Int(x)), Some(Value::Int(y))) => x.cmp(y),
        (Some(x), Some(y)) if x.is_number() && y.is_number() => {
            let (x, y) = (x.as_float().unwrap_or(0.0), y.as_float().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Text(x)), Some(Value::Text(y))) => x.cmp(y),
        (Some(Value::Binary(x)), Some(Value::Binary(y))) => x.cmp(y),
        (Some(Value::Uuid(x)), Some(Value::Uuid(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Timestamp(x)), Some(Value::Timestamp(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Inclusion or exclusion projection over dotted field paths.
enum Projection {
    Include { paths: Vec<PathBuf>, with_id: bool },
    Exclude { paths: Vec<PathBuf> },
}

impl Projection {
    fn parse(projection: &Doc) -> crate::Result<Self> {
        let fields = parse_fields(projection)?;
        let is_id = |path: &PathBuf| path.segments() == [ID_FIELD];

        let include = fields
            .iter()
            .any(|(path, flag)| !is_id(path) && is_included(flag));

        if include {
            let with_id = fields
                .iter()
                .find(|(path, _)| is_id(path))
                .is_none_or(|(_, flag)| is_included(flag));
            let paths = fields
                .into_iter()
                .filter(|(path, flag)| !is_id(path) && is_included(flag))
                .map(|(path, _)| path)
                .collect();
            Ok(Projection::Include { paths, with_id })
        } else {
            let paths = fields
                .into_iter()
                .filter(|(_, flag)| !is_included(flag))
                .map(|(path, _)| path)
                .collect();
            Ok(Projection::Exclude { paths })
        }
    }

    fn apply(&self, doc: &Doc) -> Doc {
        match self {
            Projection::Include { paths, with_id } => {
                let mut out = Doc::new();
                if *with_id {
                    if let Some(id) = doc.get(ID_FIELD) {
                        out.put(ID_FIELD, id.clone());
                    }
                }
                for path in paths {
                    if let Some(value) = navigate::read(doc, path.segments()) {
                        // Paths are non-empty, so the write cannot fail
                        let _ = navigate::write(&mut out, path.segments(), value.clone());
                    }
                }
                out
            }
            Projection::Exclude { paths } => {
                let mut out = doc.clone();
                for path in paths {
                    navigate::remove(&mut out, path.segments());
                }
                out
            }
        }
    }
}

fn is_included(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(f) => *f != 0.0,
        _ => true,
    }
}
