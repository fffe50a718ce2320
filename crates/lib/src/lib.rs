//!
//! Tabula: a client library for addressing and paging through JSON documents
//! served by a document/table API.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Doc`)**: Insertion-ordered trees of [`doc::Value`]s. Literal verbs
//!   (`put`/`get`) treat keys verbatim, while escaping-aware verbs (`append`/`read`) take
//!   dotted paths such as `meta.v1&.2` or `items[3]`.
//! * **Paths (`doc::path`)**: The escaping codec (`&.` for a literal dot, `&&` for a literal
//!   ampersand) and [`doc::PathBuf`] for pre-split segments.
//! * **Cursors (`cursor::Cursor`)**: A lazily evaluated `Idle → Started → Closed` state
//!   machine that buffers one page at a time and follows continuation tokens.
//! * **Page fetchers (`cursor::PageFetcher`)**: The single capability a cursor needs. The
//!   crate ships an in-memory collection (`cursor::MemoryCollection`) and an HTTP
//!   implementation (`http::HttpPageFetcher`).
//!
//! ## Example
//!
//! ```
//! use tabula::{cursor::{MemoryCollection, QuerySpec}, doc::Doc};
//!
//! let collection = MemoryCollection::new("orders");
//! for id in 1..=5 {
//!     let mut order = Doc::new().with("_id", id);
//!     order.append("meta.region", if id % 2 == 0 { "eu" } else { "us" })?;
//!     collection.insert_one(order);
//! }
//!
//! let filter = Doc::new().with("meta.region", "us");
//! let orders = collection.find(QuerySpec::new().with_filter(filter)).to_list()?;
//! assert_eq!(orders.len(), 3);
//! # Ok::<(), tabula::Error>(())
//! ```

pub mod config;
pub mod constants;
pub mod cursor;
pub mod doc;
pub mod http;

pub use cursor::{Cursor, CursorState};
pub use doc::{Doc, Value};

/// Result type used throughout the Tabula library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Tabula library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Malformed escaped path strings
    #[error(transparent)]
    Path(doc::PathError),

    /// Structured document errors from the doc module
    #[error(transparent)]
    Doc(doc::DocError),

    /// Cursor state machine violations
    #[error(transparent)]
    Cursor(cursor::CursorError),

    /// Failures talking to the document API
    #[error(transparent)]
    Transport(http::TransportError),

    /// Invalid client configuration
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Path(_) => "path",
            Error::Doc(_) => "doc",
            Error::Cursor(_) => "cursor",
            Error::Transport(_) => "http",
            Error::Config(_) => "config",
        }
    }

    /// Check if this error is a malformed path.
    pub fn is_malformed_path(&self) -> bool {
        match self {
            Error::Path(path_err) => path_err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error is a cursor state violation.
    pub fn is_cursor_state_error(&self) -> bool {
        match self {
            Error::Cursor(cursor_err) => cursor_err.is_state_error(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Doc(doc_err) => doc_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error came from the transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Doc(doc_err) => doc_err.is_serialization_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
