//! Path types and the escaping codec for hierarchical document access.
//!
//! A path is an ordered sequence of string segments. It can be written in two
//! forms, and the API keeps them apart:
//!
//! - **Raw segments**: a slice of strings. No escaping is applied; a segment
//!   may contain `.` or `&` literally.
//! - **Escaped string**: a single string where `.` separates segments,
//!   `&.` is a literal dot and `&&` is a literal ampersand.
//!
//! # Usage
//!
//! ```rust
//! use tabula::doc::path::{escape, unescape, PathBuf};
//!
//! assert_eq!(escape(&["a", "b.c"]), "a.b&.c");
//! assert_eq!(unescape("a&.b.c&&d")?, vec!["a.b", "c&d"]);
//!
//! // Escaped paths also accept a bracketed index suffix
//! let path = PathBuf::parse("items[1].name")?;
//! assert_eq!(path.segments(), ["items", "1", "name"]);
//! # Ok::<(), tabula::doc::PathError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Separator between segments in an escaped path string.
pub const SEPARATOR: char = '.';

/// Escape character of the path language.
pub const ESCAPE: char = '&';

/// Error type for path parsing failures.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The escaped path string violates the escaping grammar.
    #[error("Malformed path '{path}' at position {position}: {reason}")]
    Malformed {
        path: String,
        position: usize,
        reason: &'static str,
    },
}

impl PathError {
    /// Check if this error is an escaping grammar violation
    pub fn is_malformed(&self) -> bool {
        matches!(self, PathError::Malformed { .. })
    }

    /// Get the offending path string
    pub fn path(&self) -> &str {
        match self {
            PathError::Malformed { path, .. } => path,
        }
    }
}

/// Escapes raw segments into a single path string.
///
/// Every `&` becomes `&&` and every `.` becomes `&.`, then the segments are
/// joined with `.`. An empty slice escapes to the empty string.
///
/// The mapping is not total. When there are two or more segments and the last
/// one is empty, the result ends in a bare `.`, which [`unescape`] rejects:
/// `["a", ""]` escapes to `a.` and `["", ""]` to `.`. Empty segments in any
/// other position round-trip.
///
/// ```rust
/// # use tabula::doc::path::escape;
/// assert_eq!(escape::<&str>(&[]), "");
/// assert_eq!(escape(&["tom&jerry", "v1.2"]), "tom&&jerry.v1&.2");
/// ```
pub fn escape<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        escape_segment_into(segment.as_ref(), &mut out);
    }
    out
}

/// Escapes a single segment so it survives [`unescape`] as one segment.
pub fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    escape_segment_into(segment, &mut out);
    out
}

fn escape_segment_into(segment: &str, out: &mut String) {
    for c in segment.chars() {
        if c == ESCAPE || c == SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Splits an escaped path string into raw segments.
///
/// `&.` yields a literal dot, `&&` a literal ampersand, and a bare `.` starts a
/// new segment. Any other use of `&`, a trailing `&`, and a trailing bare `.`
/// are [`PathError::Malformed`]. The empty string yields one empty segment.
///
/// ```rust
/// # use tabula::doc::path::unescape;
/// assert_eq!(unescape("").unwrap(), vec![""]);
/// assert_eq!(unescape("a.a&.a").unwrap(), vec!["a", "a.a"]);
/// assert!(unescape("tom&jerry").is_err());
/// assert!(unescape("&&.").is_err());
/// ```
pub fn unescape(escaped: &str) -> Result<Vec<String>, PathError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = escaped.char_indices();

    while let Some((position, c)) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some((_, next)) if next == SEPARATOR || next == ESCAPE => current.push(next),
                Some(_) => {
                    return Err(PathError::Malformed {
                        path: escaped.to_string(),
                        position,
                        reason: "'&' must be followed by '.' or '&'",
                    });
                }
                None => {
                    return Err(PathError::Malformed {
                        path: escaped.to_string(),
                        position,
                        reason: "dangling '&' at end of path",
                    });
                }
            },
            SEPARATOR if position + 1 == escaped.len() => {
                return Err(PathError::Malformed {
                    path: escaped.to_string(),
                    position,
                    reason: "path must not end with a '.' separator",
                });
            }
            SEPARATOR => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    Ok(segments)
}

/// Splits a trailing bracketed index suffix off a segment.
///
/// `items[2]` becomes `items` and `2`; `grid[0][1]` becomes `grid`, `0`, `1`.
/// Segments whose brackets do not hold only ASCII digits are left as they are.
fn expand_index_suffix(segment: String, out: &mut Vec<String>) {
    let mut indices = Vec::new();
    let mut rest = segment.as_str();

    while let Some(stripped) = rest.strip_suffix(']') {
        let Some(open) = stripped.rfind('[') else {
            break;
        };
        let index = &stripped[open + 1..];
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        indices.push(index.to_string());
        rest = &stripped[..open];
    }

    if indices.is_empty() || rest.is_empty() {
        out.push(segment);
        return;
    }

    out.push(rest.to_string());
    out.extend(indices.into_iter().rev());
}

/// An owned path made of raw segments.
///
/// `PathBuf` never interprets its segments. Escaping only happens at the
/// string boundary: [`PathBuf::parse`] unescapes, and [`fmt::Display`]
/// escapes.
///
/// # Examples
///
/// ```rust
/// # use tabula::doc::PathBuf;
/// let path = PathBuf::new().push("meta").push("v1.2");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "meta.v1&.2");
/// assert_eq!(path.file_name(), Some("v1.2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathBuf {
    segments: Vec<String>,
}

impl PathBuf {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a path from raw segments, without any escaping.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses an escaped path string.
    ///
    /// Besides the escaping grammar of [`unescape`], a segment may end in one
    /// or more bracketed indices, so `items[1]` parses the same as `items.1`.
    pub fn parse(escaped: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        for segment in unescape(escaped)? {
            expand_index_suffix(segment, &mut segments);
        }
        Ok(Self { segments })
    }

    /// Appends a raw segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Appends all segments of another path.
    pub fn join(mut self, other: impl AsRef<[String]>) -> Self {
        self.segments.extend(other.as_ref().iter().cloned());
        self
    }

    /// Returns the raw segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns an iterator over the segments as string slices.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parent path, or `None` for an empty or single-segment path.
    pub fn parent(&self) -> Option<PathBuf> {
        match self.segments.len() {
            0 | 1 => None,
            n => Some(PathBuf {
                segments: self.segments[..n - 1].to_vec(),
            }),
        }
    }

    /// Returns the last segment of the path, or `None` if empty.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the escaped string form of this path.
    pub fn to_escaped(&self) -> String {
        escape(&self.segments)
    }

    /// Consumes the path, returning its segments.
    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }
}

impl AsRef<[String]> for PathBuf {
    fn as_ref(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for PathBuf {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<String>> for PathBuf {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for PathBuf {
    fn from(segments: &[&str]) -> Self {
        Self::from_segments(segments.iter().copied())
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_escaped())
    }
}

/// Builds a [`PathBuf`] from raw segments.
///
/// Each argument becomes exactly one segment, so dots and ampersands are
/// taken literally.
///
/// ```rust
/// # use tabula::path;
/// let p = path!("ns", "field.v2");
/// assert_eq!(p.segments(), ["ns", "field.v2"]);
/// assert_eq!(p.to_string(), "ns.field&.v2");
///
/// let empty = path!();
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::doc::PathBuf::new()
    };

    ($($segment:expr),+ $(,)?) => {{
        let mut path = $crate::doc::PathBuf::new();
        $(
            path = path.push($segment.to_string());
        )+
        path
    }};
}
