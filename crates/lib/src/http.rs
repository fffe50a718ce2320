//! HTTP page fetcher for JSON document APIs.
//!
//! [`HttpPageFetcher`] turns each page request into a `find` command POSTed
//! to a collection endpoint with blocking `reqwest`. Building the command and
//! parsing the response are separate pure functions, so they can be tested
//! without a server.
//!
//! Request:
//!
//! ```json
//! {"find": {"filter": {...}, "projection": {...}, "sort": {...},
//!           "options": {"skip": 0, "limit": 10, "includeSimilarity": true,
//!                       "includeSortVector": true, "pageState": "..."}}}
//! ```
//!
//! Response:
//!
//! ```json
//! {"data": {"documents": [...], "nextPageState": "..."},
//!  "status": {"sortVector": [...]},
//!  "errors": [{"message": "..."}]}
//! ```

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
    Result,
    config::ClientConfig,
    constants::TOKEN_HEADER,
    cursor::{Cursor, Page, PageFetcher, PageState, QuerySpec},
    doc::Doc,
};

/// Errors talking to the document API.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with a non-success HTTP status
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server reported command errors
    #[error("Server reported errors: {}", .messages.join("; "))]
    Api { messages: Vec<String> },

    /// The response body does not have the expected shape
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl TransportError {
    /// Get the HTTP status if the server answered with an error status
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server rejected the command itself
    pub fn is_api_error(&self) -> bool {
        matches!(self, TransportError::Api { .. })
    }
}

impl From<TransportError> for crate::Error {
    fn from(err: TransportError) -> Self {
        crate::Error::Transport(err)
    }
}

/// A `find` command as sent on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct FindCommand {
    find: FindBody,
}

#[derive(Debug, Clone, Serialize)]
struct FindBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Doc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<Doc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<Doc>,
    #[serde(skip_serializing_if = "FindOptions::is_empty")]
    options: FindOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_similarity: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_sort_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_state: Option<PageState>,
}

impl FindOptions {
    fn is_empty(&self) -> bool {
        self.skip.is_none()
            && self.limit.is_none()
            && !self.include_similarity
            && !self.include_sort_vector
            && self.page_state.is_none()
    }
}

impl FindCommand {
    /// Builds the command for one page of `query`.
    ///
    /// The continuation token is the only part that changes between pages.
    pub fn from_query(query: &QuerySpec, page_state: Option<&PageState>) -> Self {
        Self {
            find: FindBody {
                filter: query.filter().cloned(),
                projection: query.projection().cloned(),
                sort: query.sort().cloned(),
                options: FindOptions {
                    skip: query.skip(),
                    limit: query.limit(),
                    include_similarity: query.include_similarity(),
                    include_sort_vector: query.include_sort_vector(),
                    page_state: page_state.cloned(),
                },
            },
        }
    }

    /// Renders the command as JSON.
    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Parses a `find` response into a page of documents.
pub fn parse_find_response(response: &Json) -> Result<Page<Doc>> {
    if let Some(errors) = response.get("errors").and_then(Json::as_array) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|e| match e.get("message").and_then(Json::as_str) {
                    Some(message) => message.to_string(),
                    None => e.to_string(),
                })
                .collect();
            return Err(TransportError::Api { messages }.into());
        }
    }

    let invalid = |reason: &str| TransportError::InvalidResponse {
        reason: reason.to_string(),
    };

    let data = response
        .get("data")
        .ok_or_else(|| invalid("missing 'data'"))?;
    let documents = data
        .get("documents")
        .and_then(Json::as_array)
        .ok_or_else(|| invalid("missing 'data.documents' array"))?;

    let items = documents
        .iter()
        .map(Doc::from_json)
        .collect::<Result<Vec<_>>>()?;

    let next_page_state = match data.get("nextPageState") {
        None | Some(Json::Null) => None,
        Some(Json::String(token)) => Some(PageState::new(token.as_str())),
        Some(_) => return Err(invalid("'nextPageState' must be a string or null").into()),
    };

    let sort_vector = match response.get("status").and_then(|s| s.get("sortVector")) {
        None | Some(Json::Null) => None,
        Some(Json::Array(values)) => Some(
            values
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or_else(|| invalid("'sortVector' must hold numbers"))?,
        ),
        Some(_) => return Err(invalid("'sortVector' must be an array").into()),
    };

    Ok(Page {
        items,
        next_page_state,
        sort_vector,
    })
}

/// Fetches pages from one collection over HTTP.
///
/// Timeouts come from [`ClientConfig::timeout_ms`]. Failed requests are not
/// retried here; the error reaches the cursor's caller, who may retry by
/// calling `has_next` again.
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
    url: Url,
    collection: String,
    token: Option<String>,
}

impl HttpPageFetcher {
    pub fn new(config: &ClientConfig, collection: &str) -> Result<Self> {
        let url = config.collection_url(collection)?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            url,
            collection: collection.to_string(),
            token: config.token.clone(),
        })
    }

    /// The collection endpoint commands are sent to
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Opens an idle cursor over `query`.
    pub fn cursor(&self, query: QuerySpec) -> Cursor<Doc> {
        Cursor::from_fetcher(self.clone(), query)
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("url", &self.url.as_str())
            .field("collection", &self.collection)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl PageFetcher<Doc> for HttpPageFetcher {
    fn fetch(&self, query: &QuerySpec, page_state: Option<&PageState>) -> Result<Page<Doc>> {
        let command = FindCommand::from_query(query, page_state);
        debug!(
            collection = %self.collection,
            has_page_state = page_state.is_some(),
            "Sending find command"
        );

        let mut request = self.client.post(self.url.clone()).json(&command);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().map_err(|e| TransportError::Request {
            url: self.url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(collection = %self.collection, %status, "Find command failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let json: Json = response
            .json()
            .map_err(|e| TransportError::InvalidResponse {
                reason: e.to_string(),
            })?;
        parse_find_response(&json)
    }
}
