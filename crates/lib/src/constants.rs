//! Constants used throughout the Tabula library.
//!
//! This module provides central definitions for configuration defaults, the
//! field names of the JSON document API, and the environment variables the
//! client configuration reads.

/// Keyspace used when none is configured.
pub const DEFAULT_KEYSPACE: &str = "default_keyspace";

/// Path of the JSON API below the endpoint.
pub const DEFAULT_API_PATH: &str = "api/json/v1";

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8181";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Page size of the in-memory collection when a query gives no hint.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// HTTP header carrying the application token.
pub const TOKEN_HEADER: &str = "Token";

/// Document identifier field.
pub const ID_FIELD: &str = "_id";

/// Wrapper key for timestamps on the wire.
pub const DATE_KEY: &str = "$date";

/// Wrapper key for UUIDs on the wire.
pub const UUID_KEY: &str = "$uuid";

/// Wrapper key for binary data on the wire.
pub const BINARY_KEY: &str = "$binary";

// Environment variables read by `ClientConfig::from_env`
pub const ENV_ENDPOINT: &str = "TABULA_ENDPOINT";
pub const ENV_TOKEN: &str = "TABULA_TOKEN";
pub const ENV_KEYSPACE: &str = "TABULA_KEYSPACE";
pub const ENV_TIMEOUT_MS: &str = "TABULA_TIMEOUT_MS";
