//! Client configuration.
//!
//! [`ClientConfig`] holds everything needed to reach a collection on a JSON
//! document API: the endpoint, the application token, the keyspace and the
//! request timeout. It can be built in code, read from a JSON file or read
//! from `TABULA_*` environment variables.
//!
//! ```
//! use tabula::config::ClientConfig;
//!
//! let config = ClientConfig {
//!     endpoint: "https://db.example.com".to_string(),
//!     keyspace: "shop".to_string(),
//!     ..Default::default()
//! };
//! let url = config.collection_url("products")?;
//! assert_eq!(url.as_str(), "https://db.example.com/api/json/v1/shop/products");
//! # Ok::<(), tabula::Error>(())
//! ```

use std::{fmt, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_ENDPOINT, DEFAULT_KEYSPACE, DEFAULT_TIMEOUT_MS, ENV_ENDPOINT,
    ENV_KEYSPACE, ENV_TIMEOUT_MS, ENV_TOKEN,
};

/// Errors for invalid client configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint is not an absolute URL that can carry a path
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A setting holds a value of the wrong shape
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Connection settings for a JSON document API.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API server
    pub endpoint: String,

    /// Application token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Keyspace holding the collections
    pub keyspace: String,

    /// Path of the JSON API below the endpoint
    pub api_path: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Default page-size hint for queries built with
    /// [`QuerySpec::from_config`](crate::cursor::QuerySpec::from_config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            keyspace: DEFAULT_KEYSPACE.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            page_size: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("keyspace", &self.keyspace)
            .field("api_path", &self.api_path)
            .field("timeout_ms", &self.timeout_ms)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl ClientConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes this configuration to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads the `TABULA_*` environment variables over the defaults.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_env_vars(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an environment lookup function.
    ///
    /// ```
    /// # use tabula::config::ClientConfig;
    /// let config = ClientConfig::from_env_vars(|name| match name {
    ///     "TABULA_KEYSPACE" => Some("shop".to_string()),
    ///     "TABULA_TIMEOUT_MS" => Some("500".to_string()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(config.keyspace, "shop");
    /// assert_eq!(config.timeout().as_millis(), 500);
    /// # Ok::<(), tabula::Error>(())
    /// ```
    pub fn from_env_vars(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            config.token = Some(token);
        }
        if let Some(keyspace) = lookup(ENV_KEYSPACE) {
            config.keyspace = keyspace;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_MS,
                value: timeout.clone(),
                reason: "expected a whole number of milliseconds",
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the endpoint parses and the keyspace is non-empty.
    pub fn validate(&self) -> crate::Result<()> {
        self.endpoint_url()?;
        if self.keyspace.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "keyspace",
                value: String::new(),
                reason: "keyspace must not be empty",
            }
            .into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses the endpoint.
    pub fn endpoint_url(&self) -> crate::Result<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: "URL cannot carry a path".to_string(),
            }
            .into());
        }
        Ok(url)
    }

    /// Composes `endpoint/api_path/keyspace/collection`.
    ///
    /// Each part is percent-encoded as a single path segment.
    pub fn collection_url(&self, collection: &str) -> crate::Result<Url> {
        let mut url = self.endpoint_url()?;
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| ConfigError::InvalidEndpoint {
                        endpoint: self.endpoint.clone(),
                        reason: "URL cannot carry a path".to_string(),
                    })?;
            segments
                .pop_if_empty()
                .extend(self.api_path.split('/').filter(|s| !s.is_empty()))
                .push(&self.keyspace)
                .push(collection);
        }
        Ok(url)
    }
}
