//! Client configuration via `context.toml`
//!
//! Every setting has a default resolved when the config is built, so
//! nothing is looked up at call time. The vocabulary location is never
//! derived from the environment: either it is configured, or the caller
//! passes a home directory to [`ClientConfig::resolve_vocabulary`].

use crate::retry::RetryPolicy;
use context_core::{Error, Result};
use context_lexical::VocabularyPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "context.toml";

/// Default engine endpoint.
pub const DEFAULT_URL: &str = "http://localhost:6333";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection and behaviour settings for a [`crate::ContextIndex`].
///
/// # Example
///
/// ```toml
/// url = "http://localhost:6333"
/// # api_key = "secret"
/// timeout_ms = 30000
///
/// [retry]
/// max_attempts = 3
/// initial_delay_ms = 1000
///
/// [vocabulary]
/// dir = "/var/lib/context/vocabulary"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Engine base URL
    pub url: String,
    /// Optional API key, sent as the `api-key` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Retry budget for remote calls
    pub retry: RetryPolicy,
    /// Vocabulary snapshot location; see [`ClientConfig::resolve_vocabulary`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<VocabularyPaths>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default(),
            vocabulary: None,
        }
    }
}

impl ClientConfig {
    /// Config for `url` with every other setting at its default
    pub fn new(url: impl Into<String>) -> Self {
        ClientConfig {
            url: url.into(),
            ..ClientConfig::default()
        }
    }

    /// Builder: set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder: set the vocabulary location
    pub fn with_vocabulary(mut self, vocabulary: VocabularyPaths) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)
            .map_err(|e| Error::Serialization(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// URL is empty.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Serialization(msg) => {
                Error::Serialization(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Vocabulary location to use.
    ///
    /// The configured location wins. Otherwise `home` selects the
    /// `<home>/.context/vocabulary` layout. With neither, this fails.
    pub fn resolve_vocabulary(&self, home: Option<&Path>) -> Result<VocabularyPaths> {
        match (&self.vocabulary, home) {
            (Some(paths), _) => Ok(paths.clone()),
            (None, Some(home)) => Ok(VocabularyPaths::under_home(home)),
            (None, None) => Err(Error::invalid_request(
                "no vocabulary location configured and no home directory given",
            )),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::invalid_request("url must not be empty"));
        }
        Ok(())
    }
}
