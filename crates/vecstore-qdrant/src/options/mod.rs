//! Store options and their validation.

mod config;

use std::fmt;
use std::time::Duration;

pub use config::StoreConfig;
use strum::{AsRefStr, Display};
use vecstore_core::SharedEmbedder;

use crate::TRACING_TARGET_CLIENT;
use crate::error::Result;

/// Environment variable consulted when no API key option is given.
pub const QDRANT_API_KEY_ENV: &str = "QDRANT_API_KEY";

/// Payload field that holds document text unless overridden.
pub const DEFAULT_TEXT_KEY: &str = "text";

/// Wire transport used to reach Qdrant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Transport {
    /// JSON over HTTP, usually on port 6333.
    #[default]
    Rest,
    /// gRPC through `qdrant-client`, usually on port 6334.
    Grpc,
}

/// Options for building a [`QdrantStore`].
///
/// Setters assign a single field and can be chained in any order; calling a
/// setter twice keeps the last value. Nothing is checked until
/// [`StoreOptions::validate`] or [`StoreOptions::build`] runs.
///
/// [`QdrantStore`]: crate::QdrantStore
#[derive(Clone)]
pub struct StoreOptions {
    pub(crate) embedder: Option<SharedEmbedder>,
    pub(crate) index_name: String,
    pub(crate) collection_name: String,
    pub(crate) host: String,
    pub(crate) api_key: String,
    pub(crate) text_key: String,
    pub(crate) use_grpc: bool,
    pub(crate) timeout: Option<Duration>,
}

impl StoreOptions {
    /// Creates options with the default text key and nothing else set.
    pub fn new() -> Self {
        Self {
            embedder: None,
            index_name: String::new(),
            collection_name: String::new(),
            host: String::new(),
            api_key: String::new(),
            text_key: DEFAULT_TEXT_KEY.to_owned(),
            use_grpc: false,
            timeout: None,
        }
    }

    /// Sets the embedder used to vectorize documents and queries. Required.
    pub fn with_embedder(mut self, embedder: SharedEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Sets the logical index name. Required.
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Sets the Qdrant collection to read from and write to. Required.
    pub fn with_collection_name(mut self, collection_name: impl Into<String>) -> Self {
        self.collection_name = collection_name.into();
        self
    }

    /// Sets the API key.
    ///
    /// When not set, the key is read from the `QDRANT_API_KEY` environment
    /// variable during validation.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the payload field that stores the text of each document.
    pub fn with_text_key(mut self, text_key: impl Into<String>) -> Self {
        self.text_key = text_key.into();
        self
    }

    /// Sets the host to upsert and query vectors through. Required.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the request timeout of the transport client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Switches to the gRPC transport.
    pub(crate) fn with_grpc(mut self) -> Self {
        self.use_grpc = true;
        self
    }

    /// Reads options from `QDRANT_*` environment variables.
    ///
    /// | Variable | Option |
    /// |---|---|
    /// | `QDRANT_HOST` | host |
    /// | `QDRANT_COLLECTION` | collection name |
    /// | `QDRANT_INDEX` | index name |
    /// | `QDRANT_TEXT_KEY` | text key |
    /// | `QDRANT_USE_GRPC` | gRPC transport when `true` or `1` |
    /// | `QDRANT_TIMEOUT_SECS` | request timeout |
    ///
    /// The embedder is never read from the environment and must be set
    /// afterwards. The API key keeps its usual fallback at validation time.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::new();

        if let Some(host) = env("QDRANT_HOST") {
            options = options.with_host(host);
        }

        if let Some(collection) = env("QDRANT_COLLECTION") {
            options = options.with_collection_name(collection);
        }

        if let Some(index) = env("QDRANT_INDEX") {
            options = options.with_index_name(index);
        }

        if let Some(text_key) = env("QDRANT_TEXT_KEY")
            && !text_key.is_empty()
        {
            options = options.with_text_key(text_key);
        }

        if let Some(flag) = env("QDRANT_USE_GRPC")
            && matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "1")
        {
            options = options.with_grpc();
        }

        if let Some(secs) = env("QDRANT_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => options = options.with_timeout(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    value = %secs,
                    "Ignoring unparsable QDRANT_TIMEOUT_SECS"
                ),
            }
        }

        options
    }

    /// Returns the transport these options select.
    pub fn transport(&self) -> Transport {
        if self.use_grpc {
            Transport::Grpc
        } else {
            Transport::Rest
        }
    }

    /// Validates the options, reading the API key from the process
    /// environment when none was set.
    pub fn validate(self) -> Result<StoreConfig> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    /// Validates the options with a custom environment lookup.
    ///
    /// Checks run in a fixed order and stop at the first failure: index name,
    /// host, embedder, collection name, API key.
    pub fn validate_with(self, env: impl Fn(&str) -> Option<String>) -> Result<StoreConfig> {
        StoreConfig::from_options(self, env)
    }

    /// Validates the options and builds the store.
    pub fn build(self) -> Result<crate::QdrantStore> {
        crate::QdrantStore::new(self)
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("embedder", &self.embedder.as_ref().map(|_| "<embedder>"))
            .field("index_name", &self.index_name)
            .field("collection_name", &self.collection_name)
            .field("host", &self.host)
            .field("api_key", &(!self.api_key.is_empty()).then_some("<redacted>"))
            .field("text_key", &self.text_key)
            .field("transport", &self.transport())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let options = StoreOptions::new();
        assert_eq!(options.text_key, DEFAULT_TEXT_KEY);
        assert!(options.embedder.is_none());
        assert!(options.index_name.is_empty());
        assert!(options.api_key.is_empty());
        assert_eq!(options.transport(), Transport::Rest);
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let options = StoreOptions::new()
            .with_host("http://first:6333")
            .with_text_key("body")
            .with_host("http://second:6333")
            .with_text_key("content");

        assert_eq!(options.host, "http://second:6333");
        assert_eq!(options.text_key, "content");
    }

    #[test]
    fn test_with_grpc() {
        let options = StoreOptions::new().with_grpc();
        assert_eq!(options.transport(), Transport::Grpc);
        assert_eq!(options.transport().to_string(), "grpc");
    }

    #[test]
    fn test_from_env() {
        let env = env_from(&[
            ("QDRANT_HOST", "http://qdrant:6334"),
            ("QDRANT_COLLECTION", "mycol"),
            ("QDRANT_INDEX", "docs"),
            ("QDRANT_TEXT_KEY", "body"),
            ("QDRANT_USE_GRPC", "TRUE"),
            ("QDRANT_TIMEOUT_SECS", "5"),
        ]);

        let options = StoreOptions::from_env_with(env);
        assert_eq!(options.host, "http://qdrant:6334");
        assert_eq!(options.collection_name, "mycol");
        assert_eq!(options.index_name, "docs");
        assert_eq!(options.text_key, "body");
        assert_eq!(options.transport(), Transport::Grpc);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.embedder.is_none());
    }

    #[test]
    fn test_from_env_ignores_bad_values() {
        let env = env_from(&[
            ("QDRANT_TEXT_KEY", ""),
            ("QDRANT_USE_GRPC", "nope"),
            ("QDRANT_TIMEOUT_SECS", "soon"),
        ]);

        let options = StoreOptions::from_env_with(env);
        assert_eq!(options.text_key, DEFAULT_TEXT_KEY);
        assert_eq!(options.transport(), Transport::Rest);
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let options = StoreOptions::new().with_api_key("super-secret");
        let debug = format!("{options:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
