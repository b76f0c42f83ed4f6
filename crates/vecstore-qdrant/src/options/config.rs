//! Validated store configuration.

use std::fmt;
use std::time::Duration;

use vecstore_core::SharedEmbedder;

use super::{QDRANT_API_KEY_ENV, StoreOptions, Transport};
use crate::TRACING_TARGET_CLIENT;
use crate::error::{InvalidOption, Result};

/// Store configuration that passed validation.
///
/// Every required field is non-empty and a credential has been resolved.
/// Instances only come out of [`StoreOptions::validate`].
#[derive(Clone)]
pub struct StoreConfig {
    pub(crate) embedder: SharedEmbedder,
    pub(crate) index_name: String,
    pub(crate) collection_name: String,
    pub(crate) host: String,
    pub(crate) api_key: String,
    pub(crate) text_key: String,
    pub(crate) transport: Transport,
    pub(crate) timeout: Option<Duration>,
}

impl StoreConfig {
    pub(crate) fn from_options(
        options: StoreOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let transport = options.transport();
        let StoreOptions {
            embedder,
            index_name,
            collection_name,
            host,
            mut api_key,
            text_key,
            timeout,
            ..
        } = options;

        if index_name.is_empty() {
            return Err(InvalidOption::MissingIndexName.into());
        }

        if host.is_empty() {
            return Err(InvalidOption::MissingHost.into());
        }

        let Some(embedder) = embedder else {
            return Err(InvalidOption::MissingEmbedder.into());
        };

        if collection_name.is_empty() {
            return Err(InvalidOption::MissingCollectionName.into());
        }

        if api_key.is_empty() {
            api_key = env(QDRANT_API_KEY_ENV).unwrap_or_default();
            if api_key.is_empty() {
                return Err(InvalidOption::MissingApiKey.into());
            }

            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                variable = QDRANT_API_KEY_ENV,
                "Using API key from environment"
            );
        }

        Ok(Self {
            embedder,
            index_name,
            collection_name,
            host,
            api_key,
            text_key,
            transport,
            timeout,
        })
    }

    /// Returns the embedder.
    pub fn embedder(&self) -> &SharedEmbedder {
        &self.embedder
    }

    /// Returns the logical index name.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Returns the Qdrant collection name.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Returns the host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the resolved API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the payload field that stores document text.
    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    /// Returns the selected transport.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Returns the request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("index_name", &self.index_name)
            .field("collection_name", &self.collection_name)
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .field("text_key", &self.text_key)
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
