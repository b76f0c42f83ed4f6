//! Error types for store construction and store operations.

use thiserror::Error;

/// Result type for all operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reason a set of store options was rejected.
///
/// Variants are listed in the order validation checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidOption {
    /// No index name was given.
    #[error("missing index name")]
    MissingIndexName,
    /// No host was given.
    #[error("missing host")]
    MissingHost,
    /// No embedder was given.
    #[error("missing embedder")]
    MissingEmbedder,
    /// No collection name was given.
    #[error("missing collection name")]
    MissingCollectionName,
    /// No API key was given and `QDRANT_API_KEY` is empty or unset.
    #[error(
        "missing api key. Pass it as an option or set the QDRANT_API_KEY environment variable"
    )]
    MissingApiKey,
}

/// Unified error type for the Qdrant store.
#[derive(Debug, Error)]
pub enum Error {
    /// The options given to the store are invalid.
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] InvalidOption),

    /// The transport client could not be created.
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP request to the REST API failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gRPC client returned an error.
    #[error("Qdrant client error: {0}")]
    Client(#[from] qdrant_client::QdrantError),

    /// The REST API answered with a non-success status.
    #[error("Qdrant server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The embedder failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] vecstore_core::Error),

    /// The embedder returned a different number of vectors than requested.
    #[error("embedder returned {actual} vectors for {expected} documents")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    /// Serialization errors when sending or receiving data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered with a body this crate does not understand.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Returns the rejected option if this is a configuration error.
    pub fn invalid_option(&self) -> Option<InvalidOption> {
        match self {
            Self::InvalidOptions(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns whether this error indicates a transient failure that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Client(_) => true,
            Self::Server { status, .. } => (500..=599).contains(status),
            Self::Embedding(e) => e.is_retryable(),
            _ => false,
        }
    }
}
