#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for store construction and client wiring.
///
/// Use this target for logging option validation and transport setup.
pub const TRACING_TARGET_CLIENT: &str = "vecstore_qdrant::client";

/// Tracing target for collection operations.
pub const TRACING_TARGET_COLLECTIONS: &str = "vecstore_qdrant::collections";

/// Tracing target for point operations.
pub const TRACING_TARGET_POINTS: &str = "vecstore_qdrant::points";

/// Tracing target for similarity searches.
pub const TRACING_TARGET_SEARCH: &str = "vecstore_qdrant::search";

mod client;
mod error;
mod options;
mod store;
mod transport;
mod types;

pub use client::{CollectionsClient, PointsClient};
pub use error::{Error, InvalidOption, Result};
pub use options::{DEFAULT_TEXT_KEY, QDRANT_API_KEY_ENV, StoreConfig, StoreOptions, Transport};
pub use store::QdrantStore;
pub use types::{Point, ScoredPoint, SearchOptions};
