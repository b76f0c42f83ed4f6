//! Wire transports for the Qdrant API.
//!
//! Both transports implement [`Backend`]; the operation-group clients only
//! ever see the trait object.

mod grpc;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::options::{StoreConfig, Transport};
use crate::types::{Point, ScoredPoint, SearchOptions};

/// Shared handle to a connected backend.
pub(crate) type SharedBackend = Arc<dyn Backend>;

/// Operations the store needs from a Qdrant transport.
#[async_trait]
pub(crate) trait Backend: Send + Sync {
    /// Checks if a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Creates a collection of cosine-distance vectors.
    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<()>;

    /// Deletes a collection.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upserts points and waits for the write to be applied.
    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()>;

    /// Searches for the points closest to `vector`.
    async fn search_points(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredPoint>>;
}

/// Creates the backend selected by the configuration.
///
/// Only local client state is built here; no request reaches the server.
pub(crate) fn connect(config: &StoreConfig) -> Result<SharedBackend> {
    let backend: SharedBackend = match config.transport() {
        Transport::Rest => Arc::new(rest::RestBackend::new(config)?),
        Transport::Grpc => Arc::new(grpc::GrpcBackend::new(config)?),
    };

    Ok(backend)
}
