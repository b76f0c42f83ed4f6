//! Collection management.

use crate::TRACING_TARGET_COLLECTIONS;
use crate::error::Result;
use crate::transport::SharedBackend;

/// Client for collection-level operations.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct CollectionsClient {
    backend: SharedBackend,
}

impl CollectionsClient {
    pub(crate) fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Checks whether a collection exists.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS, fields(collection = %name))]
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let exists = self.backend.collection_exists(name).await?;

        tracing::debug!(
            target: TRACING_TARGET_COLLECTIONS,
            collection = %name,
            exists,
            "Checked collection"
        );

        Ok(exists)
    }

    /// Creates a collection of `dimensions`-sized vectors compared by cosine
    /// similarity.
    ///
    /// # Errors
    ///
    /// Fails if the collection already exists or the server rejects it.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS, fields(collection = %name, dimensions = dimensions))]
    pub async fn create(&self, name: &str, dimensions: u64) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET_COLLECTIONS,
            collection = %name,
            dimensions,
            "Creating collection"
        );

        self.backend
            .create_collection(name, dimensions)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_COLLECTIONS,
                    error = %e,
                    collection = %name,
                    "Failed to create collection"
                );
            })?;

        tracing::info!(
            target: TRACING_TARGET_COLLECTIONS,
            collection = %name,
            dimensions,
            "Collection created"
        );

        Ok(())
    }

    /// Creates the collection unless it already exists.
    ///
    /// Returns `true` when a new collection was created.
    pub async fn ensure(&self, name: &str, dimensions: u64) -> Result<bool> {
        if self.exists(name).await? {
            return Ok(false);
        }

        self.create(name, dimensions).await?;
        Ok(true)
    }

    /// Deletes a collection and all of its points.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_COLLECTIONS, fields(collection = %name))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.backend.delete_collection(name).await.inspect_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_COLLECTIONS,
                error = %e,
                collection = %name,
                "Failed to delete collection"
            );
        })?;

        tracing::info!(
            target: TRACING_TARGET_COLLECTIONS,
            collection = %name,
            "Collection deleted"
        );

        Ok(())
    }
}
