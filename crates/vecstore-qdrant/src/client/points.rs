//! Point upserts and similarity search.

use crate::error::Result;
use crate::transport::SharedBackend;
use crate::types::{Point, ScoredPoint, SearchOptions};
use crate::{TRACING_TARGET_POINTS, TRACING_TARGET_SEARCH};

/// Client for point-level operations.
#[derive(Clone)]
pub struct PointsClient {
    backend: SharedBackend,
}

impl PointsClient {
    pub(crate) fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Inserts or replaces points, waiting until the write is applied.
    ///
    /// An empty batch returns immediately without a request.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_POINTS, fields(collection = %collection, point_count = points.len()))]
    pub async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let point_count = points.len();

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %collection,
            point_count,
            "Upserting points"
        );

        self.backend
            .upsert_points(collection, points)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_POINTS,
                    error = %e,
                    collection = %collection,
                    "Failed to upsert points"
                );
            })?;

        tracing::debug!(
            target: TRACING_TARGET_POINTS,
            collection = %collection,
            point_count,
            "Points upserted"
        );

        Ok(())
    }

    /// Returns up to `limit` points closest to `vector`, best first.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_SEARCH, fields(collection = %collection, limit = limit))]
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredPoint>> {
        let hits = self
            .backend
            .search_points(collection, vector, limit, options)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_SEARCH,
                    error = %e,
                    collection = %collection,
                    "Search failed"
                );
            })?;

        tracing::debug!(
            target: TRACING_TARGET_SEARCH,
            collection = %collection,
            results = hits.len(),
            "Search completed"
        );

        Ok(hits)
    }
}
