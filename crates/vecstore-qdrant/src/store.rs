//! Qdrant-backed vector store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;
use vecstore_core::{Document, SharedEmbedder};

use crate::client::{CollectionsClient, PointsClient};
use crate::error::{Error, Result};
use crate::options::{StoreConfig, StoreOptions, Transport};
use crate::types::{Point, ScoredPoint, SearchOptions};
use crate::{TRACING_TARGET_CLIENT, TRACING_TARGET_POINTS, TRACING_TARGET_SEARCH, transport};

/// Vector store that keeps documents in a Qdrant collection.
///
/// Documents are embedded with the configured embedder and written as points
/// whose payload holds the document metadata plus its text under the text
/// key. The store is cheap to clone and safe to share between tasks.
///
/// # Examples
///
/// ```rust,no_run
/// # use vecstore_core::SharedEmbedder;
/// use vecstore_qdrant::StoreOptions;
///
/// # fn example(embedder: SharedEmbedder) -> vecstore_qdrant::Result<()> {
/// let store = StoreOptions::new()
///     .with_embedder(embedder)
///     .with_index_name("docs")
///     .with_host("http://localhost:6333")
///     .with_collection_name("mycol")
///     .with_api_key("k1")
///     .build()?;
///
/// assert_eq!(store.text_key(), "text");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QdrantStore {
    inner: Arc<QdrantStoreInner>,
}

struct QdrantStoreInner {
    config: StoreConfig,
    collections: CollectionsClient,
    points: PointsClient,
}

impl QdrantStore {
    /// Validates `options` and creates the store.
    ///
    /// Construction only builds local client state; the server is first
    /// contacted by the operations below.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] for the first option that failed
    /// validation, or [`Error::Connection`] if the transport client could not
    /// be built.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CLIENT)]
    pub fn new(options: StoreOptions) -> Result<Self> {
        let config = options.validate().inspect_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                error = %e,
                "Rejected store options"
            );
        })?;

        let backend = transport::connect(&config)?;
        let collections = CollectionsClient::new(backend.clone());
        let points = PointsClient::new(backend);

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            host = %config.host(),
            index = %config.index_name(),
            collection = %config.collection_name(),
            transport = %config.transport(),
            "Qdrant store created"
        );

        let inner = QdrantStoreInner {
            config,
            collections,
            points,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn index_name(&self) -> &str {
        self.inner.config.index_name()
    }

    pub fn collection_name(&self) -> &str {
        self.inner.config.collection_name()
    }

    pub fn host(&self) -> &str {
        self.inner.config.host()
    }

    /// Returns the payload field that stores document text.
    pub fn text_key(&self) -> &str {
        self.inner.config.text_key()
    }

    /// Returns the API key the transport authenticates with.
    pub fn api_key(&self) -> &str {
        self.inner.config.api_key()
    }

    pub fn transport(&self) -> Transport {
        self.inner.config.transport()
    }

    pub fn embedder(&self) -> &SharedEmbedder {
        self.inner.config.embedder()
    }

    /// Returns the client for collection operations.
    pub fn collections(&self) -> &CollectionsClient {
        &self.inner.collections
    }

    /// Returns the client for point operations.
    pub fn points(&self) -> &PointsClient {
        &self.inner.points
    }

    /// Creates the configured collection unless it already exists.
    ///
    /// Returns `true` when a new collection was created.
    pub async fn ensure_collection(&self, dimensions: u64) -> Result<bool> {
        self.collections()
            .ensure(self.collection_name(), dimensions)
            .await
    }

    /// Embeds and stores `documents`, returning the ids of the new points in
    /// input order.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_POINTS, fields(count = documents.len()))]
    pub async fn add_documents(&self, documents: &[Document]) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embedder().embed_documents(&texts).await?;

        if vectors.len() != documents.len() {
            return Err(Error::EmbeddingCountMismatch {
                expected: documents.len(),
                actual: vectors.len(),
            });
        }

        let text_key = self.text_key();
        let points: Vec<Point> = documents
            .iter()
            .zip(vectors)
            .map(|(document, vector)| {
                let mut payload = document.metadata.clone();
                payload.insert(
                    text_key.to_owned(),
                    serde_json::Value::String(document.page_content.clone()),
                );

                Point::new(Uuid::new_v4().to_string(), vector).with_payload(payload)
            })
            .collect();

        let ids: Vec<String> = points.iter().map(|p| p.id.clone()).collect();
        self.points().upsert(self.collection_name(), points).await?;

        tracing::info!(
            target: TRACING_TARGET_POINTS,
            collection = %self.collection_name(),
            count = ids.len(),
            "Documents added"
        );

        Ok(ids)
    }

    /// Returns up to `limit` documents most similar to `query`.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_SEARCH, fields(limit = limit))]
    pub async fn similarity_search(
        &self,
        query: &str,
        limit: u64,
        options: &SearchOptions,
    ) -> Result<Vec<Document>> {
        let vector = self.embedder().embed_query(query).await?;

        let hits = self
            .points()
            .search(self.collection_name(), vector, limit, options)
            .await?;

        Ok(hits
            .into_iter()
            .map(|hit| self.hit_to_document(hit))
            .collect())
    }

    fn hit_to_document(&self, hit: ScoredPoint) -> Document {
        let mut metadata: HashMap<String, serde_json::Value> = hit.payload;

        let page_content = match metadata.remove(self.text_key()) {
            Some(serde_json::Value::String(text)) => text,
            Some(other) => {
                tracing::debug!(
                    target: TRACING_TARGET_SEARCH,
                    point_id = %hit.id,
                    text_key = %self.text_key(),
                    "Text payload is not a string"
                );
                metadata.insert(self.text_key().to_owned(), other);
                String::new()
            }
            None => String::new(),
        };

        Document {
            page_content,
            metadata,
            score: hit.score,
        }
    }
}

impl fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QdrantStore")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::json;
    use vecstore_core::Embedder;
    use vecstore_test::MockEmbedder;

    use super::*;
    use crate::InvalidOption;

    fn options(host: &str, embedder: Arc<MockEmbedder>) -> StoreOptions {
        StoreOptions::new()
            .with_embedder(embedder)
            .with_index_name("docs")
            .with_host(host)
            .with_collection_name("mycol")
            .with_api_key("k1")
    }

    #[test]
    fn test_new_with_valid_options() {
        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options("http://localhost:6333", embedder)).unwrap();

        assert_eq!(store.index_name(), "docs");
        assert_eq!(store.collection_name(), "mycol");
        assert_eq!(store.host(), "http://localhost:6333");
        assert_eq!(store.api_key(), "k1");
        assert_eq!(store.text_key(), "text");
        assert_eq!(store.transport(), Transport::Rest);
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let embedder = Arc::new(MockEmbedder::new(3));
        let error = QdrantStore::new(options("", embedder)).unwrap_err();
        assert_eq!(error.invalid_option(), Some(InvalidOption::MissingHost));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let embedder = Arc::new(MockEmbedder::new(3));
        let store = options("http://localhost:6333", embedder).build().unwrap();
        assert!(!format!("{store:?}").contains("k1"));
    }

    #[tokio::test]
    async fn test_new_with_grpc_transport() {
        let embedder = Arc::new(MockEmbedder::new(3));
        let store = options("http://localhost:6334", embedder)
            .with_grpc()
            .build()
            .unwrap();
        assert_eq!(store.transport(), Transport::Grpc);
    }

    #[tokio::test]
    async fn test_add_documents_upserts_payload() {
        let server = MockServer::start_async().await;

        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/mycol/points")
                    .query_param("wait", "true")
                    .header("api-key", "k1")
                    .body_contains("\"text\":\"hello\"")
                    .body_contains("\"lang\":\"en\"");
                then.status(200).json_body(json!({
                    "result": { "operation_id": 3, "status": "completed" },
                    "status": "ok"
                }));
            })
            .await;

        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options(&server.base_url(), embedder.clone())).unwrap();

        let documents = vec![
            Document::new("hello").with_field("lang", json!("en")),
            Document::new("world"),
        ];
        let ids = store.add_documents(&documents).await.unwrap();

        upsert.assert_async().await;
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(ids.iter().all(|id| Uuid::parse_str(id).is_ok()));
        assert_eq!(embedder.document_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_documents_uses_custom_text_key() {
        let server = MockServer::start_async().await;

        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/mycol/points")
                    .body_contains("\"body\":\"hello\"");
                then.status(200).json_body(json!({
                    "result": { "operation_id": 4, "status": "completed" },
                    "status": "ok"
                }));
            })
            .await;

        let embedder = Arc::new(MockEmbedder::new(3));
        let store = options(&server.base_url(), embedder)
            .with_text_key("body")
            .build()
            .unwrap();

        store.add_documents(&[Document::new("hello")]).await.unwrap();
        upsert.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_no_documents_skips_embedder() {
        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options("http://127.0.0.1:9", embedder.clone())).unwrap();

        let ids = store.add_documents(&[]).await.unwrap();

        assert!(ids.is_empty());
        assert_eq!(embedder.document_calls(), 0);
    }

    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn embed_documents(&self, _: &[String]) -> vecstore_core::Result<Vec<Vec<f32>>> {
            Ok(vec![vec![0.0, 1.0, 0.0]])
        }

        async fn embed_query(&self, _: &str) -> vecstore_core::Result<Vec<f32>> {
            Ok(vec![0.0, 1.0, 0.0])
        }
    }

    #[tokio::test]
    async fn test_add_documents_count_mismatch() {
        let store = StoreOptions::new()
            .with_embedder(Arc::new(ShortEmbedder))
            .with_index_name("docs")
            .with_host("http://127.0.0.1:9")
            .with_collection_name("mycol")
            .with_api_key("k1")
            .build()
            .unwrap();

        let documents = vec![Document::new("a"), Document::new("b")];
        let error = store.add_documents(&documents).await.unwrap_err();

        assert!(matches!(
            error,
            Error::EmbeddingCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_embedder_failure_is_reported() {
        let store = StoreOptions::new()
            .with_embedder(Arc::new(MockEmbedder::failing()))
            .with_index_name("docs")
            .with_host("http://127.0.0.1:9")
            .with_collection_name("mycol")
            .with_api_key("k1")
            .build()
            .unwrap();

        let error = store
            .similarity_search("hello", 3, &SearchOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Embedding(_)));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_similarity_search_maps_documents() {
        let server = MockServer::start_async().await;

        let search = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/mycol/points/search")
                    .header("api-key", "k1")
                    .body_contains("\"limit\":2");
                then.status(200).json_body(json!({
                    "result": [
                        {
                            "id": "0b6b1a3c-3a3e-4c36-9d59-7c0d1f0e6a11",
                            "version": 1,
                            "score": 0.92,
                            "payload": { "text": "hello", "lang": "en" }
                        },
                        {
                            "id": 5,
                            "version": 1,
                            "score": 0.41,
                            "payload": { "lang": "de" }
                        }
                    ],
                    "status": "ok"
                }));
            })
            .await;

        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options(&server.base_url(), embedder.clone())).unwrap();

        let documents = store
            .similarity_search("hello", 2, &SearchOptions::new())
            .await
            .unwrap();

        search.assert_async().await;
        assert_eq!(embedder.query_calls(), 1);
        assert_eq!(documents.len(), 2);

        assert_eq!(documents[0].page_content, "hello");
        assert_eq!(documents[0].score, 0.92);
        assert_eq!(documents[0].metadata.get("lang"), Some(&json!("en")));
        assert!(!documents[0].metadata.contains_key("text"));

        assert_eq!(documents[1].page_content, "");
        assert_eq!(documents[1].metadata.get("lang"), Some(&json!("de")));
    }

    #[tokio::test]
    async fn test_missing_collection_maps_to_server_error() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/mycol/points/search");
                then.status(404).json_body(json!({
                    "status": { "error": "Not found: Collection `mycol` doesn't exist!" },
                    "time": 0.0
                }));
            })
            .await;

        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options(&server.base_url(), embedder)).unwrap();

        let error = store
            .similarity_search("hello", 2, &SearchOptions::new())
            .await
            .unwrap_err();

        match error {
            Error::Server { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("doesn't exist"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ensure_collection_uses_configured_name() {
        let server = MockServer::start_async().await;

        let exists = server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/mycol/exists");
                then.status(200)
                    .json_body(json!({ "result": { "exists": true }, "status": "ok" }));
            })
            .await;

        let embedder = Arc::new(MockEmbedder::new(3));
        let store = QdrantStore::new(options(&server.base_url(), embedder)).unwrap();

        assert!(!store.ensure_collection(3).await.unwrap());
        exists.assert_async().await;
    }
}
