//! Embedding capability consumed by vector stores.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Shared handle to an embedder.
///
/// Stores hold the embedder through this alias; the caller keeps ownership
/// of the underlying implementation.
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Turns text into embedding vectors.
///
/// Implementations wrap a concrete model (hosted or local). Vector stores call
/// [`Embedder::embed_documents`] when writing and [`Embedder::embed_query`]
/// when searching, since some models encode queries differently.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text, returning one vector per input in the same order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embeds a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
impl<T> Embedder for Arc<T>
where
    T: Embedder + ?Sized,
{
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.as_ref().embed_documents(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.as_ref().embed_query(text).await
    }
}
