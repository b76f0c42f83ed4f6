//! Mock embedder for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use vecstore_core::{Embedder, Error, Result, TRACING_TARGET};

/// Embedder that derives vectors from the bytes of the input text.
///
/// The same text always yields the same vector, so stores can be tested
/// without a model. Calls are counted per method.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
    fail: bool,
    document_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl MockEmbedder {
    /// Creates an embedder producing vectors of `dimensions` components.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            fail: false,
            document_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    /// Creates an embedder whose every call fails with an external error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns the vector size.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of `embed_documents` calls so far.
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    /// Number of `embed_query` calls so far.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Computes the vector for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += f32::from(byte) / 255.0;
        }
        vector
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::external_error().with_message("mock embedder failure"));
        }
        Ok(())
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        tracing::trace!(
            target: TRACING_TARGET,
            count = texts.len(),
            dimensions = self.dimensions,
            "Mock embedding documents"
        );

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        tracing::trace!(
            target: TRACING_TARGET,
            dimensions = self.dimensions,
            "Mock embedding query"
        );

        Ok(self.vector_for(text))
    }
}
