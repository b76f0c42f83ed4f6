//! Documents stored in and returned from vector stores.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A piece of text with its metadata.
///
/// When returned from a similarity search, `score` holds the similarity of the
/// document to the query; it is `0.0` for documents that have not been scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The text content.
    pub page_content: String,
    /// Arbitrary metadata stored alongside the vector.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Similarity score.
    #[serde(default)]
    pub score: f32,
}

impl Document {
    /// Creates a new document with the given content.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            ..Default::default()
        }
    }

    /// Replaces the metadata.
    pub fn with_metadata(
        mut self,
        metadata: impl IntoIterator<Item = (impl Into<String>, serde_json::Value)>,
    ) -> Self {
        self.metadata = metadata.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the similarity score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }
}
