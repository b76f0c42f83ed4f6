//! Point and search types shared by both transports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A vector with its id and payload, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Point id; a UUID string.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Payload stored with the vector.
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
}

impl Point {
    /// Creates a point with an empty payload.
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            payload: HashMap::new(),
        }
    }

    /// Replaces the payload.
    pub fn with_payload(mut self, payload: HashMap<String, serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }
}

/// A point returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point id, rendered as a string for both UUID and numeric ids.
    pub id: String,
    /// Similarity score.
    pub score: f32,
    /// Payload stored with the vector.
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
}

/// Search options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Only return hits scoring at least this much.
    pub score_threshold: Option<f32>,
    /// Payload filter as a flat JSON object; every entry must match.
    pub filter: Option<serde_json::Value>,
}

impl SearchOptions {
    /// Creates default search options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score threshold.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Set a payload filter.
    pub fn with_filter(mut self, filter: serde_json::Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns the filter as `(field, value)` match conditions.
    ///
    /// Only string, integer and boolean values can be matched; other entries
    /// are skipped.
    pub(crate) fn match_conditions(&self) -> Vec<(String, MatchValue)> {
        let Some(serde_json::Value::Object(obj)) = &self.filter else {
            return Vec::new();
        };

        obj.iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => MatchValue::Keyword(s.clone()),
                    serde_json::Value::Number(n) => MatchValue::Integer(n.as_i64()?),
                    serde_json::Value::Bool(b) => MatchValue::Boolean(*b),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect()
    }
}

/// A value a payload field must equal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MatchValue {
    Keyword(String),
    Integer(i64),
    Boolean(bool),
}
