//! gRPC transport built on `qdrant-client`.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeleteCollectionBuilder, Distance, Filter, ListValue,
    PointId, PointStruct, SearchPointsBuilder, Struct, UpsertPointsBuilder, Value,
    VectorParamsBuilder,
};

use super::Backend;
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};
use crate::options::StoreConfig;
use crate::types::{MatchValue, Point, ScoredPoint, SearchOptions};

/// Qdrant gRPC client.
pub(crate) struct GrpcBackend {
    client: Qdrant,
}

impl GrpcBackend {
    /// Builds the client without contacting the server.
    pub(crate) fn new(config: &StoreConfig) -> Result<Self> {
        let mut builder = Qdrant::from_url(config.host())
            .api_key(config.api_key().to_owned())
            .skip_compatibility_check();

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CLIENT,
                error = %e,
                url = %config.host(),
                "Failed to create Qdrant client"
            );
            Error::connection(e.to_string())
        })?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            url = %config.host(),
            "gRPC transport ready"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl Backend for GrpcBackend {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.client.collection_exists(name).await?)
    }

    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<()> {
        let request = CreateCollectionBuilder::new(name)
            .vectors_config(VectorParamsBuilder::new(dimensions, Distance::Cosine));
        let response = self.client.create_collection(request).await?;

        if !response.result {
            return Err(Error::unexpected_response(format!(
                "collection '{name}' was not created"
            )));
        }

        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client
            .delete_collection(DeleteCollectionBuilder::new(name))
            .await?;
        Ok(())
    }

    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                let payload: HashMap<String, Value> = point
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_to_qdrant_value(v)))
                    .collect();

                PointStruct::new(point.id, point.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await?;

        Ok(())
    }

    async fn search_points(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredPoint>> {
        let mut search = SearchPointsBuilder::new(collection, vector, limit).with_payload(true);

        if let Some(threshold) = options.score_threshold {
            search = search.score_threshold(threshold);
        }

        let conditions = match_conditions(options);
        if !conditions.is_empty() {
            search = search.filter(Filter::must(conditions));
        }

        let response = self.client.search_points(search).await?;

        let hits = response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point_id_to_string(point.id).unwrap_or_default(),
                score: point.score,
                payload: point
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, qdrant_value_to_json(v)))
                    .collect(),
            })
            .collect();

        Ok(hits)
    }
}

/// Converts search options into must-match conditions.
fn match_conditions(options: &SearchOptions) -> Vec<Condition> {
    options
        .match_conditions()
        .into_iter()
        .map(|(key, value)| match value {
            MatchValue::Keyword(s) => Condition::matches(key, s),
            MatchValue::Integer(i) => Condition::matches(key, i),
            MatchValue::Boolean(b) => Condition::matches(key, b),
        })
        .collect()
}

/// Renders a point id as a string.
fn point_id_to_string(id: Option<PointId>) -> Option<String> {
    match id?.point_id_options? {
        PointIdOptions::Num(n) => Some(n.to_string()),
        PointIdOptions::Uuid(s) => Some(s),
    }
}

/// Converts a JSON value to a Qdrant value.
fn json_to_qdrant_value(value: serde_json::Value) -> Value {
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Kind::IntegerValue(i)
            } else if let Some(f) = n.as_f64() {
                Kind::DoubleValue(f)
            } else {
                Kind::StringValue(n.to_string())
            }
        }
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(arr) => Kind::ListValue(ListValue {
            values: arr.into_iter().map(json_to_qdrant_value).collect(),
        }),
        serde_json::Value::Object(obj) => Kind::StructValue(Struct {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    Value { kind: Some(kind) }
}

/// Converts a Qdrant value to a JSON value.
fn qdrant_value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(f)) => serde_json::Value::from(f),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(Kind::StructValue(obj)) => serde_json::Value::Object(
            obj.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}
