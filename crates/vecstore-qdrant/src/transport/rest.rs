//! REST transport built on `reqwest`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Backend;
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};
use crate::options::StoreConfig;
use crate::types::{MatchValue, Point, ScoredPoint, SearchOptions};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "api-key";

/// Qdrant REST API client.
pub(crate) struct RestBackend {
    http: Client,
    base_url: String,
}

impl RestBackend {
    /// Builds the HTTP client with the API key as a default header.
    pub(crate) fn new(config: &StoreConfig) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(config.api_key())
            .map_err(|_| Error::connection("API key is not a valid header value"))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(format!("vecstore-qdrant/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CLIENT,
                error = %e,
                "Failed to create HTTP client"
            );
            Error::connection(e.to_string())
        })?;

        let base_url = config.host().trim_end_matches('/').to_owned();

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            url = %base_url,
            "REST transport ready"
        );

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and unwraps the `result` field of the response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::server(status.as_u16(), error_message(body)));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let request = self.http.get(self.url(&format!("/collections/{name}/exists")));
        let result: CollectionExists = self.send(request).await?;
        Ok(result.exists)
    }

    async fn create_collection(&self, name: &str, dimensions: u64) -> Result<()> {
        let body = CreateCollection {
            vectors: VectorParams {
                size: dimensions,
                distance: "Cosine",
            },
        };

        let request = self
            .http
            .put(self.url(&format!("/collections/{name}")))
            .json(&body);
        let created: bool = self.send(request).await?;

        if !created {
            return Err(Error::unexpected_response(format!(
                "collection '{name}' was not created"
            )));
        }

        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let request = self.http.delete(self.url(&format!("/collections/{name}")));
        let _deleted: bool = self.send(request).await?;
        Ok(())
    }

    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let body = UpsertPoints { points: &points };

        let request = self
            .http
            .put(self.url(&format!("/collections/{collection}/points")))
            .query(&[("wait", "true")])
            .json(&body);
        let update: UpdateResult = self.send(request).await?;

        tracing::trace!(
            target: TRACING_TARGET_CLIENT,
            status = %update.status,
            operation_id = ?update.operation_id,
            "Upsert acknowledged"
        );

        Ok(())
    }

    async fn search_points(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredPoint>> {
        let body = SearchPoints {
            vector: &vector,
            limit,
            with_payload: true,
            score_threshold: options.score_threshold,
            filter: Filter::from_options(options),
        };

        let request = self
            .http
            .post(self.url(&format!("/collections/{collection}/points/search")))
            .json(&body);
        let hits: Vec<RestScoredPoint> = self.send(request).await?;

        Ok(hits.into_iter().map(ScoredPoint::from).collect())
    }
}

/// Extracts `status.error` from a Qdrant error body, falling back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/status/error")?.as_str().map(str::to_owned))
        .unwrap_or(body)
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionExists {
    exists: bool,
}

#[derive(Deserialize)]
struct UpdateResult {
    #[serde(default)]
    operation_id: Option<u64>,
    status: String,
}

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: u64,
    distance: &'static str,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: &'a [Point],
}

#[derive(Serialize)]
struct SearchPoints<'a> {
    vector: &'a [f32],
    limit: u64,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
}

#[derive(Serialize)]
struct Filter {
    must: Vec<FieldCondition>,
}

impl Filter {
    fn from_options(options: &SearchOptions) -> Option<Self> {
        let must: Vec<FieldCondition> = options
            .match_conditions()
            .into_iter()
            .map(|(key, value)| FieldCondition {
                key,
                match_value: Match {
                    value: match value {
                        MatchValue::Keyword(s) => serde_json::Value::String(s),
                        MatchValue::Integer(i) => serde_json::Value::from(i),
                        MatchValue::Boolean(b) => serde_json::Value::Bool(b),
                    },
                },
            })
            .collect();

        (!must.is_empty()).then_some(Self { must })
    }
}

#[derive(Serialize)]
struct FieldCondition {
    key: String,
    #[serde(rename = "match")]
    match_value: Match,
}

#[derive(Serialize)]
struct Match {
    value: serde_json::Value,
}

#[derive(Deserialize)]
struct RestScoredPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<HashMap<String, serde_json::Value>>,
}

impl From<RestScoredPoint> for ScoredPoint {
    fn from(point: RestScoredPoint) -> Self {
        let id = match point.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        Self {
            id,
            score: point.score,
            payload: point.payload.unwrap_or_default(),
        }
    }
}
