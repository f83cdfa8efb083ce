//! Qdrant REST transport
//!
//! [`QdrantRest`] implements [`IndexService`] over the engine's HTTP API
//! with `reqwest`. Successful responses arrive as `{"result": ...}`;
//! failures as `{"status": {"error": "..."}}` with a non-2xx status, which
//! become [`Error::Remote`] carrying the engine's message verbatim.

use crate::config::ClientConfig;
use crate::payload::{
    CollectionDescription, CreateCollection, PointStruct, QueryRequest, Record, ScoredPoint,
    ScrollRequest,
};
use crate::service::{Connector, IndexService};
use context_core::{CollectionKind, Error, Result, DENSE_VECTOR_NAME};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    status: Option<ErrorStatus>,
}

#[derive(Deserialize)]
struct ErrorStatus {
    error: Option<String>,
}

#[derive(Deserialize)]
struct CollectionList {
    collections: Vec<CollectionName>,
}

#[derive(Deserialize)]
struct CollectionName {
    name: String,
}

#[derive(Deserialize)]
struct CollectionInfo {
    points_count: Option<u64>,
    config: InfoConfig,
}

#[derive(Deserialize)]
struct InfoConfig {
    params: InfoParams,
}

#[derive(Deserialize)]
struct InfoParams {
    #[serde(default)]
    vectors: JsonValue,
    #[serde(default)]
    sparse_vectors: Option<serde_json::Map<String, JsonValue>>,
}

#[derive(Deserialize)]
struct QueryResponse {
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScrollResponse {
    points: Vec<Record>,
}

impl InfoParams {
    /// Dense dimension from an unnamed space, or from the named dense space
    fn dimension(&self) -> Option<usize> {
        let size = match self.vectors.get("size") {
            Some(size) => size,
            None => self.vectors.get(DENSE_VECTOR_NAME)?.get("size")?,
        };
        size.as_u64().map(|s| s as usize)
    }

    fn kind(&self) -> CollectionKind {
        match &self.sparse_vectors {
            Some(spaces) if !spaces.is_empty() => CollectionKind::Hybrid,
            _ => CollectionKind::DenseOnly,
        }
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else if e.is_decode() {
        Error::Serialization(e.to_string())
    } else {
        Error::Transport(e.to_string())
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for one engine endpoint
#[derive(Debug, Clone)]
pub struct QdrantRest {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantRest {
    /// Build a client from config. No request is made.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::invalid_request("api key is not a valid header value"))?;
            headers.insert("api-key", value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(QdrantRest {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.status)
                .and_then(|s| s.error)
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(transport_error)?;
        Ok(envelope.result)
    }
}

impl IndexService for QdrantRest {
    async fn create_collection(&self, name: &str, body: &CreateCollection) -> Result<()> {
        let request = self
            .client
            .put(self.url(&format!("/collections/{}", name)))
            .json(body);
        self.send::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/collections/{}", name)));
        let deleted: bool = self.send(request).await?;
        if deleted {
            Ok(())
        } else {
            Err(Error::NotFound {
                name: name.to_string(),
            })
        }
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionDescription> {
        let request = self.client.get(self.url(&format!("/collections/{}", name)));
        let info: CollectionInfo = self.send(request).await?;
        Ok(CollectionDescription {
            name: name.to_string(),
            kind: info.config.params.kind(),
            dimension: info.config.params.dimension(),
            points_count: info.points_count,
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let request = self.client.get(self.url("/collections"));
        let list: CollectionList = self.send(request).await?;
        Ok(list.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create_payload_index(&self, name: &str, field: &str) -> Result<()> {
        let request = self
            .client
            .put(self.url(&format!("/collections/{}/index?wait=true", name)))
            .json(&json!({"field_name": field, "field_schema": "keyword"}));
        self.send::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn upsert_points(&self, name: &str, points: &[PointStruct]) -> Result<()> {
        let request = self
            .client
            .put(self.url(&format!("/collections/{}/points?wait=true", name)))
            .json(&json!({ "points": points }));
        self.send::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn delete_points(&self, name: &str, ids: &[String]) -> Result<()> {
        let request = self
            .client
            .post(self.url(&format!("/collections/{}/points/delete?wait=true", name)))
            .json(&json!({ "points": ids }));
        self.send::<IgnoredAny>(request).await.map(|_| ())
    }

    async fn query_points(&self, name: &str, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
        let request = self
            .client
            .post(self.url(&format!("/collections/{}/points/query", name)))
            .json(request);
        let response: QueryResponse = self.send(request).await?;
        Ok(response.points)
    }

    async fn scroll_points(&self, name: &str, request: &ScrollRequest) -> Result<Vec<Record>> {
        let request = self
            .client
            .post(self.url(&format!("/collections/{}/points/scroll", name)))
            .json(request);
        let response: ScrollResponse = self.send(request).await?;
        Ok(response.points)
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Connects to the engine named in a [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct QdrantConnector {
    config: ClientConfig,
}

impl QdrantConnector {
    /// Create a connector; nothing happens until [`Connector::connect`]
    pub fn new(config: ClientConfig) -> Self {
        QdrantConnector { config }
    }

    /// The config in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Connector for QdrantConnector {
    type Service = QdrantRest;

    /// Build the HTTP client and check the endpoint with a collection list
    async fn connect(&self) -> Result<QdrantRest> {
        let rest = QdrantRest::new(&self.config)?;
        let collections = rest.list_collections().await?;
        tracing::debug!(
            target: "context::client",
            url = %rest.base_url(),
            collections = collections.len(),
            "Endpoint reachable"
        );
        Ok(rest)
    }
}
