//! Dense and hybrid search
//!
//! [`HybridSearchEngine::search`] runs one similarity query against the
//! dense space. [`HybridSearchEngine::hybrid_search`] builds one candidate
//! pool per request (dense vectors pass through, text is encoded with the
//! collection's sparse encoder), over-fetches each pool and submits them as
//! a single RRF-fused query. With [`FusionMode::Local`] the pools are
//! queried one by one and fused with [`RrfFuser`] instead.

use crate::fusion::{RankedList, RrfFuser};
use crate::payload::{Fusion, Prefetch, QueryRequest, QueryVector, ScoredPoint};
use crate::retry::RetryExecutor;
use crate::service::{Connector, IndexService};
use crate::shared::SharedClient;
use context_core::{
    CollectionKind, Document, Error, Filter, Result, SearchResult, DENSE_VECTOR_NAME,
    SPARSE_VECTOR_NAME,
};
use context_lexical::VocabularyRegistry;
use std::sync::Arc;

/// Default number of results
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Minimum candidate pool size per field
pub const MIN_PREFETCH: usize = 100;

/// Candidate pool multiplier over the requested limit
pub const PREFETCH_MULTIPLIER: usize = 3;

/// Candidate pool size for a request asking for `limit` results
pub fn prefetch_limit(limit: usize) -> usize {
    limit.saturating_mul(PREFETCH_MULTIPLIER).max(MIN_PREFETCH)
}

// ============================================================================
// Requests
// ============================================================================

/// Which vector space a request field targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Dense embedding space
    Dense,
    /// Lexical (sparse) space
    Lexical,
}

impl FieldKind {
    /// Classify a request field name.
    ///
    /// `sparse` and `sparse_vector` are lexical; every other name is dense.
    pub fn classify(field: &str) -> Self {
        match field {
            "sparse" | "sparse_vector" => FieldKind::Lexical,
            _ => FieldKind::Dense,
        }
    }

    /// Named space inside a hybrid collection
    pub fn vector_name(&self) -> &'static str {
        match self {
            FieldKind::Dense => DENSE_VECTOR_NAME,
            FieldKind::Lexical => SPARSE_VECTOR_NAME,
        }
    }
}

/// Payload of one hybrid request
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    /// Dense query vector
    Dense(Vec<f32>),
    /// Query text for the lexical space
    Text(String),
}

/// One field of a hybrid search
#[derive(Debug, Clone, PartialEq)]
pub struct HybridSearchRequest {
    /// Target field name
    pub field: String,
    /// Query data
    pub data: QueryData,
    /// Results wanted from this field before over-fetching
    pub limit: usize,
}

impl HybridSearchRequest {
    /// Request against an explicitly named field
    pub fn new(field: impl Into<String>, data: QueryData, limit: usize) -> Self {
        HybridSearchRequest {
            field: field.into(),
            data,
            limit,
        }
    }

    /// Dense request
    pub fn dense(vector: Vec<f32>, limit: usize) -> Self {
        Self::new(DENSE_VECTOR_NAME, QueryData::Dense(vector), limit)
    }

    /// Lexical request
    pub fn text(text: impl Into<String>, limit: usize) -> Self {
        Self::new(SPARSE_VECTOR_NAME, QueryData::Text(text.into()), limit)
    }
}

/// Options for a dense search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Result count (default: 10)
    pub limit: usize,
    /// Filter passed through to the engine
    pub filter: Option<Filter>,
    /// Minimum similarity
    pub score_threshold: Option<f32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: DEFAULT_SEARCH_LIMIT,
            filter: None,
            score_threshold: None,
        }
    }
}

impl SearchOptions {
    /// Builder: set the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder: set the filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Builder: set the score threshold
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}

/// Options for a hybrid search
#[derive(Debug, Clone, PartialEq)]
pub struct HybridSearchOptions {
    /// Final result count (default: 10)
    pub limit: usize,
    /// Filter passed through to the engine
    pub filter: Option<Filter>,
}

impl Default for HybridSearchOptions {
    fn default() -> Self {
        HybridSearchOptions {
            limit: DEFAULT_SEARCH_LIMIT,
            filter: None,
        }
    }
}

impl HybridSearchOptions {
    /// Builder: set the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder: set the filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Where candidate pools are fused
#[derive(Debug, Clone, Copy, Default)]
pub enum FusionMode {
    /// The engine fuses (one fused query)
    #[default]
    Remote,
    /// Pools are queried separately and fused locally
    Local(RrfFuser),
}

// ============================================================================
// Engine
// ============================================================================

/// Search orchestrator
pub struct HybridSearchEngine<C: Connector> {
    client: Arc<SharedClient<C>>,
    retry: RetryExecutor,
    registry: Arc<VocabularyRegistry>,
    fusion: FusionMode,
}

impl<C: Connector> HybridSearchEngine<C> {
    /// Create an engine sharing `client` and `registry` with the collection
    /// manager
    pub fn new(
        client: Arc<SharedClient<C>>,
        retry: RetryExecutor,
        registry: Arc<VocabularyRegistry>,
        fusion: FusionMode,
    ) -> Self {
        HybridSearchEngine {
            client,
            retry,
            registry,
            fusion,
        }
    }

    /// Fusion mode in use
    pub fn fusion(&self) -> FusionMode {
        self.fusion
    }

    /// Dense similarity search.
    ///
    /// Hybrid collections are queried through their named dense space.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        if vector.is_empty() {
            return Err(Error::InvalidVector {
                reason: "query vector is empty".to_string(),
            });
        }

        let service = self.client.service().await?;
        let info = self
            .retry
            .execute("describe_collection", || service.collection_info(collection))
            .await?;
        let using = match info.kind {
            CollectionKind::Hybrid => Some(DENSE_VECTOR_NAME.to_string()),
            CollectionKind::DenseOnly => None,
        };

        let mut request = QueryRequest::direct(QueryVector::Dense(vector.to_vec()), using, options.limit)
            .with_filter(options.filter.clone());
        request.score_threshold = options.score_threshold;

        let request = &request;
        let points = self
            .retry
            .execute("search", || service.query_points(collection, request))
            .await?;

        tracing::debug!(
            target: "context::search",
            collection = collection,
            results = points.len(),
            "Dense search complete"
        );
        Ok(to_results(points))
    }

    /// Multi-field search fused with reciprocal rank fusion.
    ///
    /// An empty request list returns no results without contacting the
    /// engine.
    pub async fn hybrid_search(
        &self,
        collection: &str,
        requests: &[HybridSearchRequest],
        options: &HybridSearchOptions,
    ) -> Result<Vec<SearchResult>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let prefetch = self.build_prefetch(collection, requests)?;
        let service = self.client.service().await?;

        let points = match self.fusion {
            FusionMode::Remote => {
                let request = QueryRequest::fused(prefetch, Fusion::Rrf, options.limit)
                    .with_filter(options.filter.clone());
                let request = &request;
                self.retry
                    .execute("hybrid_search", || service.query_points(collection, request))
                    .await?
            }
            FusionMode::Local(fuser) => {
                let mut lists = Vec::with_capacity(prefetch.len());
                for pool in prefetch {
                    let kind = FieldKind::classify(&pool.using);
                    let request = QueryRequest::direct(pool.query, Some(pool.using), pool.limit)
                        .with_filter(options.filter.clone());
                    let request = &request;
                    let points = self
                        .retry
                        .execute("hybrid_search", || service.query_points(collection, request))
                        .await?;
                    lists.push(RankedList::new(kind, points));
                }
                fuser.fuse(lists, options.limit)
            }
        };

        tracing::debug!(
            target: "context::search",
            collection = collection,
            fields = requests.len(),
            results = points.len(),
            "Hybrid search complete"
        );
        Ok(to_results(points))
    }

    fn build_prefetch(
        &self,
        collection: &str,
        requests: &[HybridSearchRequest],
    ) -> Result<Vec<Prefetch>> {
        requests
            .iter()
            .map(|request| {
                let kind = FieldKind::classify(&request.field);
                let query = match (kind, &request.data) {
                    (FieldKind::Dense, QueryData::Dense(vector)) => {
                        if vector.is_empty() {
                            return Err(Error::InvalidVector {
                                reason: format!("empty query vector for field '{}'", request.field),
                            });
                        }
                        QueryVector::Dense(vector.clone())
                    }
                    (FieldKind::Lexical, QueryData::Text(text)) => {
                        let encoder = self.registry.encoder(collection);
                        let sparse = encoder.lock().encode(text);
                        QueryVector::Sparse(sparse)
                    }
                    (FieldKind::Dense, QueryData::Text(_)) => {
                        return Err(Error::invalid_request(format!(
                            "field '{}' is dense and needs a vector",
                            request.field
                        )))
                    }
                    (FieldKind::Lexical, QueryData::Dense(_)) => {
                        return Err(Error::invalid_request(format!(
                            "field '{}' is lexical and needs text",
                            request.field
                        )))
                    }
                };
                Ok(Prefetch {
                    query,
                    using: kind.vector_name().to_string(),
                    limit: prefetch_limit(request.limit),
                })
            })
            .collect()
    }
}

fn to_results(points: Vec<ScoredPoint>) -> Vec<SearchResult> {
    points
        .into_iter()
        .map(|point| SearchResult {
            document: Document::from_payload(point.id, point.payload.unwrap_or_default()),
            score: point.score,
        })
        .collect()
}
