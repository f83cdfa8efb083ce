//! In-memory index service
//!
//! A complete [`IndexService`] held in process memory: brute-force cosine
//! search over dense vectors, IDF-weighted dot products over sparse vectors
//! and local RRF for fused queries. Errors use the same status codes and
//! messages the remote engine sends, so retry classification behaves the
//! same against both.
//!
//! Every call is recorded, and failures can be queued per operation, which
//! makes this the backend of choice for orchestration tests.

use crate::fusion::{RankedList, RrfFuser};
use crate::payload::{
    CollectionDescription, CreateCollection, PointStruct, PointVectors, QueryRequest, QueryVector,
    Record, ScoredPoint, ScrollRequest, VectorsConfig,
};
use crate::search::FieldKind;
use crate::service::IndexService;
use context_core::{
    Error, Filter, Metadata, Result, SparseVector, DENSE_VECTOR_NAME, SPARSE_VECTOR_NAME,
};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone)]
struct StoredPoint {
    dense: Vec<f32>,
    sparse: Option<SparseVector>,
    payload: Metadata,
}

#[derive(Debug)]
struct StoredCollection {
    body: CreateCollection,
    points: BTreeMap<String, StoredPoint>,
    payload_indexes: Vec<String>,
}

impl StoredCollection {
    fn dimension(&self) -> Option<usize> {
        match &self.body.vectors {
            VectorsConfig::Single(params) => Some(params.size),
            VectorsConfig::Named(spaces) => spaces.get(DENSE_VECTOR_NAME).map(|p| p.size),
        }
    }

    fn has_sparse_space(&self, name: &str) -> bool {
        self.body
            .sparse_vectors
            .as_ref()
            .is_some_and(|spaces| spaces.contains_key(name))
    }
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, StoredCollection>,
    calls: Vec<String>,
    failures: HashMap<String, VecDeque<Error>>,
    last_query: Option<QueryRequest>,
}

impl State {
    /// Record a call and pop any queued failure for it
    fn enter(&mut self, operation: &str) -> Result<()> {
        self.calls.push(operation.to_string());
        match self.failures.get_mut(operation).and_then(|q| q.pop_front()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn collection(&self, name: &str) -> Result<&StoredCollection> {
        self.collections.get(name).ok_or_else(|| missing(name))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut StoredCollection> {
        self.collections.get_mut(name).ok_or_else(|| missing(name))
    }
}

fn missing(name: &str) -> Error {
    Error::Remote {
        status: 404,
        message: format!("Not found: Collection `{}` doesn't exist!", name),
    }
}

fn wrong_input(message: impl std::fmt::Display) -> Error {
    Error::Remote {
        status: 400,
        message: format!("Wrong input: {}", message),
    }
}

/// Process-local index service
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    state: Arc<Mutex<State>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        MemoryIndex::default()
    }

    /// Operation names of every call received, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of calls received for `operation`
    pub fn calls_to(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    /// The most recent query request
    pub fn last_query(&self) -> Option<QueryRequest> {
        self.state.lock().last_query.clone()
    }

    /// Make the next call to `operation` fail with `error`.
    ///
    /// Queued failures for the same operation are consumed in order.
    pub fn fail_next(&self, operation: &str, error: Error) {
        self.state
            .lock()
            .failures
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
    }

    /// Payload index fields created on `name`
    pub fn payload_indexes(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .collections
            .get(name)
            .map(|c| c.payload_indexes.clone())
            .unwrap_or_default()
    }

    /// Creation body of `name`
    pub fn collection_body(&self, name: &str) -> Option<CreateCollection> {
        self.state
            .lock()
            .collections
            .get(name)
            .map(|c| c.body.clone())
    }

    /// Sparse vector stored for a point
    pub fn sparse_vector(&self, name: &str, id: &str) -> Option<SparseVector> {
        self.state
            .lock()
            .collections
            .get(name)
            .and_then(|c| c.points.get(id))
            .and_then(|p| p.sparse.clone())
    }
}

// ============================================================================
// Scoring
// ============================================================================

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// BM25-style IDF: ln((N - n + 0.5) / (n + 0.5) + 1)
fn idf(total: usize, containing: usize) -> f32 {
    let n = containing as f32;
    ((total as f32 - n + 0.5) / (n + 0.5) + 1.0).ln()
}

/// Check a payload against the `must` clauses of a filter.
///
/// Supports `match.value` equality and `match.any` membership.
fn matches_filter(payload: &Metadata, filter: Option<&Filter>) -> Result<bool> {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return Ok(true);
    };
    let Some(object) = filter.as_json().as_object() else {
        return Err(wrong_input("filter must be an object"));
    };

    for (clause, conditions) in object {
        if clause != "must" {
            return Err(wrong_input(format!("unsupported filter clause `{}`", clause)));
        }
        let conditions = conditions.as_array().map(Vec::as_slice).unwrap_or_default();
        for condition in conditions {
            let key = condition.get("key").and_then(JsonValue::as_str).unwrap_or_default();
            let actual = payload.get(key);
            let expected = condition.get("match");

            let ok = match (expected.and_then(|m| m.get("value")), expected.and_then(|m| m.get("any"))) {
                (Some(value), _) => actual == Some(value),
                (None, Some(JsonValue::Array(any))) => actual.is_some_and(|a| any.contains(a)),
                _ => return Err(wrong_input(format!("unsupported condition on `{}`", key))),
            };
            if !ok {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn search_space(
    collection: &StoredCollection,
    query: &QueryVector,
    using: Option<&str>,
    filter: Option<&Filter>,
    limit: usize,
) -> Result<Vec<ScoredPoint>> {
    let mut scored = Vec::new();

    match query {
        QueryVector::Dense(vector) => {
            let named = matches!(collection.body.vectors, VectorsConfig::Named(_));
            match (named, using) {
                (false, None) => {}
                (true, Some(DENSE_VECTOR_NAME)) => {}
                (_, using) => {
                    return Err(wrong_input(format!(
                        "Not existing vector name error: {}",
                        using.unwrap_or_default()
                    )))
                }
            }
            if collection.dimension() != Some(vector.len()) {
                return Err(wrong_input(format!(
                    "Vector dimension error: expected dim: {}, got {}",
                    collection.dimension().unwrap_or_default(),
                    vector.len()
                )));
            }
            for (id, point) in &collection.points {
                if matches_filter(&point.payload, filter)? {
                    scored.push(ScoredPoint {
                        id: id.clone(),
                        score: cosine(vector, &point.dense),
                        payload: Some(point.payload.clone()),
                    });
                }
            }
        }
        QueryVector::Sparse(query) => {
            let space = using.unwrap_or_default();
            if !collection.has_sparse_space(space) {
                return Err(wrong_input(format!("Not existing vector name error: {}", space)));
            }

            let total = collection.points.len();
            let mut document_frequency: HashMap<u32, usize> = HashMap::new();
            for point in collection.points.values() {
                for (index, _) in point.sparse.iter().flat_map(|s| s.iter()) {
                    *document_frequency.entry(index).or_default() += 1;
                }
            }

            for (id, point) in &collection.points {
                let Some(sparse) = &point.sparse else { continue };
                let weights: HashMap<u32, f32> = sparse.iter().collect();
                let mut score = 0.0;
                let mut overlap = false;
                for (index, value) in query.iter() {
                    if let Some(weight) = weights.get(&index) {
                        let n = document_frequency.get(&index).copied().unwrap_or_default();
                        score += value * weight * idf(total, n);
                        overlap = true;
                    }
                }
                if overlap && matches_filter(&point.payload, filter)? {
                    scored.push(ScoredPoint {
                        id: id.clone(),
                        score,
                        payload: Some(point.payload.clone()),
                    });
                }
            }
        }
        QueryVector::Fusion { .. } => {
            return Err(wrong_input("fusion query requires prefetch"));
        }
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    Ok(scored)
}

fn run_query(collection: &StoredCollection, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
    let filter = request.filter.as_ref();

    let mut points = if request.prefetch.is_empty() {
        search_space(
            collection,
            &request.query,
            request.using.as_deref(),
            filter,
            request.limit,
        )?
    } else {
        if !matches!(request.query, QueryVector::Fusion { .. }) {
            return Err(wrong_input("prefetch requires a fusion query"));
        }
        let mut lists = Vec::with_capacity(request.prefetch.len());
        for prefetch in &request.prefetch {
            let points = search_space(
                collection,
                &prefetch.query,
                Some(&prefetch.using),
                filter,
                prefetch.limit,
            )?;
            lists.push(RankedList::new(FieldKind::classify(&prefetch.using), points));
        }
        RrfFuser::default().fuse(lists, request.limit)
    };

    if let Some(threshold) = request.score_threshold {
        points.retain(|p| p.score >= threshold);
    }
    if !request.with_payload {
        for point in &mut points {
            point.payload = None;
        }
    }
    Ok(points)
}

// ============================================================================
// IndexService
// ============================================================================

impl IndexService for MemoryIndex {
    async fn create_collection(&self, name: &str, body: &CreateCollection) -> Result<()> {
        let mut state = self.state.lock();
        state.enter("create_collection")?;
        if state.collections.contains_key(name) {
            return Err(Error::Remote {
                status: 409,
                message: format!("Wrong input: Collection `{}` already exists!", name),
            });
        }
        state.collections.insert(
            name.to_string(),
            StoredCollection {
                body: body.clone(),
                points: BTreeMap::new(),
                payload_indexes: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.enter("delete_collection")?;
        state
            .collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing(name))
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionDescription> {
        let mut state = self.state.lock();
        state.enter("collection_info")?;
        let collection = state.collection(name)?;
        Ok(CollectionDescription {
            name: name.to_string(),
            kind: collection.body.kind(),
            dimension: collection.dimension(),
            points_count: Some(collection.points.len() as u64),
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut state = self.state.lock();
        state.enter("list_collections")?;
        Ok(state.collections.keys().cloned().collect())
    }

    async fn create_payload_index(&self, name: &str, field: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.enter("create_payload_index")?;
        let collection = state.collection_mut(name)?;
        if !collection.payload_indexes.iter().any(|f| f == field) {
            collection.payload_indexes.push(field.to_string());
        }
        Ok(())
    }

    async fn upsert_points(&self, name: &str, points: &[PointStruct]) -> Result<()> {
        let mut state = self.state.lock();
        state.enter("upsert_points")?;
        let collection = state.collection_mut(name)?;
        let dimension = collection.dimension();
        let hybrid = collection.has_sparse_space(SPARSE_VECTOR_NAME);

        let mut staged = Vec::with_capacity(points.len());
        for point in points {
            let (dense, sparse) = match (&point.vector, hybrid) {
                (PointVectors::Dense(dense), false) => (dense.clone(), None),
                (PointVectors::Hybrid { dense, sparse }, true) => {
                    (dense.clone(), Some(sparse.clone()))
                }
                (PointVectors::Dense(_), true) => {
                    return Err(wrong_input("Vector params for  are not specified in config"))
                }
                (PointVectors::Hybrid { .. }, false) => {
                    return Err(wrong_input(format!(
                        "Not existing vector name error: {}",
                        SPARSE_VECTOR_NAME
                    )))
                }
            };
            if dimension != Some(dense.len()) {
                return Err(wrong_input(format!(
                    "Vector dimension error: expected dim: {}, got {}",
                    dimension.unwrap_or_default(),
                    dense.len()
                )));
            }
            staged.push((
                point.id.clone(),
                StoredPoint {
                    dense,
                    sparse,
                    payload: point.payload.clone(),
                },
            ));
        }

        collection.points.extend(staged);
        Ok(())
    }

    async fn delete_points(&self, name: &str, ids: &[String]) -> Result<()> {
        let mut state = self.state.lock();
        state.enter("delete_points")?;
        let collection = state.collection_mut(name)?;
        for id in ids {
            collection.points.remove(id);
        }
        Ok(())
    }

    async fn query_points(&self, name: &str, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
        let mut state = self.state.lock();
        state.enter("query_points")?;
        state.last_query = Some(request.clone());
        run_query(state.collection(name)?, request)
    }

    async fn scroll_points(&self, name: &str, request: &ScrollRequest) -> Result<Vec<Record>> {
        let mut state = self.state.lock();
        state.enter("scroll_points")?;
        let collection = state.collection(name)?;

        let mut records = Vec::new();
        for (id, point) in &collection.points {
            if records.len() >= request.limit {
                break;
            }
            if matches_filter(&point.payload, request.filter.as_ref())? {
                records.push(Record {
                    id: id.clone(),
                    payload: request.with_payload.then(|| point.payload.clone()),
                });
            }
        }
        Ok(records)
    }
}
