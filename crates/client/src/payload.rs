//! Wire types for the remote index service
//!
//! These mirror the engine's REST grammar: collection creation, point
//! upsert, the query API (prefetch + fusion) and scroll.

use context_core::{
    CollectionKind, CollectionOptions, Filter, HnswConfig, Metadata, QuantizationConfig,
    SparseIndexConfig, SparseVector, DENSE_VECTOR_NAME, SPARSE_VECTOR_NAME,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Collection configuration
// ============================================================================

/// Distance function for dense vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Cosine similarity
    Cosine,
}

/// Dense vector space parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorParams {
    /// Dimension
    pub size: usize,
    /// Distance function
    pub distance: Distance,
    /// HNSW index parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hnsw_config: Option<HnswConfig>,
    /// Quantization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_config: Option<QuantizationConfig>,
}

/// Dense vector space layout: one unnamed space, or named spaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorsConfig {
    /// Single unnamed space
    Single(VectorParams),
    /// Named spaces
    Named(BTreeMap<String, VectorParams>),
}

/// Relevance modifier applied by the engine to sparse scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// Inverse document frequency
    Idf,
}

/// Lexical vector space parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVectorParams {
    /// Relevance modifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    /// Index settings
    #[serde(default)]
    pub index: SparseIndexConfig,
}

/// Body of a create-collection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCollection {
    /// Dense spaces
    pub vectors: VectorsConfig,
    /// Lexical spaces (hybrid collections only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_vectors: Option<BTreeMap<String, SparseVectorParams>>,
    /// Shard count
    pub shard_number: u32,
    /// Replication factor
    pub replication_factor: u32,
}

impl CreateCollection {
    /// Dense-only collection: one unnamed cosine space
    pub fn dense(dimension: usize, options: &CollectionOptions) -> Self {
        CreateCollection {
            vectors: VectorsConfig::Single(dense_params(dimension, options)),
            sparse_vectors: None,
            shard_number: 1,
            replication_factor: 1,
        }
    }

    /// Hybrid collection: named dense space plus a named IDF-weighted
    /// sparse space
    pub fn hybrid(dimension: usize, options: &CollectionOptions) -> Self {
        let mut vectors = BTreeMap::new();
        vectors.insert(
            DENSE_VECTOR_NAME.to_string(),
            dense_params(dimension, options),
        );

        let mut sparse = BTreeMap::new();
        sparse.insert(
            SPARSE_VECTOR_NAME.to_string(),
            SparseVectorParams {
                modifier: Some(Modifier::Idf),
                index: options.sparse,
            },
        );

        CreateCollection {
            vectors: VectorsConfig::Named(vectors),
            sparse_vectors: Some(sparse),
            shard_number: 1,
            replication_factor: 1,
        }
    }

    /// Whether this body describes a hybrid collection
    pub fn kind(&self) -> CollectionKind {
        if self.sparse_vectors.as_ref().is_some_and(|s| !s.is_empty()) {
            CollectionKind::Hybrid
        } else {
            CollectionKind::DenseOnly
        }
    }
}

fn dense_params(dimension: usize, options: &CollectionOptions) -> VectorParams {
    VectorParams {
        size: dimension,
        distance: Distance::Cosine,
        hnsw_config: Some(options.hnsw),
        quantization_config: options.quantization,
    }
}

/// What the engine reports about a collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDescription {
    /// Collection name
    pub name: String,
    /// Dense-only or hybrid
    pub kind: CollectionKind,
    /// Dense dimension, when reported
    pub dimension: Option<usize>,
    /// Stored point count, when reported
    pub points_count: Option<u64>,
}

// ============================================================================
// Points
// ============================================================================

/// Vector data of an upserted point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointVectors {
    /// Dense-only collection
    Dense(Vec<f32>),
    /// Hybrid collection: `{dense: [...], sparse: {indices, values}}`
    Hybrid {
        /// Dense vector
        dense: Vec<f32>,
        /// Sparse vector
        sparse: SparseVector,
    },
}

/// A point to upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStruct {
    /// Point id (UUID string)
    pub id: String,
    /// Vector data
    pub vector: PointVectors,
    /// Payload
    pub payload: Metadata,
}

/// A point returned from a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point id
    #[serde(deserialize_with = "deserialize_point_id")]
    pub id: String,
    /// Score
    pub score: f32,
    /// Payload (absent when not requested)
    #[serde(default)]
    pub payload: Option<Metadata>,
}

/// A point returned from a scroll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Point id
    #[serde(deserialize_with = "deserialize_point_id")]
    pub id: String,
    /// Payload (absent when not requested)
    #[serde(default)]
    pub payload: Option<Metadata>,
}

/// Point ids come back as UUID strings or unsigned integers.
fn deserialize_point_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

// ============================================================================
// Query API
// ============================================================================

/// Fusion method applied by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fusion {
    /// Reciprocal rank fusion
    Rrf,
}

/// The `query` of a query request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryVector {
    /// Dense nearest-neighbour query
    Dense(Vec<f32>),
    /// Sparse query
    Sparse(SparseVector),
    /// Fuse the prefetch results
    Fusion {
        /// Fusion method
        fusion: Fusion,
    },
}

/// One candidate pool of a fused query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefetch {
    /// Query vector for this pool
    pub query: QueryVector,
    /// Named vector space to search
    pub using: String,
    /// Pool size
    pub limit: usize,
}

/// Body of a query call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Candidate pools (fused queries only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefetch: Vec<Prefetch>,
    /// Final query
    pub query: QueryVector,
    /// Named vector space for a direct query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    /// Filter predicate, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Result count
    pub limit: usize,
    /// Minimum score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    /// Return payloads
    pub with_payload: bool,
    /// Return vectors
    pub with_vector: bool,
}

impl QueryRequest {
    /// Direct query against one vector space
    pub fn direct(query: QueryVector, using: Option<String>, limit: usize) -> Self {
        QueryRequest {
            prefetch: Vec::new(),
            query,
            using,
            filter: None,
            limit,
            score_threshold: None,
            with_payload: true,
            with_vector: false,
        }
    }

    /// Fused query over several candidate pools
    pub fn fused(prefetch: Vec<Prefetch>, fusion: Fusion, limit: usize) -> Self {
        QueryRequest {
            prefetch,
            query: QueryVector::Fusion { fusion },
            using: None,
            filter: None,
            limit,
            score_threshold: None,
            with_payload: true,
            with_vector: false,
        }
    }

    /// Builder: attach a filter; empty filters are dropped
    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }
}

/// Body of a scroll call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    /// Filter predicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Page size
    pub limit: usize,
    /// Return payloads
    pub with_payload: bool,
    /// Return vectors
    pub with_vector: bool,
}
