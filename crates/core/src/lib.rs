//! Core types for context-index
//!
//! This crate defines the foundational types shared by the lexical and
//! client layers:
//! - Document: a unit of indexed content plus its payload fields
//! - SparseVector: term-frequency vectors keyed by vocabulary index
//! - SearchResult: a scored document returned from a query
//! - Collection configuration: HNSW, quantization and sparse index options
//! - Error: the error taxonomy (validation, terminal, transient, system)
//! - IdentifierMapper: deterministic point IDs for idempotent upserts
//! - FilterBuilder: filter predicates passed through to the remote engine

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod id;
pub mod sparse;

pub use config::{
    BinaryQuantization, CollectionKind, CollectionOptions, HnswConfig, QuantizationConfig,
    ScalarQuantization, ScalarType, SparseDatatype, SparseIndexConfig,
};
pub use document::{Document, Metadata, SearchResult, PAYLOAD_FIELDS};
pub use error::{Error, Result};
pub use filter::{Filter, FilterBuilder};
pub use id::{chunk_key, IdentifierMapper};
pub use sparse::SparseVector;

/// Name of the dense vector space inside a hybrid collection.
pub const DENSE_VECTOR_NAME: &str = "dense";

/// Name of the lexical (sparse) vector space inside a hybrid collection.
pub const SPARSE_VECTOR_NAME: &str = "sparse";
