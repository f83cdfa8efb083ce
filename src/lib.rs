//! context-index - hybrid dense + lexical retrieval over a remote vector index
//!
//! Stores code chunks in a remote approximate-nearest-neighbour engine and
//! searches them by embedding similarity, by term matching, or both fused
//! with reciprocal rank fusion.
//!
//! # Quick Start
//!
//! ```ignore
//! use context_index::{
//!     ClientConfig, CollectionOptions, ContextIndex, Document, HybridSearchOptions,
//!     HybridSearchRequest,
//! };
//!
//! let config = ClientConfig::from_file(Path::new("context.toml"))?;
//! let index = ContextIndex::from_config(config, Some(&home))?;
//!
//! index.collections().create_hybrid("hybrid_code_1a2b", 768, &CollectionOptions::default()).await?;
//! index.collections().insert_hybrid("hybrid_code_1a2b", &documents).await?;
//!
//! let results = index
//!     .search()
//!     .hybrid_search(
//!         "hybrid_code_1a2b",
//!         &[
//!             HybridSearchRequest::dense(embedding, 10),
//!             HybridSearchRequest::text("parse config", 10),
//!         ],
//!         &HybridSearchOptions::default(),
//!     )
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! - `context-core`: documents, sparse vectors, collection options, errors,
//!   stable ids and filters
//! - `context-lexical`: tokenizer, persistent vocabularies, sparse encoding
//! - `context-client`: retrying remote calls, collection management, search

pub use context_client::*;
pub use context_core::{
    chunk_key, BinaryQuantization, CollectionKind, CollectionOptions, Document, Error, Filter,
    FilterBuilder, HnswConfig, IdentifierMapper, Metadata, QuantizationConfig, Result,
    ScalarQuantization, ScalarType, SearchResult, SparseDatatype, SparseIndexConfig, SparseVector,
    DENSE_VECTOR_NAME, SPARSE_VECTOR_NAME,
};
pub use context_lexical::{
    collection_hash, SparseEncoder, Tokenizer, VocabularyError, VocabularyPaths,
    VocabularyRegistry, VocabularySnapshot, VocabularyStore, WordTokenizer,
};
