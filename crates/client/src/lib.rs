//! Remote-facing layer for context-index
//!
//! This crate talks to the remote index engine:
//! - IndexService: the narrow RPC contract (create, drop, describe, list,
//!   upsert, delete, query, scroll)
//! - QdrantRest / QdrantConnector: the HTTP implementation
//! - MemoryIndex: an in-process implementation for tests and local use
//! - SharedClient: lazy single-flight connection shared by all components
//! - RetryExecutor: bounded retry with exponential backoff
//! - CollectionManager: collection lifecycle and point writes
//! - HybridSearchEngine: dense and RRF-fused hybrid search
//! - ContextIndex: facade wiring all of the above
//!
//! Progress is reported as [`ClientEvent`]s to an [`EventSink`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod events;
pub mod fusion;
pub mod index;
pub mod memory;
pub mod payload;
pub mod rest;
pub mod retry;
pub mod search;
pub mod service;
pub mod shared;

pub use collection::{CollectionManager, DEFAULT_QUERY_LIMIT, INDEXED_PAYLOAD_FIELDS};
pub use config::{ClientConfig, CONFIG_FILE_NAME};
pub use events::{ClientEvent, EventSink, MemorySink, NoopSink, TracingSink};
pub use fusion::{RankedList, RrfFuser, DEFAULT_RRF_K};
pub use index::{ContextIndex, ContextIndexBuilder};
pub use memory::MemoryIndex;
pub use payload::{
    CollectionDescription, CreateCollection, Fusion, PointStruct, PointVectors, Prefetch,
    QueryRequest, QueryVector, Record, ScoredPoint, ScrollRequest,
};
pub use rest::{QdrantConnector, QdrantRest};
pub use retry::{RetryExecutor, RetryPolicy};
pub use search::{
    prefetch_limit, FieldKind, FusionMode, HybridSearchEngine, HybridSearchOptions,
    HybridSearchRequest, QueryData, SearchOptions, DEFAULT_SEARCH_LIMIT,
};
pub use service::{Connector, IndexService, Preconnected};
pub use shared::SharedClient;
