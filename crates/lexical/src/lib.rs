//! Lexical layer for context-index
//!
//! Turns text into term-frequency sparse vectors whose dimensions stay
//! stable across insert and query calls and across process restarts.
//!
//! This crate provides:
//! - Tokenizer trait (the external segmentation contract) and WordTokenizer
//! - VocabularyStore: term → index table with JSON snapshot persistence
//! - SparseEncoder: text → SparseVector using a tokenizer and a vocabulary
//! - VocabularyRegistry: per-collection encoders, created on first use and
//!   evicted on collection drop
//! - VocabularyPaths: where each collection's snapshot lives
//!
//! # Concurrency
//!
//! Each collection's encoder sits behind its own mutex, but an `encode`
//! followed by a `save` is two separate steps. Callers inserting into the
//! same collection from several tasks must serialize those sequences
//! themselves, or index assignments made between the two can be lost.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoder;
pub mod error;
pub mod paths;
pub mod registry;
pub mod tokenizer;
pub mod vocabulary;

pub use encoder::SparseEncoder;
pub use error::{VocabularyError, VocabularyResult};
pub use paths::{collection_hash, VocabularyPaths};
pub use registry::{SharedEncoder, VocabularyRegistry};
pub use tokenizer::{Tokenizer, WordTokenizer};
pub use vocabulary::{VocabularySnapshot, VocabularyStore};
