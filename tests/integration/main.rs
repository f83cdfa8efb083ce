//! Integration Tests
//!
//! End-to-end tests of `ContextIndex` over the in-memory engine:
//! - Collections: lifecycle, configuration payloads, existence checks
//! - Hybrid search: prefetch construction, fusion, result mapping
//! - Vocabulary: index stability within a session and across restarts
//! - Retry: backoff timing and terminal short-circuiting
//! - Identifiers and filters

#[path = "../common/mod.rs"]
mod common;

mod collections;
mod hybrid_search;
mod identifiers;
mod retry;
mod vocabulary;
