//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use context_index::{
    ClientEvent, CollectionOptions, ContextIndex, Document, Error, FilterBuilder, FusionMode,
    HybridSearchOptions, HybridSearchRequest, IdentifierMapper, MemoryIndex, MemorySink,
    Preconnected, RetryPolicy, RrfFuser, SearchOptions, VocabularyPaths, VocabularyStore,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; it is shown for
/// failing tests only.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Collection name with a unique content-address suffix
pub fn unique_collection(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{:08x}", prefix, n)
}

// ============================================================================
// TestIndex - ContextIndex over an in-memory engine
// ============================================================================

/// A `ContextIndex` over a `MemoryIndex`, with a recording sink and a
/// temporary vocabulary directory.
pub struct TestIndex {
    pub index: ContextIndex<Preconnected<MemoryIndex>>,
    pub engine: MemoryIndex,
    pub sink: Arc<MemorySink>,
    pub dir: TempDir,
}

impl TestIndex {
    /// Remote fusion, default retry policy
    pub fn new() -> Self {
        Self::with(FusionMode::Remote, RetryPolicy::default())
    }

    /// Custom fusion mode and retry policy
    pub fn with(fusion: FusionMode, retry: RetryPolicy) -> Self {
        init_tracing();
        let dir = TempDir::new().expect("tempdir");
        Self::in_dir(dir, fusion, retry)
    }

    /// Build over an existing vocabulary directory
    pub fn in_dir(dir: TempDir, fusion: FusionMode, retry: RetryPolicy) -> Self {
        let engine = MemoryIndex::new();
        let sink = Arc::new(MemorySink::new());
        let index = ContextIndex::builder(
            Preconnected(engine.clone()),
            VocabularyPaths::per_collection(dir.path()),
        )
        .with_retry(retry)
        .with_sink(sink.clone())
        .with_fusion(fusion)
        .build();
        TestIndex {
            index,
            engine,
            sink,
            dir,
        }
    }

    /// Reopen over the same vocabulary directory and engine, as after a
    /// process restart
    pub fn reopen(self) -> Self {
        let sink = Arc::new(MemorySink::new());
        let index = ContextIndex::builder(
            Preconnected(self.engine.clone()),
            VocabularyPaths::per_collection(self.dir.path()),
        )
        .with_sink(sink.clone())
        .build();
        TestIndex {
            index,
            engine: self.engine,
            sink,
            dir: self.dir,
        }
    }
}

/// Retry policy with short delays for tests on a real clock
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1))
}

// ============================================================================
// Documents
// ============================================================================

/// Code chunk with an id derived from its location and content
pub fn chunk(path: &str, start: i64, end: i64, content: &str, vector: Vec<f32>) -> Document {
    let ext = path
        .rfind('.')
        .map(|i| path[i..].to_string())
        .unwrap_or_default();
    let id = IdentifierMapper::to_stable_id(&context_index::chunk_key(path, start, end, content));
    Document::new(id, content, path, start, end, ext).with_vector(vector)
}

/// A small corpus over a 3-dimensional embedding space
pub fn corpus() -> Vec<Document> {
    vec![
        chunk(
            "src/config.rs",
            1,
            20,
            "fn parse_config(path: &Path) -> Config { load toml config file }",
            vec![1.0, 0.0, 0.0],
        ),
        chunk(
            "src/render.ts",
            5,
            40,
            "function renderWidget(tree) { draw widget tree to canvas }",
            vec![0.0, 1.0, 0.0],
        ),
        chunk(
            "src/retry.py",
            10,
            30,
            "def retry_with_backoff(op): sleep then retry the network call",
            vec![0.0, 0.0, 1.0],
        ),
        chunk(
            "src/loader.rs",
            1,
            15,
            "fn load_widget_config() -> WidgetConfig { read config for widget }",
            vec![0.7, 0.7, 0.0],
        ),
    ]
}
