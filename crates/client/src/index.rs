//! The `ContextIndex` facade
//!
//! Wires one shared client, one retry executor, one vocabulary registry and
//! one event sink into a [`CollectionManager`] and a
//! [`HybridSearchEngine`].

use crate::collection::CollectionManager;
use crate::config::ClientConfig;
use crate::events::{EventSink, TracingSink};
use crate::rest::QdrantConnector;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::search::{FusionMode, HybridSearchEngine};
use crate::service::Connector;
use crate::shared::SharedClient;
use context_core::Result;
use context_lexical::{Tokenizer, VocabularyPaths, VocabularyRegistry, WordTokenizer};
use std::path::Path;
use std::sync::Arc;

/// Entry point: collection management and search over one engine
pub struct ContextIndex<C: Connector> {
    client: Arc<SharedClient<C>>,
    registry: Arc<VocabularyRegistry>,
    collections: CollectionManager<C>,
    search: HybridSearchEngine<C>,
}

impl<C: Connector> ContextIndex<C> {
    /// Start building an index over `connector`, keeping vocabulary
    /// snapshots where `vocabulary` says
    pub fn builder(connector: C, vocabulary: VocabularyPaths) -> ContextIndexBuilder<C> {
        ContextIndexBuilder {
            connector,
            vocabulary,
            retry: RetryPolicy::default(),
            sink: Arc::new(TracingSink),
            tokenizer: Arc::new(WordTokenizer),
            fusion: FusionMode::default(),
        }
    }

    /// Collection lifecycle and point writes
    pub fn collections(&self) -> &CollectionManager<C> {
        &self.collections
    }

    /// Dense and hybrid search
    pub fn search(&self) -> &HybridSearchEngine<C> {
        &self.search
    }

    /// The vocabulary registry shared by both components
    pub fn vocabulary(&self) -> &VocabularyRegistry {
        &self.registry
    }

    /// Whether the engine connection has been established
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

impl ContextIndex<QdrantConnector> {
    /// Build an index from a [`ClientConfig`].
    ///
    /// `home` is only consulted when the config names no vocabulary
    /// location.
    pub fn from_config(config: ClientConfig, home: Option<&Path>) -> Result<Self> {
        let vocabulary = config.resolve_vocabulary(home)?;
        let retry = config.retry;
        Ok(ContextIndex::builder(QdrantConnector::new(config), vocabulary)
            .with_retry(retry)
            .build())
    }
}

/// Builder for [`ContextIndex`]
pub struct ContextIndexBuilder<C: Connector> {
    connector: C,
    vocabulary: VocabularyPaths,
    retry: RetryPolicy,
    sink: Arc<dyn EventSink>,
    tokenizer: Arc<dyn Tokenizer>,
    fusion: FusionMode,
}

impl<C: Connector> ContextIndexBuilder<C> {
    /// Retry budget for remote calls (default: 3 attempts, 1s initial delay)
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Event sink (default: [`TracingSink`])
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Tokenizer for lexical encoding (default: [`WordTokenizer`])
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Where candidate pools are fused (default: remote)
    pub fn with_fusion(mut self, fusion: FusionMode) -> Self {
        self.fusion = fusion;
        self
    }

    /// Assemble the index. Nothing connects until the first operation.
    pub fn build(self) -> ContextIndex<C> {
        let client = Arc::new(SharedClient::new(self.connector));
        let retry = RetryExecutor::new(self.retry, Arc::clone(&self.sink));
        let registry = Arc::new(VocabularyRegistry::new(self.vocabulary, self.tokenizer));

        ContextIndex {
            collections: CollectionManager::new(
                Arc::clone(&client),
                retry.clone(),
                Arc::clone(&registry),
                self.sink,
            ),
            search: HybridSearchEngine::new(Arc::clone(&client), retry, Arc::clone(&registry), self.fusion),
            client,
            registry,
        }
    }
}
