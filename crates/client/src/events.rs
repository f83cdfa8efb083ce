//! Structured client events
//!
//! Components report progress as [`ClientEvent`]s to an injected
//! [`EventSink`] instead of logging directly. [`TracingSink`] forwards them
//! to `tracing`; [`MemorySink`] keeps them for inspection.

use parking_lot::Mutex;
use std::time::Duration;

/// Something the client did
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// An attempt of a remote operation is starting
    Attempt {
        /// Operation label
        operation: String,
        /// 1-based attempt number
        attempt: u32,
        /// Attempt budget
        max_attempts: u32,
    },
    /// An attempt failed with a transient error and will be retried
    Retrying {
        /// Operation label
        operation: String,
        /// Attempt that failed
        attempt: u32,
        /// Delay before the next attempt
        delay: Duration,
        /// Error message of the failed attempt
        error: String,
    },
    /// The operation succeeded
    Succeeded {
        /// Operation label
        operation: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// The operation failed for good
    Failed {
        /// Operation label
        operation: String,
        /// Attempts used
        attempts: u32,
        /// Error message
        error: String,
        /// True when the error short-circuited the retry loop
        terminal: bool,
    },
    /// A collection was created
    CollectionCreated {
        /// Collection name
        name: String,
        /// `dense` or `hybrid`
        kind: &'static str,
        /// Dense dimension
        dimension: usize,
    },
    /// A collection was dropped
    CollectionDropped {
        /// Collection name
        name: String,
    },
    /// A collection's vocabulary snapshot was written
    VocabularySaved {
        /// Collection name
        collection: String,
        /// Number of terms written
        terms: usize,
    },
}

/// Receives client events
pub trait EventSink: Send + Sync {
    /// Handle one event
    fn emit(&self, event: ClientEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ClientEvent) {
        match event {
            ClientEvent::Attempt {
                operation,
                attempt,
                max_attempts,
            } => tracing::debug!(
                target: "context::retry",
                op = %operation,
                attempt,
                max_attempts,
                "Attempting operation"
            ),
            ClientEvent::Retrying {
                operation,
                attempt,
                delay,
                error,
            } => tracing::warn!(
                target: "context::retry",
                op = %operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            ),
            ClientEvent::Succeeded {
                operation,
                attempts,
            } => tracing::debug!(
                target: "context::retry",
                op = %operation,
                attempts,
                "Operation succeeded"
            ),
            ClientEvent::Failed {
                operation,
                attempts,
                error,
                terminal,
            } => tracing::error!(
                target: "context::retry",
                op = %operation,
                attempts,
                terminal,
                error = %error,
                "Operation failed"
            ),
            ClientEvent::CollectionCreated {
                name,
                kind,
                dimension,
            } => tracing::info!(
                target: "context::collection",
                collection = %name,
                kind,
                dimension,
                "Collection created"
            ),
            ClientEvent::CollectionDropped { name } => tracing::info!(
                target: "context::collection",
                collection = %name,
                "Collection dropped"
            ),
            ClientEvent::VocabularySaved { collection, terms } => tracing::debug!(
                target: "context::vocab",
                collection = %collection,
                terms,
                "Vocabulary snapshot written"
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: ClientEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ClientEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Copy of the events seen so far
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().clone()
    }

    /// Delays of every `Retrying` event, in order
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ClientEvent::Retrying { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ClientEvent) {
        self.events.lock().push(event);
    }
}
