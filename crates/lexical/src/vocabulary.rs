//! Per-collection term → index table
//!
//! ## Snapshot format
//!
//! ```json
//! { "vocabulary": { "term": 0, ... }, "nextIndex": 1, "timestamp": "2026-01-01T00:00:00.000Z" }
//! ```
//!
//! Every save rewrites the whole file. Terms are written in sorted order so
//! the same logical state produces the same bytes (timestamp aside).
//!
//! ## Invariant
//!
//! An index, once assigned, is never reassigned or reused. On load the
//! counter resumes past both the stored `nextIndex` and the largest stored
//! index, so a snapshot whose counter lags its table cannot cause reuse.

use crate::error::{VocabularyError, VocabularyResult};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// On-disk vocabulary snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularySnapshot {
    /// Term → index table
    pub vocabulary: BTreeMap<String, u32>,
    /// Next index to assign
    pub next_index: u32,
    /// ISO-8601 time of the save
    pub timestamp: String,
}

/// Term → index table with a monotonically increasing counter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocabularyStore {
    terms: HashMap<String, u32>,
    next_index: u32,
}

impl VocabularyStore {
    /// Create an empty store (counter at 0)
    pub fn new() -> Self {
        VocabularyStore::default()
    }

    /// Index for `term`, assigning the next free index on first occurrence
    pub fn index_of(&mut self, term: &str) -> u32 {
        if let Some(&index) = self.terms.get(term) {
            return index;
        }
        let index = self.next_index;
        self.terms.insert(term.to_string(), index);
        self.next_index += 1;
        index
    }

    /// Index for `term` without assigning one
    pub fn get(&self, term: &str) -> Option<u32> {
        self.terms.get(term).copied()
    }

    /// Number of known terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when no term has been assigned
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The index the next new term will receive
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Iterate `(term, index)` pairs in arbitrary order
    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> {
        self.terms.iter().map(|(term, &index)| (term.as_str(), index))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Build a snapshot of the current table
    pub fn snapshot(&self) -> VocabularySnapshot {
        VocabularySnapshot {
            vocabulary: self
                .terms
                .iter()
                .map(|(term, &index)| (term.clone(), index))
                .collect(),
            next_index: self.next_index,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Restore a store from a snapshot
    pub fn from_snapshot(snapshot: VocabularySnapshot) -> Self {
        let max_assigned = snapshot
            .vocabulary
            .values()
            .max()
            .map(|&max| max.saturating_add(1))
            .unwrap_or(0);
        VocabularyStore {
            next_index: snapshot.next_index.max(max_assigned),
            terms: snapshot.vocabulary.into_iter().collect(),
        }
    }

    /// Load a store from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file
    /// also yields an empty store, with a warning; loading never fails.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                target: "context::vocab",
                path = %path.display(),
                "No vocabulary snapshot, starting empty"
            );
            return VocabularyStore::new();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<VocabularySnapshot>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(snapshot) => {
                let store = VocabularyStore::from_snapshot(snapshot);
                tracing::info!(
                    target: "context::vocab",
                    path = %path.display(),
                    terms = store.len(),
                    next_index = store.next_index,
                    "Vocabulary loaded"
                );
                store
            }
            Err(e) => {
                tracing::warn!(
                    target: "context::vocab",
                    path = %path.display(),
                    error = %e,
                    "Failed to load vocabulary snapshot, starting empty"
                );
                VocabularyStore::new()
            }
        }
    }

    /// Write the full table to `path`, creating parent directories.
    ///
    /// Idempotent: saving an unchanged store rewrites the same table.
    pub fn save(&self, path: &Path) -> VocabularyResult<()> {
        let io_err = |source| VocabularyError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| VocabularyError::Serialization(e.to_string()))?;
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }
}
