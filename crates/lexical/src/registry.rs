//! Registry of per-collection sparse encoders
//!
//! The registry is the only owner of vocabulary state. Encoders are keyed by
//! snapshot path: collections that resolve to the same file (a fixed path,
//! or names sharing a hash suffix) share one encoder, so one file never
//! holds two conflicting tables. Encoders are created on first use and
//! released when the last collection using them is dropped. Eviction leaves
//! the snapshot file alone.
//!
//! Uses `parking_lot::Mutex` so a panic while encoding does not poison the
//! registry for every other collection. Snapshots are read from disk with
//! the map unlocked.

use crate::encoder::SparseEncoder;
use crate::error::VocabularyResult;
use crate::paths::VocabularyPaths;
use crate::tokenizer::Tokenizer;
use crate::vocabulary::VocabularyStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Handle to one snapshot file's encoder
pub type SharedEncoder = Arc<Mutex<SparseEncoder>>;

#[derive(Default)]
struct Entries {
    /// Encoder per snapshot path
    encoders: HashMap<PathBuf, SharedEncoder>,
    /// Collections currently using each path
    members: HashMap<String, PathBuf>,
}

/// Per-collection encoder registry
pub struct VocabularyRegistry {
    paths: VocabularyPaths,
    tokenizer: Arc<dyn Tokenizer>,
    entries: Mutex<Entries>,
}

impl VocabularyRegistry {
    /// Create an empty registry
    pub fn new(paths: VocabularyPaths, tokenizer: Arc<dyn Tokenizer>) -> Self {
        VocabularyRegistry {
            paths,
            tokenizer,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Snapshot path for `collection`
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.paths.path_for(collection)
    }

    /// Encoder for `collection`, loading its snapshot on first use
    pub fn encoder(&self, collection: &str) -> SharedEncoder {
        let path = self.path_for(collection);
        {
            let mut entries = self.entries.lock();
            if let Some(encoder) = entries.encoders.get(&path).cloned() {
                entries.members.insert(collection.to_string(), path);
                return encoder;
            }
        }

        let vocabulary = VocabularyStore::load(&path);
        let loaded = Arc::new(Mutex::new(SparseEncoder::new(
            Arc::clone(&self.tokenizer),
            vocabulary,
        )));

        // Another caller may have loaded the same file meanwhile; first in wins.
        let mut entries = self.entries.lock();
        let encoder = Arc::clone(entries.encoders.entry(path.clone()).or_insert(loaded));
        entries.members.insert(collection.to_string(), path);
        encoder
    }

    /// Persist `collection`'s vocabulary if an encoder is registered.
    ///
    /// Returns the number of terms written, or `None` when nothing is
    /// registered for the collection.
    pub fn save(&self, collection: &str) -> VocabularyResult<Option<usize>> {
        let found = {
            let entries = self.entries.lock();
            entries.members.get(collection).and_then(|path| {
                entries
                    .encoders
                    .get(path)
                    .map(|encoder| (path.clone(), Arc::clone(encoder)))
            })
        };
        let Some((path, encoder)) = found else {
            return Ok(None);
        };
        let encoder = encoder.lock();
        encoder.vocabulary().save(&path)?;
        tracing::debug!(
            target: "context::vocab",
            collection = collection,
            path = %path.display(),
            terms = encoder.vocabulary().len(),
            "Vocabulary saved"
        );
        Ok(Some(encoder.vocabulary().len()))
    }

    /// Release `collection`'s encoder. Returns true if the collection was
    /// registered. The encoder itself stays while another collection shares
    /// its snapshot path.
    pub fn evict(&self, collection: &str) -> bool {
        let mut entries = self.entries.lock();
        let Some(path) = entries.members.remove(collection) else {
            return false;
        };
        if !entries.members.values().any(|p| *p == path) {
            entries.encoders.remove(&path);
        }
        true
    }

    /// Check whether `collection` has a registered encoder
    pub fn contains(&self, collection: &str) -> bool {
        self.entries.lock().members.contains_key(collection)
    }
}
