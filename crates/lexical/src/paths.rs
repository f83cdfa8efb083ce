//! Where vocabulary snapshots live
//!
//! The location is always explicit configuration. The home-directory layout
//! used by earlier deployments (`<home>/.context/vocabulary`) is available
//! through [`VocabularyPaths::under_home`], but nothing reads the
//! environment on the caller's behalf.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Snapshot file name prefix for per-collection files
const FILE_PREFIX: &str = "vocabulary-";

/// Strategy for locating a collection's vocabulary snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VocabularyPaths {
    /// Every collection uses this one file
    Fixed {
        /// Snapshot file
        path: PathBuf,
    },
    /// One `vocabulary-<hash>.json` file per collection inside `dir`
    PerCollection {
        /// Directory holding the snapshots
        dir: PathBuf,
    },
}

impl VocabularyPaths {
    /// Use a single explicit snapshot file
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        VocabularyPaths::Fixed { path: path.into() }
    }

    /// One file per collection inside `dir`
    pub fn per_collection(dir: impl Into<PathBuf>) -> Self {
        VocabularyPaths::PerCollection { dir: dir.into() }
    }

    /// One file per collection inside `<home>/.context/vocabulary`
    pub fn under_home(home: &Path) -> Self {
        VocabularyPaths::per_collection(home.join(".context").join("vocabulary"))
    }

    /// Snapshot path for `collection`
    pub fn path_for(&self, collection: &str) -> PathBuf {
        match self {
            VocabularyPaths::Fixed { path } => path.clone(),
            VocabularyPaths::PerCollection { dir } => {
                dir.join(format!("{}{}.json", FILE_PREFIX, collection_hash(collection)))
            }
        }
    }
}

/// Content-address suffix of a collection name.
///
/// Collection names end in `_<hash>` (e.g. `hybrid_code_chunks_1a2b3c4d`);
/// the trailing underscore-delimited segment is the hash. A name without an
/// underscore is its own hash.
pub fn collection_hash(collection: &str) -> &str {
    collection.rsplit('_').next().unwrap_or(collection)
}
