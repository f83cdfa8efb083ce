//! Error types for vocabulary persistence

use thiserror::Error;

/// Errors raised while saving a vocabulary snapshot
#[derive(Debug, Error)]
pub enum VocabularyError {
    /// Filesystem failure (create dir, write file)
    #[error("vocabulary I/O error at {path}: {source}")]
    Io {
        /// Snapshot path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded
    #[error("vocabulary serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for vocabulary operations
pub type VocabularyResult<T> = Result<T, VocabularyError>;

impl From<VocabularyError> for context_core::Error {
    fn from(e: VocabularyError) -> Self {
        match e {
            VocabularyError::Io { source, .. } => context_core::Error::Io(source),
            VocabularyError::Serialization(msg) => context_core::Error::Serialization(msg),
        }
    }
}
