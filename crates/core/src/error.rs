//! Error types for context-index
//!
//! Every failure surfaced by the client is an [`Error`]. Variants fall into
//! four categories that drive retry and propagation behaviour:
//!
//! | Category   | Variants                                                        | Retried |
//! |------------|-----------------------------------------------------------------|---------|
//! | Validation | `InvalidVector`, `EmptyVector`, `CollectionMissing`, `SparseUnsupported`, `InvalidRequest` | never, raised before any remote call |
//! | Terminal   | `AlreadyExists`, `NotFound`                                     | never |
//! | Transient  | `Remote`, `Transport`, `Timeout`                                | up to the retry budget, unless the message is terminal |
//! | System     | `Connection`, `Io`, `Serialization`                             | per message classification |

use thiserror::Error;

/// Result type alias for context-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments that mark a remote failure as terminal.
const TERMINAL_MARKERS: &[&str] = &["already exists", "not found"];

/// Errors produced by the retrieval client
#[derive(Debug, Error)]
pub enum Error {
    // ==================== Validation ====================
    /// A vector was malformed (wrong shape, non-finite values)
    #[error("invalid vector: {reason}")]
    InvalidVector {
        /// Why the vector was rejected
        reason: String,
    },

    /// A document or query carried no dense vector data
    #[error("empty dense vector for '{id}'")]
    EmptyVector {
        /// Document id or request field the vector belongs to
        id: String,
    },

    /// The target collection does not exist
    #[error("collection does not exist: {name}")]
    CollectionMissing {
        /// Collection name
        name: String,
    },

    /// The target collection has no lexical vector space
    #[error("collection '{name}' has no sparse vector space")]
    SparseUnsupported {
        /// Collection name
        name: String,
    },

    /// A request was rejected before reaching the remote engine
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected
        reason: String,
    },

    // ==================== Terminal ====================
    /// The entity already exists on the remote engine
    #[error("already exists: {name}")]
    AlreadyExists {
        /// Entity name
        name: String,
    },

    /// The entity was not found on the remote engine
    #[error("not found: {name}")]
    NotFound {
        /// Entity name
        name: String,
    },

    // ==================== Transient ====================
    /// The remote engine answered with an error status
    #[error("remote error ({status}): {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Error message reported by the engine
        message: String,
    },

    /// The request never produced a response (DNS, connect, reset)
    #[error("transport error: {0}")]
    Transport(String),

    /// The connection-level timeout elapsed
    #[error("request timed out")]
    Timeout,

    // ==================== System ====================
    /// Establishing the shared client handle failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Check if this error must not be retried.
    ///
    /// Terminal errors are the already-exists and not-found variants, plus
    /// any error whose message reports one of those conditions.
    pub fn is_terminal(&self) -> bool {
        match self {
            Error::AlreadyExists { .. } | Error::NotFound { .. } => true,
            Error::Remote { message, .. } => is_terminal_message(message),
            Error::Transport(message) | Error::Connection(message) => {
                is_terminal_message(message)
            }
            _ => false,
        }
    }

    /// Check if this error was raised by local validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidVector { .. }
                | Error::EmptyVector { .. }
                | Error::CollectionMissing { .. }
                | Error::SparseUnsupported { .. }
                | Error::InvalidRequest { .. }
        )
    }

    /// Check if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } | Error::CollectionMissing { .. } => true,
            Error::Remote { status, message } => {
                *status == 404 || message.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }

    /// Shorthand for [`Error::InvalidRequest`]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Error::InvalidRequest {
            reason: reason.into(),
        }
    }
}

fn is_terminal_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TERMINAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
