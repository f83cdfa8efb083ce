//! Deterministic point identifiers
//!
//! The remote engine only accepts UUIDs or integers as point ids. Chunk keys
//! are hashed (MD5, 128 bits) and the digest is laid out as a hyphenated
//! UUID, so re-inserting the same chunk overwrites its earlier point.

use md5::{Digest, Md5};
use uuid::Uuid;

/// Maps arbitrary keys onto stable UUID-shaped ids
pub struct IdentifierMapper;

impl IdentifierMapper {
    /// Hash `original_key` into a `8-4-4-4-12` hex id.
    ///
    /// Pure and deterministic: identical input always yields identical
    /// output.
    pub fn to_stable_id(original_key: &str) -> String {
        let digest = Md5::digest(original_key.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Uuid::from_bytes(bytes).hyphenated().to_string()
    }
}

/// Composite key for a chunk of content: path, line range and content.
pub fn chunk_key(relative_path: &str, start_line: i64, end_line: i64, content: &str) -> String {
    format!("{}:{}:{}:{}", relative_path, start_line, end_line, content)
}
