//! Sparse term-frequency vectors
//!
//! Indices reference vocabulary entries; values are raw term frequencies.
//! IDF weighting is applied by the remote engine, never here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A sparse vector in the engine's `{indices, values}` wire format
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    /// Vocabulary indices, unique within the vector
    pub indices: Vec<u32>,
    /// Values parallel to `indices`
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Create a sparse vector from parallel index and value sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVector`] if the lengths differ or an index
    /// appears twice.
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(Error::InvalidVector {
                reason: format!(
                    "sparse vector has {} indices but {} values",
                    indices.len(),
                    values.len()
                ),
            });
        }
        let mut seen = std::collections::HashSet::with_capacity(indices.len());
        if let Some(dup) = indices.iter().find(|i| !seen.insert(**i)) {
            return Err(Error::InvalidVector {
                reason: format!("duplicate sparse index {}", dup),
            });
        }
        Ok(SparseVector { indices, values })
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        SparseVector::default()
    }

    /// Append one entry. The caller guarantees `index` is not present yet.
    pub(crate) fn push_unchecked(&mut self, index: u32, value: f32) {
        self.indices.push(index);
        self.values.push(value);
    }

    /// Build from `(index, value)` pairs produced by an encoder that already
    /// guarantees uniqueness.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let mut vector = SparseVector::empty();
        for (index, value) in pairs {
            vector.push_unchecked(index, value);
        }
        vector
    }

    /// Returns the number of non-zero entries
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the vector has no entries
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate `(index, value)` pairs in stored order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}
