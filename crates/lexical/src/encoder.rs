//! Text → term-frequency sparse vector
//!
//! Values are raw counts. The remote engine applies the IDF modifier at
//! query time, so nothing corpus-wide is computed here.

use crate::tokenizer::Tokenizer;
use crate::vocabulary::VocabularyStore;
use context_core::SparseVector;
use std::collections::HashMap;
use std::sync::Arc;

/// Encodes text against one collection's vocabulary
pub struct SparseEncoder {
    tokenizer: Arc<dyn Tokenizer>,
    vocabulary: VocabularyStore,
}

impl SparseEncoder {
    /// Create an encoder over an existing vocabulary
    pub fn new(tokenizer: Arc<dyn Tokenizer>, vocabulary: VocabularyStore) -> Self {
        SparseEncoder {
            tokenizer,
            vocabulary,
        }
    }

    /// Encode `text` into `(index, frequency)` pairs.
    ///
    /// Entries follow the order in which each distinct token first appears.
    /// Unseen tokens are assigned new vocabulary indices. Empty or
    /// whitespace-only text yields an empty vector without tokenizing.
    pub fn encode(&mut self, text: &str) -> SparseVector {
        if text.trim().is_empty() {
            return SparseVector::empty();
        }

        let tokens = self.tokenizer.tokenize(text);

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in &tokens {
            let count = counts.entry(token.as_str()).or_insert(0);
            if *count == 0 {
                order.push(token.as_str());
            }
            *count += 1;
        }

        SparseVector::from_pairs(order.into_iter().map(|term| {
            let index = self.vocabulary.index_of(term);
            (index, counts[term] as f32)
        }))
    }

    /// The vocabulary backing this encoder
    pub fn vocabulary(&self) -> &VocabularyStore {
        &self.vocabulary
    }
}
