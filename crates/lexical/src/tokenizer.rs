//! Tokenizer contract and the default word tokenizer
//!
//! Segmentation and normalization belong to the tokenizer. The encoder only
//! relies on the contract: an ordered sequence of normalized word tokens,
//! each at least two characters long.

use unicode_segmentation::UnicodeSegmentation;

/// Minimum token length in characters
pub const MIN_TOKEN_CHARS: usize = 2;

/// Splits text into normalized word tokens
///
/// Implementations must be deterministic: the same text always produces the
/// same tokens, or vocabulary indices lose their meaning between insert and
/// query.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text` into normalized word tokens, in text order
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Default tokenizer
///
/// Pipeline: UAX#29 word boundaries → strip possessives → remove
/// non-alphanumeric characters → lowercase → drop tokens shorter than two
/// characters.
///
/// Identifiers are kept whole (`snake_case` stays one token after the
/// underscore is removed), which suits code search better than stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

/// Strip English possessive suffix (`'s` / `\u{2019}s`).
#[inline]
fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(strip_possessive)
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
            })
            .map(|w| w.to_lowercase())
            .filter(|s| s.chars().count() >= MIN_TOKEN_CHARS)
            .collect()
    }
}
