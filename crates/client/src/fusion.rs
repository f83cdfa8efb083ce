//! Local reciprocal rank fusion
//!
//! The remote engine normally fuses candidate pools itself. This fuser is
//! the local fallback for engines without a fusion stage.
//!
//! RRF Score = sum(1 / (k + rank)) across all lists, rank starting at 1.
//! A list a document is absent from contributes nothing.
//!
//! # Example
//!
//! ```text
//! Given:
//!   - Dense:   [doc1@rank1, doc2@rank2, doc3@rank3]
//!   - Lexical: [doc2@rank1, doc4@rank2, doc1@rank3]
//!   - k = 60
//!
//! RRF scores:
//!   doc1: 1/(60+1) + 1/(60+3) = 0.0164 + 0.0159 = 0.0323
//!   doc2: 1/(60+2) + 1/(60+1) = 0.0161 + 0.0164 = 0.0325  <- highest
//!   doc3: 1/(60+3) = 0.0159
//!   doc4: 1/(60+2) = 0.0161
//!
//! Final ranking: [doc2, doc1, doc4, doc3]
//! ```

use crate::payload::ScoredPoint;
use crate::search::FieldKind;
use std::collections::HashMap;

/// Default RRF smoothing constant
pub const DEFAULT_RRF_K: u32 = 60;

/// One ranked candidate list
#[derive(Debug, Clone)]
pub struct RankedList {
    /// Which vector space produced the list
    pub kind: FieldKind,
    /// Candidates, best first
    pub points: Vec<ScoredPoint>,
}

impl RankedList {
    /// Wrap a candidate list
    pub fn new(kind: FieldKind, points: Vec<ScoredPoint>) -> Self {
        RankedList { kind, points }
    }
}

/// Reciprocal Rank Fusion
#[derive(Debug, Clone, Copy)]
pub struct RrfFuser {
    /// Smoothing constant (default 60)
    k: u32,
}

impl Default for RrfFuser {
    fn default() -> Self {
        RrfFuser { k: DEFAULT_RRF_K }
    }
}

struct Candidate {
    point: ScoredPoint,
    ranks: Vec<usize>,
    score: f64,
    dense_rank: Option<usize>,
    first_seen: usize,
}

impl RrfFuser {
    /// Create a fuser with a custom constant
    pub fn new(k: u32) -> Self {
        RrfFuser { k }
    }

    /// The smoothing constant
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Fuse `lists` into one ranking of at most `limit` points.
    ///
    /// Ordering: fused score descending, then rank in the first dense list
    /// (documents missing from it after those present), then first
    /// appearance across the input lists. Returned scores are fused scores.
    ///
    /// Scores accumulate in `f64` over ranks in ascending order, so equal
    /// rank sets always produce bit-identical scores.
    pub fn fuse(&self, lists: Vec<RankedList>, limit: usize) -> Vec<ScoredPoint> {
        let dense_list = lists.iter().position(|l| l.kind == FieldKind::Dense);
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (list_idx, list) in lists.into_iter().enumerate() {
            for (i, point) in list.points.into_iter().enumerate() {
                let rank = i + 1;
                let is_dense = Some(list_idx) == dense_list;

                match by_id.get(&point.id) {
                    Some(&slot) => {
                        let candidate = &mut candidates[slot];
                        candidate.ranks.push(rank);
                        if is_dense && candidate.dense_rank.is_none() {
                            candidate.dense_rank = Some(rank);
                        }
                    }
                    None => {
                        by_id.insert(point.id.clone(), candidates.len());
                        candidates.push(Candidate {
                            first_seen: candidates.len(),
                            dense_rank: is_dense.then_some(rank),
                            ranks: vec![rank],
                            score: 0.0,
                            point,
                        });
                    }
                }
            }
        }

        for candidate in &mut candidates {
            candidate.ranks.sort_unstable();
            candidate.score = candidate
                .ranks
                .iter()
                .map(|&rank| 1.0 / (f64::from(self.k) + rank as f64))
                .sum();
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| match (a.dense_rank, b.dense_rank) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        candidates
            .into_iter()
            .take(limit)
            .map(|c| ScoredPoint {
                score: c.score as f32,
                ..c.point
            })
            .collect()
    }
}
