//! Reciprocal Rank Fusion (RRF).
//!
//! Merges the lexical and vector rankings using rank position only:
//!
//! ```text
//! score(id) = sum over lists containing id of: 1 / (k + r + 1)
//! ```
//!
//! where `r` is the 0-based rank in that list. The legs' native scores (BM25
//! and cosine distance) live on unrelated scales, so they are never looked
//! at. With `k = 60`, rank 0 contributes `1/61 ≈ 0.016393` and rank 1
//! contributes `1/62 ≈ 0.016129`: a gentle slope where agreement between the
//! two legs outweighs a single top placement.
//!
//! # Ties
//!
//! Sorting is stable over first-appearance order, and the lexical list is
//! read first. Two ids with exactly equal scores therefore keep lexical
//! precedence, then earlier rank.
//!
//! # Example
//!
//! ```
//! use recall_search::fusion::rrf::fuse;
//!
//! let fused = fuse(&["A", "B", "C"], &["B", "D"], 3, 60);
//! let ids: Vec<&str> = fused.iter().map(|h| h.id.as_str()).collect();
//! assert_eq!(ids, vec!["B", "A", "D"]);
//! ```

use serde::Serialize;
use std::collections::HashMap;

/// Standard RRF smoothing constant.
pub const DEFAULT_RRF_K: usize = 60;

/// One fused id with its cumulative score and where it ranked in each leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedHit {
    pub id: String,
    pub score: f64,
    /// 0-based position in the lexical list, if present.
    pub lexical_rank: Option<usize>,
    /// 0-based position in the vector list, if present.
    pub vector_rank: Option<usize>,
}

/// Contribution of a single 0-based rank.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rrf_contribution(rank: usize, k: usize) -> f64 {
    1.0 / (k as f64 + rank as f64 + 1.0)
}

/// Fuse two best-first id lists and return the top `n`.
///
/// Either list may be empty. Ids must be unique within each list.
#[must_use]
pub fn fuse(lexical: &[&str], vector: &[&str], n: usize, k: usize) -> Vec<FusedHit> {
    if n == 0 {
        return Vec::new();
    }

    let mut hits: Vec<FusedHit> = Vec::with_capacity(lexical.len() + vector.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(hits.capacity());

    for (rank, id) in lexical.iter().enumerate() {
        let slot = slot_for(&mut hits, &mut index, *id);
        hits[slot].score += rrf_contribution(rank, k);
        hits[slot].lexical_rank = Some(rank);
    }

    for (rank, id) in vector.iter().enumerate() {
        let slot = slot_for(&mut hits, &mut index, *id);
        hits[slot].score += rrf_contribution(rank, k);
        hits[slot].vector_rank = Some(rank);
    }

    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(n);
    hits
}

fn slot_for<'a>(
    hits: &mut Vec<FusedHit>,
    index: &mut HashMap<&'a str, usize>,
    id: &'a str,
) -> usize {
    *index.entry(id).or_insert_with(|| {
        hits.push(FusedHit {
            id: id.to_string(),
            score: 0.0,
            lexical_rank: None,
            vector_rank: None,
        });
        hits.len() - 1
    })
}
