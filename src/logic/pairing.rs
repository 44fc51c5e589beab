//! Round pairing: adjacent pairs over entries sorted by round score.

use crate::models::{Entry, Pair};
use std::collections::HashMap;

/// Generate the pairs for one round.
///
/// 1. Round score = `base_score` + cumulative score (missing titles count as 0).
/// 2. Stable sort descending by round score, so ties keep entry-list order.
/// 3. Pair up (0,1), (2,3), ...; a trailing entry without a partner sits this round out.
pub fn generate_pairs(entries: &[Entry], scores: &HashMap<String, i32>) -> Vec<Pair> {
    let mut ranked: Vec<(&Entry, i32)> = entries
        .iter()
        .map(|e| (e, e.base_score + scores.get(&e.title).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .chunks_exact(2)
        .map(|chunk| Pair::new(chunk[0].0.clone(), chunk[1].0.clone()))
        .collect()
}
