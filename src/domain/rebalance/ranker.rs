//! Ranking of scored rebalance candidates

use crate::shared::types::RebalanceAction;

/// Order candidates by expected gain weighted by confidence, best first,
/// truncated to `limit`. The sort is stable, so equal-priority candidates
/// keep their input order. Recomputed fresh on every call.
pub fn rank(candidates: &[RebalanceAction], limit: usize) -> Vec<RebalanceAction> {
    let mut ranked: Vec<RebalanceAction> = candidates.to_vec();
    ranked.sort_by(|a, b| {
        b.priority()
            .partial_cmp(&a.priority())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}
