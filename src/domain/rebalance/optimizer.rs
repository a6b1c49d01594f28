//! Position scan for the best rebalance candidate

use std::collections::HashMap;
use tracing::{debug, info};

use super::scorer::RebalanceScorer;
use crate::shared::config::EngineConfig;
use crate::shared::types::{PoolMetrics, RebalanceAction, UserPosition};

/// Scans every funded position against every other pool and keeps the most
/// confident viable move. Operates only on supplied metric snapshots.
pub struct RebalanceOptimizer {
    scorer: RebalanceScorer,
    confidence_threshold: f64,
}

impl RebalanceOptimizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            scorer: RebalanceScorer::new(config),
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// The single best candidate, if one clears the confidence threshold
    pub fn find_optimal_rebalance(
        &self,
        pools: &[PoolMetrics],
        positions: &[UserPosition],
    ) -> Option<RebalanceAction> {
        let best = self
            .collect_candidates(pools, positions)
            .into_iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;

        if best.confidence > self.confidence_threshold {
            info!(
                from = %best.from_pool,
                to = %best.to_pool,
                confidence = best.confidence,
                "Optimal rebalance found"
            );
            Some(best)
        } else {
            debug!(
                confidence = best.confidence,
                threshold = self.confidence_threshold,
                "Best candidate below confidence threshold"
            );
            None
        }
    }

    /// Every viable candidate, unranked; feed the result to `ranker::rank`
    pub fn collect_candidates(
        &self,
        pools: &[PoolMetrics],
        positions: &[UserPosition],
    ) -> Vec<RebalanceAction> {
        let pool_map: HashMap<&str, &PoolMetrics> =
            pools.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut candidates = Vec::new();
        for position in positions {
            if position.balance <= 0.0 {
                continue;
            }
            let Some(source) = pool_map.get(position.pool_id.as_str()) else {
                continue;
            };
            for target in pools {
                if target.id == position.pool_id {
                    continue;
                }
                if let Some(action) = self.scorer.score(source, target, position) {
                    candidates.push(action);
                }
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // modest TVL and no volume keep confidence well under the 1.0 clamp,
    // so ordering between candidates stays observable
    fn pool(id: &str, yield_rate: f64, risk: f64) -> PoolMetrics {
        PoolMetrics {
            id: id.to_string(),
            name: id.to_string(),
            yield_rate,
            tvl: 500_000.0,
            volume_24h: 0.0,
            risk_score: risk,
            liquidity_depth: 0.5,
            volatility: 0.2,
        }
    }

    fn position(pool_id: &str, balance: f64, value_usd: f64) -> UserPosition {
        UserPosition {
            pool_id: pool_id.to_string(),
            balance,
            value_usd,
        }
    }

    #[test]
    fn test_picks_most_confident_candidate() {
        let pools = vec![
            pool("low", 6.0, 0.1),
            pool("mid", 8.0, 0.15),
            pool("high", 10.0, 0.2),
        ];
        let positions = vec![position("low", 10.0, 1_000.0)];

        let optimizer = RebalanceOptimizer::new(&EngineConfig::default());
        let best = optimizer
            .find_optimal_rebalance(&pools, &positions)
            .expect("a 4-point gain within tolerance should clear the threshold");
        assert_eq!(best.to_pool, "high");
    }

    #[test]
    fn test_empty_and_unfunded_positions_yield_nothing() {
        let pools = vec![pool("low", 6.0, 0.2), pool("high", 10.0, 0.1)];
        let optimizer = RebalanceOptimizer::new(&EngineConfig::default());

        assert!(optimizer.find_optimal_rebalance(&pools, &[]).is_none());
        assert!(optimizer
            .find_optimal_rebalance(&pools, &[position("low", 0.0, 0.0)])
            .is_none());
    }

    #[test]
    fn test_threshold_gates_weak_candidates() {
        // small gain, tiny position: viable but low confidence
        let pools = vec![pool("low", 8.0, 0.2), pool("high", 8.6, 0.2)];
        let positions = vec![position("low", 1.0, 100.0)];

        let mut config = EngineConfig::default();
        config.confidence_threshold = 0.99;
        let optimizer = RebalanceOptimizer::new(&config);
        assert!(optimizer.find_optimal_rebalance(&pools, &positions).is_none());

        // the same candidate is still collected for ranking
        assert_eq!(optimizer.collect_candidates(&pools, &positions).len(), 1);
    }

    #[test]
    fn test_unknown_source_pool_is_skipped() {
        let pools = vec![pool("high", 10.0, 0.1)];
        let positions = vec![position("missing", 10.0, 30_000.0)];
        let optimizer = RebalanceOptimizer::new(&EngineConfig::default());
        assert!(optimizer.collect_candidates(&pools, &positions).is_empty());
    }
}
