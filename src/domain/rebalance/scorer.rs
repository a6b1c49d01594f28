//! Rebalance opportunity scoring

use crate::shared::config::EngineConfig;
use crate::shared::types::{PoolMetrics, RebalanceAction, UserPosition};
use crate::shared::utils::format_usd_millions;

/// Scores a candidate reallocation between two pools.
///
/// Pure computation over supplied metrics: no I/O, no errors. Degenerate
/// inputs (zero TVL, negative balances) are clamped to conservative values
/// instead of failing.
pub struct RebalanceScorer {
    min_yield_improvement: f64,
    max_risk_increase: f64,
}

impl RebalanceScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_yield_improvement: config.min_yield_improvement,
            max_risk_increase: config.max_risk_increase,
        }
    }

    /// Evaluate moving part of `position` from `source` to `target`.
    /// Returns `None` when the move fails the gain or risk gate.
    pub fn score(
        &self,
        source: &PoolMetrics,
        target: &PoolMetrics,
        position: &UserPosition,
    ) -> Option<RebalanceAction> {
        let gain = target.yield_rate - source.yield_rate;
        if gain < self.min_yield_improvement {
            return None;
        }

        let risk_delta = target.risk_score - source.risk_score;
        if risk_delta > self.max_risk_increase {
            return None;
        }

        let confidence = calculate_confidence(target, position, gain, risk_delta);
        let amount = calculate_optimal_amount(source, target, position, gain, risk_delta);
        let rationale = generate_rationale(source, target, gain, risk_delta, amount);

        Some(RebalanceAction {
            from_pool: source.id.clone(),
            to_pool: target.id.clone(),
            amount,
            rationale,
            confidence,
            expected_gain: gain,
            risk_adjustment: risk_delta,
        })
    }
}

/// Bounded weighted sum of five capped factors on top of a 0.5 base
fn calculate_confidence(
    target: &PoolMetrics,
    position: &UserPosition,
    gain: f64,
    risk_delta: f64,
) -> f64 {
    let gain_factor = (gain / 10.0).min(0.3);
    let tvl_factor = (target.tvl / 10_000_000.0).min(0.25).max(0.0);
    let risk_factor = (0.2 - risk_delta).max(0.0);
    let volume_factor = if target.tvl > 0.0 {
        (target.volume_24h / target.tvl).min(0.15).max(0.0)
    } else {
        0.0
    };
    let position_factor = (position.value_usd / 100_000.0).min(0.1).max(0.0);

    let base_confidence = 0.5;
    let total =
        base_confidence + gain_factor + tvl_factor + risk_factor + volume_factor + position_factor;

    total.clamp(0.0, 1.0)
}

/// Transfer fraction of the held balance, between 10% and 90%
fn calculate_optimal_amount(
    source: &PoolMetrics,
    target: &PoolMetrics,
    position: &UserPosition,
    gain: f64,
    risk_delta: f64,
) -> f64 {
    let base_percentage = (0.3 + gain / 20.0).min(0.8);
    let risk_adjustment = (1.0 - risk_delta * 2.0).max(0.1);
    let tvl_ratio = if source.tvl > 0.0 {
        (target.tvl / source.tvl).min(2.0)
    } else {
        2.0
    };
    let tvl_adjustment = tvl_ratio * 0.5 + 0.5;

    let final_percentage = (base_percentage * risk_adjustment * tvl_adjustment).clamp(0.1, 0.9);

    position.balance.max(0.0) * final_percentage
}

fn generate_rationale(
    source: &PoolMetrics,
    target: &PoolMetrics,
    gain: f64,
    risk_delta: f64,
    amount: f64,
) -> String {
    let mut parts = vec![
        format!(
            "Moving from {} ({:.1}% APY) to {} ({:.1}% APY)",
            source.name, source.yield_rate, target.name, target.yield_rate
        ),
        format!("Expected APY improvement: +{:.1}%", gain),
    ];

    if risk_delta > 0.0 {
        parts.push(format!("Risk increase: +{:.2} (acceptable)", risk_delta));
    } else {
        parts.push(format!("Risk decrease: {:.2} (favorable)", risk_delta.abs()));
    }

    if target.tvl > source.tvl {
        parts.push(format!(
            "Moving to higher TVL pool ({} vs {})",
            format_usd_millions(target.tvl),
            format_usd_millions(source.tvl)
        ));
    }

    parts.push(format!("Optimal rebalance amount: {:.3}", amount));

    parts.join(" | ")
}
