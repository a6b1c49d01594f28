//! Aggregate portfolio metrics

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::shared::types::{PoolMetrics, UserPosition};

/// Snapshot of portfolio-wide figures derived from current positions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_value: f64,
    /// Value-weighted APY across positions, in percent
    pub weighted_apy: f64,
    /// Value-weighted risk score in [0, 1]
    pub portfolio_risk: f64,
    /// 1 minus the Herfindahl index of position weights
    pub diversification_score: f64,
    /// Projected earnings per day at the current weighted APY
    pub daily_earnings: f64,
    pub position_count: usize,
    /// Share of total value held per pool
    pub pool_distribution: HashMap<String, f64>,
}

/// Compute portfolio metrics over the supplied position and pool snapshots.
/// Positions referencing unknown pools contribute to totals but not to the
/// weighted APY/risk figures.
pub fn portfolio_metrics(pools: &[PoolMetrics], positions: &[UserPosition]) -> PortfolioMetrics {
    let total_value: f64 = positions.iter().map(|p| p.value_usd).sum();
    if positions.is_empty() || total_value <= 0.0 {
        return PortfolioMetrics::default();
    }

    let pool_map: HashMap<&str, &PoolMetrics> = pools.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut weighted_apy = 0.0;
    let mut portfolio_risk = 0.0;
    let mut herfindahl = 0.0;
    let mut pool_distribution = HashMap::new();

    for position in positions {
        let weight = position.value_usd / total_value;
        herfindahl += weight * weight;
        pool_distribution.insert(position.pool_id.clone(), weight);

        if let Some(pool) = pool_map.get(position.pool_id.as_str()) {
            weighted_apy += weight * pool.yield_rate;
            portfolio_risk += weight * pool.risk_score;
        }
    }

    let daily_earnings = total_value * (weighted_apy / 100.0) / 365.0;

    PortfolioMetrics {
        total_value,
        weighted_apy,
        portfolio_risk,
        diversification_score: 1.0 - herfindahl,
        daily_earnings,
        position_count: positions.len(),
        pool_distribution,
    }
}
