//! Advisory recommendations derived from portfolio metrics

use serde::{Deserialize, Serialize};

use super::metrics::portfolio_metrics;
use crate::shared::types::{PoolMetrics, UserPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    RiskWarning,
    Diversification,
    YieldOpportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// Advisory card for display; not an executable action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub confidence: f64,
}

const HIGH_RISK_THRESHOLD: f64 = 0.6;
const LOW_DIVERSIFICATION_THRESHOLD: f64 = 0.3;

/// Build advisory recommendations for the portfolio, most confident first
pub fn recommendations(pools: &[PoolMetrics], positions: &[UserPosition]) -> Vec<Recommendation> {
    let metrics = portfolio_metrics(pools, positions);
    let mut out = Vec::new();

    if metrics.portfolio_risk > HIGH_RISK_THRESHOLD {
        out.push(Recommendation {
            kind: RecommendationKind::RiskWarning,
            priority: Priority::High,
            title: "High Portfolio Risk Detected".to_string(),
            description: format!(
                "Current portfolio risk score: {:.2}. Consider rebalancing to lower-risk pools.",
                metrics.portfolio_risk
            ),
            confidence: 0.9,
        });
    }

    if metrics.position_count > 0 && metrics.diversification_score < LOW_DIVERSIFICATION_THRESHOLD {
        out.push(Recommendation {
            kind: RecommendationKind::Diversification,
            priority: Priority::Medium,
            title: "Improve Diversification".to_string(),
            description: format!(
                "Portfolio is concentrated (diversification score: {:.2}). Consider spreading across more pools.",
                metrics.diversification_score
            ),
            confidence: 0.8,
        });
    }

    if metrics.position_count > 0 {
        let avg_apy = metrics.weighted_apy;
        let best = pools
            .iter()
            .filter(|p| p.yield_rate > avg_apy + 2.0 && p.risk_score < 0.5)
            .max_by(|a, b| {
                let score_a = a.yield_rate - a.risk_score * 10.0;
                let score_b = b.yield_rate - b.risk_score * 10.0;
                score_a.partial_cmp(&score_b).unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(pool) = best {
            out.push(Recommendation {
                kind: RecommendationKind::YieldOpportunity,
                priority: Priority::Medium,
                title: "Higher Yield Opportunity".to_string(),
                description: format!(
                    "Consider {} with {:.1}% APY (current avg: {:.1}%)",
                    pool.name, pool.yield_rate, avg_apy
                ),
                confidence: 0.75,
            });
        }
    }

    out.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}
