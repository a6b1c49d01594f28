//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headroom reported when a grant carries no transaction limit
pub const UNBOUNDED_TX_HEADROOM: u32 = u32::MAX;

/// Metrics snapshot for a yield-bearing pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub id: String,
    pub name: String,
    /// Current yield in percent APY
    pub yield_rate: f64,
    /// Total value locked in USD
    pub tvl: f64,
    pub volume_24h: f64,
    /// Risk score in [0, 1]
    pub risk_score: f64,
    /// Liquidity depth score in [0, 1]
    pub liquidity_depth: f64,
    /// Volatility score in [0, 1]
    pub volatility: f64,
}

/// A user's holding in a single pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPosition {
    pub pool_id: String,
    pub balance: f64,
    pub value_usd: f64,
}

/// A proposed reallocation with its confidence score.
/// Immutable once produced; a rejected action is discarded, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceAction {
    pub from_pool: String,
    pub to_pool: String,
    pub amount: f64,
    pub rationale: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Expected yield improvement in percentage points
    pub expected_gain: f64,
    /// Target risk score minus source risk score
    pub risk_adjustment: f64,
}

impl RebalanceAction {
    /// Ranking key: expected gain weighted by confidence
    pub fn priority(&self) -> f64 {
        self.expected_gain * self.confidence
    }
}

/// Risk tolerance tier recorded on a delegation grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// Maximum permitted risk-score increase for this tier.
    /// Fixed three-tier table; intermediate tolerances do not interpolate.
    pub fn max_risk_increase(&self) -> f64 {
        match self {
            RiskTolerance::Low => 0.1,
            RiskTolerance::Medium => 0.2,
            RiskTolerance::High => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

/// A delegation record authorizing automated actions within stated limits.
/// Created by the external authorization system; read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationGrant {
    pub user: String,
    pub max_amount: f64,
    pub allowed_pools: Vec<String>,
    pub expiry: DateTime<Utc>,
    pub risk_tolerance: RiskTolerance,
    pub daily_limit: Option<f64>,
    pub transaction_limit: Option<u32>,
    pub issued_at: DateTime<Utc>,
}

impl DelegationGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }

    pub fn allows_pool(&self, pool_id: &str) -> bool {
        self.allowed_pools.iter().any(|p| p == pool_id)
    }
}

/// Per-user running usage totals.
/// All fields are monotone non-decreasing except the explicit daily reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub cumulative_used: f64,
    pub daily_used: f64,
    pub transaction_count: u32,
}

/// Result of constraint validation. Returned synchronously, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_valid: bool,
    pub reason: String,
    pub remaining_amount: f64,
    pub remaining_transactions: u32,
}

impl Verdict {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            remaining_amount: 0.0,
            remaining_transactions: 0,
        }
    }

    pub fn invalid_with_headroom(reason: impl Into<String>, remaining_amount: f64) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            remaining_amount,
            remaining_transactions: 0,
        }
    }

    pub fn valid(remaining_amount: f64, remaining_transactions: u32) -> Self {
        Self {
            is_valid: true,
            reason: "All constraints satisfied".to_string(),
            remaining_amount,
            remaining_transactions,
        }
    }
}

/// Read-only composite view of a user's delegation for display purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationStatus {
    pub active: bool,
    pub reason: Option<String>,
    pub max_amount: f64,
    pub used_amount: f64,
    pub remaining_amount: f64,
    pub daily_limit: Option<f64>,
    pub daily_used: f64,
    pub transaction_limit: Option<u32>,
    pub transaction_count: u32,
    pub remaining_transactions: u32,
    pub expiry: Option<DateTime<Utc>>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub allowed_pools: Vec<String>,
}

impl DelegationStatus {
    pub fn inactive(reason: impl Into<String>) -> Self {
        Self {
            active: false,
            reason: Some(reason.into()),
            max_amount: 0.0,
            used_amount: 0.0,
            remaining_amount: 0.0,
            daily_limit: None,
            daily_used: 0.0,
            transaction_limit: None,
            transaction_count: 0,
            remaining_transactions: 0,
            expiry: None,
            risk_tolerance: None,
            allowed_pools: Vec::new(),
        }
    }
}

/// Audit trail entry handed to the external audit sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub user: String,
    pub action: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn usage_update(user: &str, amount: f64) -> Self {
        Self {
            id: crate::shared::utils::generate_id(),
            user: user.to_string(),
            action: "usage_update".to_string(),
            amount,
            timestamp: Utc::now(),
        }
    }
}
