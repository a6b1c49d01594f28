//! Yieldguard - delegation-gated rebalance validation and scoring
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::services::{DelegationService, RebalanceService};
pub use domain::delegation::{ConstraintValidator, GrantCache, UsageLedger};
pub use domain::rebalance::{RebalanceOptimizer, RebalanceScorer};
pub use shared::config::EngineConfig;
pub use shared::types::{
    DelegationGrant, DelegationStatus, PoolMetrics, RebalanceAction, RiskTolerance, UserPosition,
    Verdict,
};
