//! Domain layer - delegation gating, rebalance scoring and portfolio views

pub mod delegation;
pub mod rebalance;
pub mod portfolio;
