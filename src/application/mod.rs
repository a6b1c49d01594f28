//! Application layer - orchestrating services over the domain core

pub mod services;

pub use services::{DelegationService, RebalanceService};
