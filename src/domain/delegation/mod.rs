//! Delegation gating - grant cache, usage ledger and constraint validation

pub mod grant_cache;
pub mod usage_ledger;
pub mod validator;

pub use grant_cache::GrantCache;
pub use usage_ledger::UsageLedger;
pub use validator::ConstraintValidator;
