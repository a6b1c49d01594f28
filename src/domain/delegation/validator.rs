//! Delegation constraint validation

use std::sync::Arc;
use chrono::Utc;
use futures::future::{join_all, BoxFuture};
use tracing::{debug, error};

use super::grant_cache::GrantCache;
use super::usage_ledger::UsageLedger;
use crate::shared::types::{
    DelegationGrant, RebalanceAction, UsageEntry, Verdict, UNBOUNDED_TX_HEADROOM,
};

const INTERNAL_ERROR_REASON: &str = "Internal validation error";

/// Outcome of a single constraint check
enum CheckOutcome {
    Pass,
    Fail(Verdict),
}

/// Validates proposed actions against a user's delegation grant.
///
/// Pure read against the grant cache and usage ledger; validation never
/// mutates state. Fail-closed: any collaborator failure yields an invalid
/// verdict, never an implicit pass.
pub struct ConstraintValidator {
    grants: Arc<GrantCache>,
    ledger: Arc<UsageLedger>,
}

impl ConstraintValidator {
    pub fn new(grants: Arc<GrantCache>, ledger: Arc<UsageLedger>) -> Self {
        Self { grants, ledger }
    }

    /// Run every constraint check against the action. The checks are
    /// independent, so they are fanned out and joined; the first failing
    /// check (in declaration order) becomes the verdict.
    pub async fn validate(&self, action: &RebalanceAction, user: &str) -> Verdict {
        if action.amount < 0.0 {
            return Verdict::invalid(format!(
                "Action amount must be non-negative, got {}",
                action.amount
            ));
        }

        let grant = match self.grants.get_grant(user).await {
            Ok(Some(grant)) => grant,
            Ok(None) => return Verdict::invalid("No active delegation found"),
            Err(e) => {
                error!(user, error = %e, "Grant lookup failed during validation");
                return Verdict::invalid(INTERNAL_ERROR_REASON);
            }
        };

        let usage = self.ledger.snapshot(user).await;

        let checks: Vec<BoxFuture<'_, CheckOutcome>> = vec![
            Box::pin(check_expiry(&grant)),
            Box::pin(check_amount_limit(action, &grant, &usage)),
            Box::pin(check_pool_allowlist(action, &grant)),
            Box::pin(check_risk_tolerance(action, &grant)),
            Box::pin(check_daily_limit(action, &grant, &usage)),
            Box::pin(check_transaction_limit(&grant, &usage)),
        ];

        for outcome in join_all(checks).await {
            if let CheckOutcome::Fail(verdict) = outcome {
                debug!(user, reason = %verdict.reason, "Action rejected");
                return verdict;
            }
        }

        Verdict::valid(
            grant.max_amount - usage.cumulative_used - action.amount,
            remaining_transactions(&grant, &usage),
        )
    }
}

fn remaining_transactions(grant: &DelegationGrant, usage: &UsageEntry) -> u32 {
    match grant.transaction_limit {
        Some(limit) => limit
            .saturating_sub(usage.transaction_count)
            .saturating_sub(1),
        None => UNBOUNDED_TX_HEADROOM,
    }
}

async fn check_expiry(grant: &DelegationGrant) -> CheckOutcome {
    if grant.is_expired(Utc::now()) {
        CheckOutcome::Fail(Verdict::invalid(format!(
            "Delegation expired at {}",
            grant.expiry
        )))
    } else {
        CheckOutcome::Pass
    }
}

async fn check_amount_limit(
    action: &RebalanceAction,
    grant: &DelegationGrant,
    usage: &UsageEntry,
) -> CheckOutcome {
    let remaining = grant.max_amount - usage.cumulative_used;
    if action.amount > remaining {
        CheckOutcome::Fail(Verdict::invalid_with_headroom(
            format!(
                "Amount {} exceeds remaining limit {}",
                action.amount, remaining
            ),
            remaining,
        ))
    } else {
        CheckOutcome::Pass
    }
}

async fn check_pool_allowlist(action: &RebalanceAction, grant: &DelegationGrant) -> CheckOutcome {
    if !action.from_pool.is_empty() && !grant.allows_pool(&action.from_pool) {
        return CheckOutcome::Fail(Verdict::invalid(format!(
            "Source pool {} not in allowed list",
            action.from_pool
        )));
    }
    if !action.to_pool.is_empty() && !grant.allows_pool(&action.to_pool) {
        return CheckOutcome::Fail(Verdict::invalid(format!(
            "Target pool {} not in allowed list",
            action.to_pool
        )));
    }
    CheckOutcome::Pass
}

async fn check_risk_tolerance(action: &RebalanceAction, grant: &DelegationGrant) -> CheckOutcome {
    let ceiling = grant.risk_tolerance.max_risk_increase();
    if action.risk_adjustment > ceiling {
        CheckOutcome::Fail(Verdict::invalid(format!(
            "Risk increase {:.2} exceeds {} tolerance {:.1}",
            action.risk_adjustment,
            grant.risk_tolerance.as_str(),
            ceiling
        )))
    } else {
        CheckOutcome::Pass
    }
}

async fn check_daily_limit(
    action: &RebalanceAction,
    grant: &DelegationGrant,
    usage: &UsageEntry,
) -> CheckOutcome {
    let Some(limit) = grant.daily_limit else {
        return CheckOutcome::Pass;
    };
    let projected = usage.daily_used + action.amount;
    if projected > limit {
        CheckOutcome::Fail(Verdict::invalid(format!(
            "Daily limit exceeded: {} > {}",
            projected, limit
        )))
    } else {
        CheckOutcome::Pass
    }
}

async fn check_transaction_limit(grant: &DelegationGrant, usage: &UsageEntry) -> CheckOutcome {
    let Some(limit) = grant.transaction_limit else {
        return CheckOutcome::Pass;
    };
    if usage.transaction_count >= limit {
        CheckOutcome::Fail(Verdict::invalid(format!(
            "Transaction limit reached: {}/{}",
            usage.transaction_count, limit
        )))
    } else {
        CheckOutcome::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    use crate::infrastructure::grant_source::GrantSource;
    use crate::shared::errors::GrantError;
    use crate::shared::types::RiskTolerance;

    struct StaticSource {
        grants: Vec<DelegationGrant>,
    }

    #[async_trait]
    impl GrantSource for StaticSource {
        async fn fetch_grants(&self, _user: &str) -> Result<Vec<DelegationGrant>, GrantError> {
            Ok(self.grants.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl GrantSource for FailingSource {
        async fn fetch_grants(&self, _user: &str) -> Result<Vec<DelegationGrant>, GrantError> {
            Err(GrantError::Http("connection refused".to_string()))
        }
    }

    fn base_grant() -> DelegationGrant {
        DelegationGrant {
            user: "alice".to_string(),
            max_amount: 10.0,
            allowed_pools: vec!["pool-a".to_string(), "pool-b".to_string()],
            expiry: Utc::now() + ChronoDuration::hours(24),
            risk_tolerance: RiskTolerance::Medium,
            daily_limit: Some(5.0),
            transaction_limit: None,
            issued_at: Utc::now(),
        }
    }

    fn action(amount: f64, risk_adjustment: f64) -> RebalanceAction {
        RebalanceAction {
            from_pool: "pool-a".to_string(),
            to_pool: "pool-b".to_string(),
            amount,
            rationale: String::new(),
            confidence: 0.9,
            expected_gain: 1.0,
            risk_adjustment,
        }
    }

    fn validator_for(grant: DelegationGrant) -> (ConstraintValidator, Arc<UsageLedger>) {
        let source = Arc::new(StaticSource {
            grants: vec![grant],
        });
        let cache = Arc::new(GrantCache::new(source, Duration::from_secs(300)));
        let ledger = Arc::new(UsageLedger::new());
        (ConstraintValidator::new(cache, ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn test_amount_limit_binds_before_daily_limit() {
        // maxAmount 10, cumulative 8, daily 1: amount 3 busts the overall cap
        // (8 + 3 > 10) while staying under the daily limit (1 + 3 <= 5)
        let (validator, ledger) = validator_for(base_grant());
        ledger.record_usage("alice", 7.0).await;
        ledger.reset_daily("alice").await;
        ledger.record_usage("alice", 1.0).await;

        let verdict = validator.validate(&action(3.0, 0.05), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("exceeds remaining limit"), "{}", verdict.reason);
        assert_eq!(verdict.remaining_amount, 2.0);
    }

    #[tokio::test]
    async fn test_daily_limit_exceeded() {
        let (validator, ledger) = validator_for(base_grant());
        ledger.record_usage("alice", 4.0).await;

        let verdict = validator.validate(&action(2.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("Daily limit exceeded"), "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_expired_grant() {
        let mut grant = base_grant();
        grant.expiry = Utc::now() - ChronoDuration::hours(1);
        let (validator, _) = validator_for(grant);

        let verdict = validator.validate(&action(1.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("expired"), "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_disallowed_target_pool_is_named() {
        let (validator, _) = validator_for(base_grant());
        let mut act = action(1.0, 0.0);
        act.to_pool = "pool-x".to_string();

        let verdict = validator.validate(&act, "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("pool-x"), "{}", verdict.reason);
        assert!(verdict.reason.contains("Target"), "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_risk_tolerance_tiers() {
        // medium tier caps the risk increase at 0.2
        let (validator, _) = validator_for(base_grant());
        let verdict = validator.validate(&action(1.0, 0.25), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("medium"), "{}", verdict.reason);

        let mut high = base_grant();
        high.risk_tolerance = RiskTolerance::High;
        let (validator, _) = validator_for(high);
        let verdict = validator.validate(&action(1.0, 0.25), "alice").await;
        assert!(verdict.is_valid, "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_transaction_limit_reached() {
        let mut grant = base_grant();
        grant.transaction_limit = Some(2);
        grant.daily_limit = None;
        let (validator, ledger) = validator_for(grant);
        ledger.record_usage("alice", 1.0).await;
        ledger.record_usage("alice", 1.0).await;

        let verdict = validator.validate(&action(1.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("Transaction limit reached: 2/2"), "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_success_reports_headroom() {
        let mut grant = base_grant();
        grant.transaction_limit = Some(5);
        let (validator, ledger) = validator_for(grant);
        ledger.record_usage("alice", 2.0).await;

        let verdict = validator.validate(&action(3.0, 0.05), "alice").await;
        assert!(verdict.is_valid, "{}", verdict.reason);
        assert_eq!(verdict.remaining_amount, 5.0);
        assert_eq!(verdict.remaining_transactions, 3);
    }

    #[tokio::test]
    async fn test_unbounded_transaction_headroom() {
        let (validator, _) = validator_for(base_grant());
        let verdict = validator.validate(&action(1.0, 0.0), "alice").await;
        assert!(verdict.is_valid);
        assert_eq!(verdict.remaining_transactions, UNBOUNDED_TX_HEADROOM);
    }

    #[tokio::test]
    async fn test_no_grant_fails_closed() {
        let source = Arc::new(StaticSource { grants: Vec::new() });
        let cache = Arc::new(GrantCache::new(source, Duration::from_secs(300)));
        let validator = ConstraintValidator::new(cache, Arc::new(UsageLedger::new()));

        let verdict = validator.validate(&action(1.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, "No active delegation found");
    }

    #[tokio::test]
    async fn test_source_failure_fails_closed() {
        let cache = Arc::new(GrantCache::new(
            Arc::new(FailingSource),
            Duration::from_secs(300),
        ));
        let validator = ConstraintValidator::new(cache, Arc::new(UsageLedger::new()));

        let verdict = validator.validate(&action(1.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, INTERNAL_ERROR_REASON);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let (validator, _) = validator_for(base_grant());
        let verdict = validator.validate(&action(-1.0, 0.0), "alice").await;
        assert!(!verdict.is_valid);
        assert!(verdict.reason.contains("non-negative"), "{}", verdict.reason);
    }
}
