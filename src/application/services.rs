//! Application services and use cases

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::delegation::{ConstraintValidator, GrantCache, UsageLedger};
use crate::domain::rebalance::{ranker, RebalanceOptimizer, RebalanceScorer};
use crate::infrastructure::audit::AuditSink;
use crate::infrastructure::grant_source::GrantSource;
use crate::infrastructure::metrics_source::MetricsSource;
use crate::shared::config::EngineConfig;
use crate::shared::errors::EngineError;
use crate::shared::types::{
    AuditEntry, DelegationStatus, PoolMetrics, RebalanceAction, UserPosition, Verdict,
    UNBOUNDED_TX_HEADROOM,
};

/// Gatekeeping service for delegated executions.
///
/// Owns the grant cache and usage ledger and exposes the outward operations
/// of the delegation side: validate, record confirmed usage, daily reset,
/// cache invalidation and the composite status view.
pub struct DelegationService {
    grants: Arc<GrantCache>,
    ledger: Arc<UsageLedger>,
    validator: ConstraintValidator,
    audit: Arc<dyn AuditSink>,
}

impl DelegationService {
    pub fn new(
        source: Arc<dyn GrantSource>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self {
        let grants = Arc::new(GrantCache::new(
            source,
            Duration::from_secs(config.grant_ttl_secs),
        ));
        let ledger = Arc::new(UsageLedger::new());
        let validator = ConstraintValidator::new(grants.clone(), ledger.clone());
        Self {
            grants,
            ledger,
            validator,
            audit,
        }
    }

    /// Check a proposed action against the user's grant and usage.
    /// Pure read; call `record_usage` only after confirmed execution.
    pub async fn validate(&self, action: &RebalanceAction, user: &str) -> Verdict {
        self.validator.validate(action, user).await
    }

    /// Record a confirmed successful execution and emit an audit entry.
    /// Audit delivery is fire-and-forget; its failure never propagates.
    pub async fn record_usage(&self, user: &str, amount: f64) {
        self.ledger.record_usage(user, amount).await;
        self.audit.record(AuditEntry::usage_update(user, amount)).await;
    }

    /// Zero the user's daily figure; driven by an external daily scheduler
    pub async fn reset_daily(&self, user: &str) {
        self.ledger.reset_daily(user).await;
    }

    /// Force the next grant lookup to refetch; pass `None` to drop all
    /// cached grants (e.g. after an external revocation)
    pub async fn invalidate_grants(&self, user: Option<&str>) {
        match user {
            Some(user) => self.grants.invalidate(user).await,
            None => self.grants.invalidate_all().await,
        }
    }

    /// Composite read-only view of the user's delegation for display.
    /// Lookup failures surface as an inactive status, never as an error.
    pub async fn delegation_status(&self, user: &str) -> DelegationStatus {
        let grant = match self.grants.get_grant(user).await {
            Ok(Some(grant)) => grant,
            Ok(None) => return DelegationStatus::inactive("No active delegation"),
            Err(e) => {
                warn!(user, error = %e, "Grant lookup failed for status view");
                return DelegationStatus::inactive(format!("Error: {}", e));
            }
        };

        let usage = self.ledger.snapshot(user).await;
        let remaining_transactions = match grant.transaction_limit {
            Some(limit) => limit.saturating_sub(usage.transaction_count),
            None => UNBOUNDED_TX_HEADROOM,
        };

        DelegationStatus {
            active: true,
            reason: None,
            max_amount: grant.max_amount,
            used_amount: usage.cumulative_used,
            remaining_amount: grant.max_amount - usage.cumulative_used,
            daily_limit: grant.daily_limit,
            daily_used: usage.daily_used,
            transaction_limit: grant.transaction_limit,
            transaction_count: usage.transaction_count,
            remaining_transactions,
            expiry: Some(grant.expiry),
            risk_tolerance: Some(grant.risk_tolerance),
            allowed_pools: grant.allowed_pools,
        }
    }
}

/// Scoring service over externally supplied market snapshots
pub struct RebalanceService {
    config: EngineConfig,
    scorer: RebalanceScorer,
    optimizer: RebalanceOptimizer,
    metrics: Arc<dyn MetricsSource>,
}

impl RebalanceService {
    pub fn new(metrics: Arc<dyn MetricsSource>, config: EngineConfig) -> Self {
        Self {
            scorer: RebalanceScorer::new(&config),
            optimizer: RebalanceOptimizer::new(&config),
            config,
            metrics,
        }
    }

    /// Score a single source→target move for the given position
    pub fn score(
        &self,
        source: &PoolMetrics,
        target: &PoolMetrics,
        position: &UserPosition,
    ) -> Option<RebalanceAction> {
        self.scorer.score(source, target, position)
    }

    /// Order candidates by gain × confidence and truncate to `limit`
    pub fn rank(&self, candidates: &[RebalanceAction], limit: usize) -> Vec<RebalanceAction> {
        ranker::rank(candidates, limit)
    }

    /// Fetch metrics for the given pools, scan the user's positions and
    /// return the ranked viable candidates
    pub async fn analyze(
        &self,
        positions: &[UserPosition],
        pool_ids: &[String],
    ) -> Result<Vec<RebalanceAction>, EngineError> {
        let pools = self.metrics.fetch_pool_metrics(pool_ids).await?;
        let candidates = self.optimizer.collect_candidates(&pools, positions);
        info!(
            pools = pools.len(),
            positions = positions.len(),
            candidates = candidates.len(),
            "Rebalance analysis complete"
        );
        Ok(ranker::rank(&candidates, self.config.recommendation_limit))
    }

    /// The single best candidate above the confidence threshold, if any
    pub async fn find_optimal(
        &self,
        positions: &[UserPosition],
        pool_ids: &[String],
    ) -> Result<Option<RebalanceAction>, EngineError> {
        let pools = self.metrics.fetch_pool_metrics(pool_ids).await?;
        Ok(self.optimizer.find_optimal_rebalance(&pools, positions))
    }
}
