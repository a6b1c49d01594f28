//! Per-user usage accounting for delegated executions

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::shared::types::UsageEntry;

/// Tracks cumulative, daily and transaction-count usage per user.
///
/// Entries sit behind a per-user mutex so that two confirmed executions for
/// the same user serialize their increments, while users never block each
/// other. Mutated only after a confirmed successful execution.
pub struct UsageLedger {
    entries: RwLock<HashMap<String, Arc<Mutex<UsageEntry>>>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn entry_for(&self, user: &str) -> Arc<Mutex<UsageEntry>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(user) {
                return entry.clone();
            }
        }
        let mut entries = self.entries.write().await;
        entries
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UsageEntry::default())))
            .clone()
    }

    /// Record a confirmed successful execution.
    /// Must be called exactly once per confirmation, never speculatively.
    pub async fn record_usage(&self, user: &str, amount: f64) {
        let entry = self.entry_for(user).await;
        let mut entry = entry.lock().await;
        entry.cumulative_used += amount;
        entry.daily_used += amount;
        entry.transaction_count += 1;
        debug!(
            user,
            amount,
            cumulative = entry.cumulative_used,
            tx_count = entry.transaction_count,
            "Recorded usage"
        );
    }

    /// Zero the daily figure only. Invoked by the external scheduler at the
    /// calendar day boundary.
    pub async fn reset_daily(&self, user: &str) {
        let entry = self.entry_for(user).await;
        let mut entry = entry.lock().await;
        entry.daily_used = 0.0;
        info!(user, "Reset daily usage");
    }

    /// Read-only copy of a user's totals; zeroed entry for unknown users
    pub async fn snapshot(&self, user: &str) -> UsageEntry {
        let entries = self.entries.read().await;
        match entries.get(user) {
            Some(entry) => entry.lock().await.clone(),
            None => UsageEntry::default(),
        }
    }
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new()
    }
}
