//! Delegation grant cache with TTL and single-flight refetch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::infrastructure::grant_source::GrantSource;
use crate::shared::errors::GrantError;
use crate::shared::types::DelegationGrant;

struct CacheEntry {
    grant: DelegationGrant,
    fetched_at: Instant,
}

/// Caches the most recently fetched active grant per user.
///
/// The TTL is a soft consistency bound: a grant revoked externally may be
/// honored for up to the TTL window unless `invalidate` is called. Absence
/// of an active grant is never cached, so a freshly created grant is picked
/// up on the next lookup.
pub struct GrantCache {
    source: Arc<dyn GrantSource>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GrantCache {
    pub fn new(source: Arc<dyn GrantSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the user's active grant, fetching from the authorization
    /// source on a miss or stale entry. Concurrent misses for the same user
    /// share a single fetch.
    pub async fn get_grant(&self, user: &str) -> Result<Option<DelegationGrant>, GrantError> {
        if let Some(grant) = self.fresh_entry(user).await {
            debug!(user, "Grant cache hit");
            return Ok(Some(grant));
        }

        let flight = self.flight_lock(user).await;
        let _guard = flight.lock().await;

        // Another caller may have completed the fetch while we waited
        if let Some(grant) = self.fresh_entry(user).await {
            debug!(user, "Grant cache hit after in-flight fetch");
            return Ok(Some(grant));
        }

        let grants = self.source.fetch_grants(user).await?;
        let selected = grants
            .into_iter()
            .max_by_key(|g| g.issued_at);

        match selected {
            Some(grant) => {
                let mut entries = self.entries.write().await;
                entries.insert(
                    user.to_string(),
                    CacheEntry {
                        grant: grant.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(Some(grant))
            }
            None => {
                debug!(user, "No active grant found");
                Ok(None)
            }
        }
    }

    /// Drop a single user's cached grant, forcing the next lookup to refetch
    pub async fn invalidate(&self, user: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(user).is_some() {
            warn!(user, "Grant cache entry invalidated");
        }
    }

    /// Drop every cached grant
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    async fn fresh_entry(&self, user: &str) -> Option<DelegationGrant> {
        let entries = self.entries.read().await;
        entries.get(user).and_then(|entry| {
            if entry.fetched_at.elapsed() < self.ttl {
                Some(entry.grant.clone())
            } else {
                None
            }
        })
    }

    async fn flight_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut flights = self.in_flight.lock().await;
        flights
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
