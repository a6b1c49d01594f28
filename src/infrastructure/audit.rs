//! Audit sink - fire-and-forget trail of delegated activity

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::shared::types::AuditEntry;

/// Fire-and-forget audit sink. Delivery failures are logged by the
/// implementation and never surfaced to the caller's result.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

/// HTTP-backed sink posting to `{base}/api/audit`
pub struct HttpAuditSink {
    base_url: String,
    client: Client,
}

impl HttpAuditSink {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl AuditSink for HttpAuditSink {
    async fn record(&self, entry: AuditEntry) {
        let url = format!("{}/api/audit", self.base_url);
        match self.client.post(&url).json(&entry).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), user = %entry.user, "Failed to log audit entry");
            }
            Err(e) => {
                warn!(error = %e, user = %entry.user, "Error delivering audit entry");
            }
            Ok(_) => {}
        }
    }
}

/// Sink that drops every entry; for embedders without an audit backend
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _entry: AuditEntry) {}
}
