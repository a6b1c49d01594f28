//! Infrastructure layer - collaborator interfaces and HTTP-backed implementations

pub mod grant_source;
pub mod metrics_source;
pub mod audit;

pub use audit::{AuditSink, HttpAuditSink, NoopAuditSink};
pub use grant_source::{GrantSource, HttpGrantSource};
pub use metrics_source::{HttpMetricsSource, MetricsSource};
