//! Portfolio-level metrics and advisory output

pub mod metrics;
pub mod advisor;

pub use advisor::{recommendations, Priority, Recommendation, RecommendationKind};
pub use metrics::{portfolio_metrics, PortfolioMetrics};
