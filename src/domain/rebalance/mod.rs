//! Rebalance scoring, ranking and candidate discovery

pub mod scorer;
pub mod ranker;
pub mod optimizer;

pub use optimizer::RebalanceOptimizer;
pub use ranker::rank;
pub use scorer::RebalanceScorer;
