//! Candidate discovery: query expansion, retrieval strategies,
//! aggregation, ranking, and the result cache.

pub mod aggregator;
pub mod cache;
pub mod classify;
pub mod expander;
pub mod ranker;
pub mod strategies;

pub use aggregator::Aggregator;
pub use cache::TtlCache;
pub use classify::classify;
pub use expander::{QueryVariant, SynonymTable, VariantOrigin};
pub use ranker::{rank, relevance_score, RANKING_VERSION};
pub use strategies::{default_strategies, RetrievalStrategy, StrategyLimits};
