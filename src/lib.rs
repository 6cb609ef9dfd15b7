//! Chanscout - channel discovery and ranking with AI enrichment.
//!
//! Given a free-text query, the engine discovers candidate public
//! communities through several independent retrieval strategies, merges
//! and deduplicates them by entity identity, ranks them by relevance,
//! and optionally enriches the top candidates with activity metrics and
//! an AI-generated quality assessment.
//!
//! Discovery is best-effort against a third-party search surface: a
//! flaky external dependency degrades result quality, never availability.

pub mod cli;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod models;
pub mod report;
pub mod search;
pub mod surface;

pub use engine::{DiscoveryEngine, EngineConfig, EngineStats};
pub use error::EngineError;
pub use models::{
    DiscoverOptions, EnrichedCandidate, EntityKind, KindFilter, SearchCandidate,
};
