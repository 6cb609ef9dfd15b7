//! Candidate enrichment: activity metrics and AI quality assessment.

pub mod assessor;
pub mod metrics;
pub mod orchestrator;

pub use assessor::{build_assessment_prompt, parse_assessment, QualityAssessor};
pub use metrics::{compute_metrics, select_excerpts, MetricsCollector};
pub use orchestrator::{sort_by_quality, Enricher};
