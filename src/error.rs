//! Error taxonomy for the discovery engine.
//!
//! Only [`EngineError::InvalidOptions`] is a hard, caller-visible failure.
//! Every other variant is absorbed at a component boundary and represented
//! as data: an empty list, zero-sample metrics, or an error-flagged
//! assessment. A query that finds nothing returns `Ok(vec![])`.

use thiserror::Error;

/// Caller-visible engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A caller-supplied option value is invalid (e.g. zero limit).
    #[error("invalid search options: {0}")]
    InvalidOptions(String),
}

/// Failures of the outbound entity-search surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("search surface unavailable: {0}")]
    Unavailable(String),

    #[error("search surface request timed out after {0}s")]
    Timeout(u64),

    /// The surface answered, but with something we cannot interpret.
    #[error("search surface protocol error: {0}")]
    Protocol(String),
}

/// A whole retrieval strategy failed for one query variant.
///
/// Caught by the aggregator; never aborts the remaining strategies.
#[derive(Debug, Error)]
#[error("strategy `{strategy}` unavailable: {source}")]
pub struct StrategyError {
    pub strategy: &'static str,
    #[source]
    pub source: SurfaceError,
}

/// The recent-content sample for one candidate could not be fetched.
///
/// Distinct from the zero-sample case, which is a success.
#[derive(Debug, Error)]
#[error("content sample unavailable: {0}")]
pub struct MetricsError(#[from] pub SurfaceError);

/// Failures of the outbound text-inference surface.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("inference request timed out after {0}s")]
    Timeout(u64),

    #[error("inference service returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Why an assessment fell back to the error-flagged default.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("unparsable assessment payload: {0}")]
    Parse(String),
}
