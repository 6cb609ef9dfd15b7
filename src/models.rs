//! Data models for the discovery engine.
//!
//! This module contains all the core data structures used throughout
//! the application for representing candidates, metrics, and assessments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Kind of a discoverable community entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Broadcast channel - one-to-many posting
    Channel,
    /// Group chat - many-to-many conversation
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Channel => write!(f, "channel"),
            EntityKind::Group => write!(f, "group"),
        }
    }
}

/// Entity kind filter used by discovery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    /// Admit both channels and groups.
    #[default]
    All,
    /// Admit channels only.
    Channel,
    /// Admit groups only.
    Group,
}

impl KindFilter {
    /// Whether a candidate of the given kind passes this filter.
    pub fn admits(&self, kind: EntityKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Channel => kind == EntityKind::Channel,
            KindFilter::Group => kind == EntityKind::Group,
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindFilter::All => write!(f, "all"),
            KindFilter::Channel => write!(f, "channel"),
            KindFilter::Group => write!(f, "group"),
        }
    }
}

/// Normalize a platform entity identifier into its canonical form.
///
/// Channel-style identifiers arrive with a `-100` marker prefix while
/// chat-style identifiers are bare digits; both refer to the same entity.
/// This is the single place the transform lives - every merge and
/// comparison site goes through it. Identifiers that don't match the
/// known shape pass through unchanged.
pub fn canonical_entity_id(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("-100") {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return rest.to_string();
        }
    }
    raw.to_string()
}

/// One deduplicated community candidate produced by aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Canonical platform identifier (see [`canonical_entity_id`]).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Public handle, without the `@` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Channel or group.
    pub kind: EntityKind,
    /// Reported participant count (0 when the surface omits it).
    pub participant_count: u64,
    /// Entity description, if the surface provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Platform verification flag.
    pub verified: bool,
    /// Heuristic content category (see `search::classify`).
    pub category: String,
    /// Public join link, when a handle exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Every strategy/variant tag that surfaced this candidate.
    pub found_by: BTreeSet<String>,
}

impl SearchCandidate {
    /// Reference usable for content retrieval: handle when public,
    /// canonical id otherwise.
    pub fn entity_ref(&self) -> String {
        self.handle.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// Activity statistics computed from a bounded recent-content sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Subscriber/participant count at sampling time.
    pub subscriber_count: u64,
    /// Number of sampled items that carried text or media.
    ///
    /// Zero is the valid "insufficient data" state, not an error.
    pub posts_sampled: usize,
    pub avg_posts_per_day: f64,
    pub avg_views_per_post: u64,
    pub avg_reactions_per_post: u64,
    /// Mean text length in characters.
    pub avg_post_length: usize,
    /// Share of sampled items carrying media, rounded to whole percent.
    pub media_percent: u8,
    /// Share of sampled items that are forwards, rounded to whole percent.
    pub forward_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_post_at: Option<DateTime<Utc>>,
}

impl ActivityMetrics {
    /// The zero-sample state: nothing retrievable, all derived fields zero.
    pub fn insufficient(subscriber_count: u64) -> Self {
        Self {
            subscriber_count,
            ..Self::default()
        }
    }
}

/// Placeholder for string fields the assessment did not determine.
pub const UNDETERMINED: &str = "undetermined";

/// AI-generated quality assessment of one candidate.
///
/// When `error` is set every numeric field is zero and every string field
/// is a placeholder - the explicit fallback state, never a partial parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Overall quality, 0-10.
    pub quality_score: f64,
    /// One-line verdict.
    pub verdict: String,
    /// Content categories the assessor identified.
    pub categories: Vec<String>,
    /// Commercial orientation, 0-10.
    pub commercial_index: f64,
    /// Educational value, 0-10.
    pub educational_value: f64,
    /// Original / reposts / mixed.
    pub content_type: String,
    pub target_audience: String,
    pub warnings: Vec<String>,
    pub recommendation: String,
    /// Populated when the assessment could not be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QualityAssessment {
    /// The safe fallback produced on any transport or parse failure.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            quality_score: 0.0,
            verdict: "assessment unavailable".to_string(),
            categories: Vec::new(),
            commercial_index: 0.0,
            educational_value: 0.0,
            content_type: UNDETERMINED.to_string(),
            target_audience: UNDETERMINED.to_string(),
            warnings: Vec::new(),
            recommendation: UNDETERMINED.to_string(),
            error: Some(reason.into()),
        }
    }

    /// Whether this is the error-flagged fallback state.
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// A candidate with optional enrichment attached.
///
/// Candidates beyond the analysis limit pass through with all enrichment
/// fields `None`; serialization skips them, so unenriched exports carry
/// no enrichment keys at all. Never mutated after creation - re-analysis
/// produces a new instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: SearchCandidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ActivityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<QualityAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl EnrichedCandidate {
    /// Wrap a candidate that was not enriched.
    pub fn passthrough(candidate: SearchCandidate) -> Self {
        Self {
            candidate,
            metrics: None,
            assessment: None,
            analyzed_at: None,
        }
    }

    /// Whether enrichment ran for this candidate.
    pub fn is_enriched(&self) -> bool {
        self.analyzed_at.is_some()
    }
}

/// One content excerpt handed to the assessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSample {
    /// Excerpt text, truncated to a bounded length.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub views: u64,
}

/// Options recognized by [`crate::engine::DiscoveryEngine::discover`].
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    pub kind: KindFilter,
    pub min_participants: u64,
    pub verified_only: bool,
    /// Admit only candidates classified into this category.
    pub category: Option<String>,
    /// Maximum candidates returned after ranking.
    pub limit: usize,
    /// Run the enrichment pipeline over the top candidates.
    pub enrich: bool,
    /// How many ranked candidates to enrich; the rest pass through.
    pub analysis_limit: usize,
    /// Re-sort enriched results by assessed quality (secondary, opt-in).
    pub sort_by_quality: bool,
    /// Overall deadline for the retrieval fan-out.
    pub timeout: Duration,
    pub use_cache: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            kind: KindFilter::All,
            min_participants: 0,
            verified_only: false,
            category: None,
            limit: 50,
            enrich: false,
            analysis_limit: 10,
            sort_by_quality: false,
            timeout: Duration::from_secs(30),
            use_cache: true,
        }
    }
}

/// Summary statistics over the assessed portion of a result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentStats {
    pub total: usize,
    /// Candidates with a non-fallback assessment.
    pub analyzed: usize,
    /// Mean quality score across analyzed candidates, one decimal.
    pub avg_score: f64,
    /// Analyzed candidates scoring 7 or above.
    pub high_quality: usize,
    pub educational: usize,
    pub commercial: usize,
    pub with_warnings: usize,
}

impl AssessmentStats {
    /// Compute stats from an enriched result set.
    pub fn from_results(results: &[EnrichedCandidate]) -> Self {
        let assessed: Vec<&QualityAssessment> = results
            .iter()
            .filter_map(|r| r.assessment.as_ref())
            .filter(|a| !a.is_fallback())
            .collect();

        if assessed.is_empty() {
            return Self {
                total: results.len(),
                ..Self::default()
            };
        }

        let sum: f64 = assessed.iter().map(|a| a.quality_score).sum();
        let avg = sum / assessed.len() as f64;

        Self {
            total: results.len(),
            analyzed: assessed.len(),
            avg_score: (avg * 10.0).round() / 10.0,
            high_quality: assessed.iter().filter(|a| a.quality_score >= 7.0).count(),
            educational: assessed
                .iter()
                .filter(|a| a.educational_value >= 7.0)
                .count(),
            commercial: assessed
                .iter()
                .filter(|a| a.commercial_index >= 7.0)
                .count(),
            with_warnings: assessed.iter().filter(|a| !a.warnings.is_empty()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> SearchCandidate {
        SearchCandidate {
            id: id.to_string(),
            title: "Test".to_string(),
            handle: None,
            kind: EntityKind::Channel,
            participant_count: 100,
            description: None,
            verified: false,
            category: "general".to_string(),
            link: None,
            found_by: BTreeSet::new(),
        }
    }

    #[test]
    fn test_canonical_entity_id_strips_channel_prefix() {
        assert_eq!(canonical_entity_id("-1001234567890"), "1234567890");
        assert_eq!(canonical_entity_id("-1007"), "7");
    }

    #[test]
    fn test_canonical_entity_id_leaves_other_shapes_alone() {
        assert_eq!(canonical_entity_id("1234567890"), "1234567890");
        assert_eq!(canonical_entity_id("-100"), "-100");
        assert_eq!(canonical_entity_id("-100abc"), "-100abc");
        assert_eq!(canonical_entity_id("-200123"), "-200123");
    }

    #[test]
    fn test_kind_filter_admits() {
        assert!(KindFilter::All.admits(EntityKind::Channel));
        assert!(KindFilter::All.admits(EntityKind::Group));
        assert!(KindFilter::Channel.admits(EntityKind::Channel));
        assert!(!KindFilter::Channel.admits(EntityKind::Group));
        assert!(!KindFilter::Group.admits(EntityKind::Channel));
    }

    #[test]
    fn test_fallback_assessment_is_zeroed() {
        let fallback = QualityAssessment::fallback("connection refused");
        assert!(fallback.is_fallback());
        assert_eq!(fallback.quality_score, 0.0);
        assert_eq!(fallback.commercial_index, 0.0);
        assert_eq!(fallback.educational_value, 0.0);
        assert_eq!(fallback.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_entity_ref_prefers_handle() {
        let mut c = candidate("42");
        assert_eq!(c.entity_ref(), "42");
        c.handle = Some("cryptonews".to_string());
        assert_eq!(c.entity_ref(), "cryptonews");
    }

    #[test]
    fn test_passthrough_serializes_without_enrichment_fields() {
        let passthrough = EnrichedCandidate::passthrough(candidate("42"));
        assert!(!passthrough.is_enriched());

        let json = serde_json::to_value(&passthrough).unwrap();
        assert!(json.get("metrics").is_none());
        assert!(json.get("assessment").is_none());
        assert!(json.get("analyzed_at").is_none());
        assert_eq!(json["id"], "42");
    }

    #[test]
    fn test_assessment_stats() {
        let analyzed = QualityAssessment {
            quality_score: 8.0,
            educational_value: 9.0,
            warnings: vec!["ads".to_string()],
            error: None,
            ..QualityAssessment::fallback("")
        };

        let mut good = EnrichedCandidate::passthrough(candidate("1"));
        good.assessment = Some(analyzed);

        let failed = EnrichedCandidate {
            assessment: Some(QualityAssessment::fallback("boom")),
            ..EnrichedCandidate::passthrough(candidate("2"))
        };
        let plain = EnrichedCandidate::passthrough(candidate("3"));

        let stats = AssessmentStats::from_results(&[good, failed, plain]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.analyzed, 1);
        assert_eq!(stats.avg_score, 8.0);
        assert_eq!(stats.high_quality, 1);
        assert_eq!(stats.educational, 1);
        assert_eq!(stats.with_warnings, 1);
    }
}
