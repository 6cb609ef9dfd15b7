//! Relevance scoring and ordering.
//!
//! Computable from a [`SearchCandidate`] alone - no enrichment signal -
//! so ranking runs before any enrichment cost is paid.

use crate::models::SearchCandidate;
use std::cmp::Ordering;

/// Bumped whenever the scoring policy changes, to invalidate cached
/// ranked results (the cache key embeds it).
pub const RANKING_VERSION: u32 = 1;

/// Relevance of one candidate to the original query.
///
/// Handle match dominates, then title prefix, then title substring, plus
/// a diminishing-returns popularity bonus and a verification bonus.
pub fn relevance_score(candidate: &SearchCandidate, query: &str) -> f64 {
    let needle = query.to_lowercase();
    let mut score = 0.0;

    if let Some(ref handle) = candidate.handle {
        if handle.to_lowercase().contains(&needle) {
            score += 100.0;
        }
    }

    let title = candidate.title.to_lowercase();
    if title.starts_with(&needle) {
        score += 50.0;
    }
    if title.contains(&needle) {
        score += 25.0;
    }

    score += ((candidate.participant_count + 1) as f64).log10();

    if candidate.verified {
        score += 10.0;
    }

    score
}

/// Order candidates by descending relevance.
///
/// Ties break on candidate id, so identical input always produces
/// identical order.
pub fn rank(candidates: Vec<SearchCandidate>, query: &str) -> Vec<SearchCandidate> {
    let mut scored: Vec<(f64, SearchCandidate)> = candidates
        .into_iter()
        .map(|candidate| (relevance_score(&candidate, query), candidate))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.id.cmp(&b.1.id))
    });

    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
