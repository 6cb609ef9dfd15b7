//! Sequential, throttled enrichment of ranked candidates.
//!
//! Candidates are processed strictly in ranked order up to the analysis
//! limit; the rest pass through unenriched, in place. One candidate's
//! failure degrades that candidate only - the batch never aborts and the
//! order never changes. An inter-item delay keeps the external surfaces
//! inside their rate limits.

use crate::enrich::assessor::QualityAssessor;
use crate::enrich::metrics::{compute_metrics, select_excerpts, MetricsCollector};
use crate::models::{ActivityMetrics, EnrichedCandidate, SearchCandidate};
use crate::search::cache::TtlCache;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

/// Orchestrates metrics collection and AI assessment per candidate.
pub struct Enricher {
    collector: MetricsCollector,
    assessor: QualityAssessor,
    cache: TtlCache<EnrichedCandidate>,
    delay: Duration,
    show_progress: bool,
}

impl Enricher {
    pub fn new(collector: MetricsCollector, assessor: QualityAssessor) -> Self {
        Self {
            collector,
            assessor,
            cache: TtlCache::new(Duration::from_secs(6 * 3600)),
            delay: Duration::from_millis(1500),
            show_progress: false,
        }
    }

    /// Override the inter-item delay (zero disables throttling).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TtlCache::new(ttl);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Enrich the first `analysis_limit` candidates, pass the rest
    /// through. The returned list preserves the input order exactly.
    pub async fn enrich(
        &self,
        ranked: Vec<SearchCandidate>,
        analysis_limit: usize,
    ) -> Vec<EnrichedCandidate> {
        let to_analyze = ranked.len().min(analysis_limit);
        let progress = self.progress_bar(to_analyze);

        let mut results = Vec::with_capacity(ranked.len());
        let mut throttle_next = false;

        for (index, candidate) in ranked.into_iter().enumerate() {
            if index >= analysis_limit {
                results.push(EnrichedCandidate::passthrough(candidate));
                continue;
            }

            let key = enrichment_cache_key(&candidate);
            if let Some(hit) = self.cache.get(&key) {
                debug!("enrichment cache hit for \"{}\"", candidate.title);
                results.push(hit);
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
                continue;
            }

            // only live calls need spacing; cache hits cost nothing remote
            if throttle_next && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if let Some(ref pb) = progress {
                pb.set_message(candidate.title.clone());
            }

            let enriched = self.enrich_one(candidate).await;
            self.cache.put(key, enriched.clone());
            results.push(enriched);
            throttle_next = true;

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        results
    }

    async fn enrich_one(&self, candidate: SearchCandidate) -> EnrichedCandidate {
        let (metrics, samples) = match self.collector.sample(&candidate).await {
            Ok(messages) => (
                compute_metrics(&candidate, &messages),
                select_excerpts(&messages),
            ),
            Err(e) => {
                warn!("metrics unavailable for \"{}\": {}", candidate.title, e);
                (
                    ActivityMetrics::insufficient(candidate.participant_count),
                    Vec::new(),
                )
            }
        };

        let assessment = self.assessor.assess(&candidate, &metrics, &samples).await;

        EnrichedCandidate {
            candidate,
            metrics: Some(metrics),
            assessment: Some(assessment),
            analyzed_at: Some(Utc::now()),
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    }
}

/// Enrichment cache key: identity plus title, tolerating identity churn.
fn enrichment_cache_key(candidate: &SearchCandidate) -> String {
    format!("{}:{}", candidate.id, candidate.title)
}

/// Secondary, opt-in ordering: assessed quality first, then subscribers.
///
/// Distinct from the relevance ranker; unassessed candidates sort as
/// zero-quality.
pub fn sort_by_quality(results: &mut [EnrichedCandidate]) {
    results.sort_by(|a, b| {
        let quality_a = a.assessment.as_ref().map_or(0.0, |x| x.quality_score);
        let quality_b = b.assessment.as_ref().map_or(0.0, |x| x.quality_score);

        quality_b
            .partial_cmp(&quality_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.candidate
                    .participant_count
                    .cmp(&a.candidate.participant_count)
            })
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
}
