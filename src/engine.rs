//! The discovery engine: the library's inbound boundary.
//!
//! Ties the pipeline together: cache check, fan-out aggregation, ranking,
//! optional enrichment. Both caches are owned by the engine instance with
//! documented lifecycle - created with the engine, cleared on demand,
//! no global singletons.

use crate::enrich::{sort_by_quality, Enricher, QualityAssessor};
use crate::enrich::metrics::MetricsCollector;
use crate::error::EngineError;
use crate::models::{DiscoverOptions, EnrichedCandidate, SearchCandidate};
use crate::search::{
    default_strategies, rank, Aggregator, SynonymTable, TtlCache, RANKING_VERSION,
};
use crate::surface::{EntitySearch, TextInference};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Engine-level settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Curated directory handles scanned by the catalog strategy.
    pub catalogs: Vec<String>,
    /// TTL of the ranked-result cache.
    pub result_ttl: Duration,
    /// TTL of the enrichment-result cache.
    pub enrichment_ttl: Duration,
    /// Inter-item delay in the enrichment loop.
    pub enrichment_delay: Duration,
    /// Recent items sampled per candidate during enrichment.
    pub sample_limit: usize,
    /// Show a progress bar while enriching.
    pub show_progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalogs: default_catalogs(),
            result_ttl: Duration::from_secs(30 * 60),
            enrichment_ttl: Duration::from_secs(6 * 3600),
            enrichment_delay: Duration::from_millis(1500),
            sample_limit: 50,
            show_progress: false,
        }
    }
}

/// Directory entities known to post channel collections.
pub fn default_catalogs() -> Vec<String> {
    ["@durov", "@telegram", "@rian_ru", "@rbc_news"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Cache occupancy counters, for diagnostics.
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub cached_searches: usize,
    pub cached_enrichments: usize,
}

/// Channel discovery and ranking engine with an AI enrichment pipeline.
pub struct DiscoveryEngine {
    aggregator: Aggregator,
    enricher: Enricher,
    result_cache: TtlCache<Vec<SearchCandidate>>,
}

impl DiscoveryEngine {
    /// Build an engine with default settings over the given surfaces.
    pub fn new(surface: Arc<dyn EntitySearch>, inference: Arc<dyn TextInference>) -> Self {
        Self::with_config(surface, inference, EngineConfig::default())
    }

    pub fn with_config(
        surface: Arc<dyn EntitySearch>,
        inference: Arc<dyn TextInference>,
        config: EngineConfig,
    ) -> Self {
        let aggregator = Aggregator::new(
            default_strategies(Arc::clone(&surface), config.catalogs.clone()),
            SynonymTable::built_in(),
        );
        let enricher = Enricher::new(
            MetricsCollector::new(surface).with_sample_limit(config.sample_limit),
            QualityAssessor::new(inference),
        )
        .with_delay(config.enrichment_delay)
        .with_cache_ttl(config.enrichment_ttl)
        .with_progress(config.show_progress);

        Self::from_parts(aggregator, enricher, config.result_ttl)
    }

    /// Assemble an engine from explicit parts (used by tests and by
    /// consumers with custom strategy sets).
    pub fn from_parts(aggregator: Aggregator, enricher: Enricher, result_ttl: Duration) -> Self {
        Self {
            aggregator,
            enricher,
            result_cache: TtlCache::new(result_ttl),
        }
    }

    /// Discover communities matching a free-text query.
    ///
    /// Zero candidates is a valid terminal state, returned as an empty
    /// list. Only invalid options produce an error.
    pub async fn discover(
        &self,
        query: &str,
        opts: &DiscoverOptions,
    ) -> Result<Vec<EnrichedCandidate>, EngineError> {
        validate_options(opts)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::InvalidOptions(
                "query must not be empty".to_string(),
            ));
        }

        let cache_key = search_cache_key(query, opts);
        let cached = if opts.use_cache {
            self.result_cache.get(&cache_key)
        } else {
            None
        };

        let ranked = match cached {
            Some(hit) => {
                debug!("result cache hit for \"{}\"", query);
                hit
            }
            None => {
                let merged = self.aggregator.comprehensive_search(query, opts).await;
                let mut ranked = rank(merged, query);
                ranked.truncate(opts.limit);
                if opts.use_cache {
                    self.result_cache.put(cache_key, ranked.clone());
                }
                ranked
            }
        };

        if ranked.is_empty() {
            info!("no candidates found for \"{}\"", query);
            return Ok(Vec::new());
        }

        let mut results = if opts.enrich {
            self.enricher.enrich(ranked, opts.analysis_limit).await
        } else {
            ranked
                .into_iter()
                .map(EnrichedCandidate::passthrough)
                .collect()
        };

        if opts.sort_by_quality {
            sort_by_quality(&mut results);
        }

        Ok(results)
    }

    /// Drop both caches immediately.
    pub fn clear_caches(&self) {
        self.result_cache.clear();
        self.enricher.clear_cache();
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cached_searches: self.result_cache.len(),
            cached_enrichments: self.enricher.cached_results(),
        }
    }
}

/// Reject invalid caller-supplied options - the only hard failure class.
fn validate_options(opts: &DiscoverOptions) -> Result<(), EngineError> {
    if opts.limit == 0 {
        return Err(EngineError::InvalidOptions(
            "limit must be at least 1".to_string(),
        ));
    }
    if opts.timeout.is_zero() {
        return Err(EngineError::InvalidOptions(
            "timeout must be non-zero".to_string(),
        ));
    }
    if opts.enrich && opts.analysis_limit == 0 {
        return Err(EngineError::InvalidOptions(
            "analysis limit must be at least 1 when enrichment is on".to_string(),
        ));
    }
    Ok(())
}

/// Deterministic cache key: canonical serialization of the query and the
/// option fields that shape the result, in fixed order. Embeds the
/// ranking version so a policy change invalidates old entries.
fn search_cache_key(query: &str, opts: &DiscoverOptions) -> String {
    format!(
        "v{}|q={}|kind={}|min={}|verified={}|category={}|limit={}",
        RANKING_VERSION,
        query.to_lowercase(),
        opts.kind,
        opts.min_participants,
        opts.verified_only,
        opts.category.as_deref().unwrap_or(""),
        opts.limit
    )
}
