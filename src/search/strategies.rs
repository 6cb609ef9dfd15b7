//! Retrieval strategies: independent ways of locating entities.
//!
//! Each strategy covers one retrieval surface. Per-item malformed records
//! are skipped inside the strategy; a whole-call failure propagates as
//! [`StrategyError`] for the aggregator to absorb, so one strategy's
//! outage never affects another's contribution.

use crate::error::StrategyError;
use crate::models::canonical_entity_id;
use crate::surface::{EntitySearch, RawEntity};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Bounds applied to a single strategy invocation.
#[derive(Debug, Clone)]
pub struct StrategyLimits {
    /// Maximum results requested per surface call.
    pub results_per_call: usize,
    /// How many recent catalog posts to scan for mentions.
    pub catalog_scan_depth: usize,
}

impl Default for StrategyLimits {
    fn default() -> Self {
        Self {
            results_per_call: 50,
            catalog_scan_depth: 30,
        }
    }
}

/// One independent method of locating entities matching a query.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Short tag recorded in `found_by` for results this strategy surfaces.
    fn tag(&self) -> &'static str;

    async fn search(
        &self,
        query: &str,
        limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError>;
}

fn usable(entities: Vec<RawEntity>) -> Vec<RawEntity> {
    entities.into_iter().filter(RawEntity::is_usable).collect()
}

/// Exact/fuzzy match against entity titles and handles.
pub struct DirectSearch {
    surface: Arc<dyn EntitySearch>,
}

impl DirectSearch {
    pub fn new(surface: Arc<dyn EntitySearch>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl RetrievalStrategy for DirectSearch {
    fn tag(&self) -> &'static str {
        "direct"
    }

    async fn search(
        &self,
        query: &str,
        limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError> {
        let entities = self
            .surface
            .search_entities(query, limits.results_per_call)
            .await
            .map_err(|source| StrategyError {
                strategy: self.tag(),
                source,
            })?;
        Ok(usable(entities))
    }
}

/// Search scoped to the resolvable-contacts surface.
pub struct ContactSearch {
    surface: Arc<dyn EntitySearch>,
}

impl ContactSearch {
    pub fn new(surface: Arc<dyn EntitySearch>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl RetrievalStrategy for ContactSearch {
    fn tag(&self) -> &'static str {
        "contacts"
    }

    async fn search(
        &self,
        query: &str,
        limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError> {
        let entities = self
            .surface
            .search_contacts(query, limits.results_per_call)
            .await
            .map_err(|source| StrategyError {
                strategy: self.tag(),
                source,
            })?;
        Ok(usable(entities))
    }
}

/// Full-text search over message content, back-resolved to the owning
/// entities.
pub struct ContentSearch {
    surface: Arc<dyn EntitySearch>,
}

impl ContentSearch {
    pub fn new(surface: Arc<dyn EntitySearch>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl RetrievalStrategy for ContentSearch {
    fn tag(&self) -> &'static str {
        "content"
    }

    async fn search(
        &self,
        query: &str,
        limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError> {
        let page = self
            .surface
            .search_messages(query, limits.results_per_call)
            .await
            .map_err(|source| StrategyError {
                strategy: self.tag(),
                source,
            })?;

        // only keep entities actually referenced by a matched message
        let mentioned: HashSet<String> = page
            .messages
            .iter()
            .filter_map(|m| m.peer_id.as_deref())
            .map(canonical_entity_id)
            .collect();

        Ok(usable(page.entities)
            .into_iter()
            .filter(|entity| {
                entity
                    .id
                    .as_deref()
                    .map(canonical_entity_id)
                    .is_some_and(|id| mentioned.contains(&id))
            })
            .collect())
    }
}

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:@|t\.me/|telegram\.me/)([A-Za-z0-9_]+)").expect("valid mention pattern")
});

/// Extract handle-like tokens (`@name`, `t.me/name`, `telegram.me/name`)
/// from a post text. Tokens of four characters or fewer are dropped, as
/// are case-insensitive duplicates.
pub fn extract_handle_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for capture in MENTION_RE.captures_iter(text) {
        let name = &capture[1];
        if name.len() > 3 && seen.insert(name.to_lowercase()) {
            mentions.push(name.to_string());
        }
    }

    mentions
}

/// Scan a fixed set of curated directory entities for mentioned handles.
pub struct CatalogSearch {
    surface: Arc<dyn EntitySearch>,
    catalogs: Vec<String>,
}

impl CatalogSearch {
    pub fn new(surface: Arc<dyn EntitySearch>, catalogs: Vec<String>) -> Self {
        Self { surface, catalogs }
    }
}

#[async_trait]
impl RetrievalStrategy for CatalogSearch {
    fn tag(&self) -> &'static str {
        "catalogs"
    }

    async fn search(
        &self,
        query: &str,
        limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for catalog in &self.catalogs {
            let handle = catalog.trim_start_matches('@');
            let catalog_entity = match self.surface.resolve_handle(handle).await {
                Ok(Some(entity)) => entity,
                Ok(None) => {
                    debug!("catalog @{} not found", handle);
                    continue;
                }
                Err(e) => {
                    debug!("catalog @{} unavailable: {}", handle, e);
                    continue;
                }
            };

            let Some(catalog_ref) = catalog_entity.handle.clone().or(catalog_entity.id.clone())
            else {
                continue;
            };

            let messages = match self
                .surface
                .recent_messages(&catalog_ref, limits.catalog_scan_depth)
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    debug!("catalog @{} content unavailable: {}", handle, e);
                    continue;
                }
            };

            for message in &messages {
                let Some(text) = message.text.as_deref() else {
                    continue;
                };
                if !text.to_lowercase().contains(&needle) {
                    continue;
                }

                for mention in extract_handle_mentions(text) {
                    match self.surface.resolve_handle(&mention).await {
                        Ok(Some(entity)) if entity.is_usable() => results.push(entity),
                        Ok(_) => {}
                        Err(e) => debug!("mention @{} unresolvable: {}", mention, e),
                    }
                }
            }
        }

        Ok(results)
    }
}

/// Expand the top direct hits into their similar/related entities.
pub struct RelatedSearch {
    surface: Arc<dyn EntitySearch>,
}

impl RelatedSearch {
    pub fn new(surface: Arc<dyn EntitySearch>) -> Self {
        Self { surface }
    }

    /// How many direct hits seed the expansion.
    const SEEDS: usize = 5;
    /// Related entities requested per seed.
    const PER_SEED: usize = 5;
}

#[async_trait]
impl RetrievalStrategy for RelatedSearch {
    fn tag(&self) -> &'static str {
        "related"
    }

    async fn search(
        &self,
        query: &str,
        _limits: &StrategyLimits,
    ) -> Result<Vec<RawEntity>, StrategyError> {
        let seeds = self
            .surface
            .search_entities(query, Self::SEEDS * 2)
            .await
            .map_err(|source| StrategyError {
                strategy: self.tag(),
                source,
            })?;

        let mut results = Vec::new();
        for seed in usable(seeds).into_iter().take(Self::SEEDS) {
            let Some(id) = seed.id.as_deref() else {
                continue;
            };
            match self.surface.similar_entities(id, Self::PER_SEED).await {
                Ok(similar) => results.extend(usable(similar)),
                Err(e) => {
                    debug!("related lookup for {} failed: {}", id, e);
                    continue;
                }
            }
        }

        Ok(results)
    }
}

/// The full default strategy set over one shared surface.
pub fn default_strategies(
    surface: Arc<dyn EntitySearch>,
    catalogs: Vec<String>,
) -> Vec<Arc<dyn RetrievalStrategy>> {
    vec![
        Arc::new(DirectSearch::new(Arc::clone(&surface))),
        Arc::new(ContactSearch::new(Arc::clone(&surface))),
        Arc::new(ContentSearch::new(Arc::clone(&surface))),
        Arc::new(CatalogSearch::new(Arc::clone(&surface), catalogs)),
        Arc::new(RelatedSearch::new(surface)),
    ]
}
