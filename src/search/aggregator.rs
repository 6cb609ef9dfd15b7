//! Parallel fan-out aggregation across retrieval strategies.
//!
//! Every enabled strategy runs against every query variant concurrently,
//! racing a single overall deadline. Completions are merged one at a time
//! in the drain loop, keyed by canonical entity identity; `found_by` tags
//! accumulate across contributors. A strategy failure is a logged
//! diagnostic, never a call failure.

use crate::models::{canonical_entity_id, DiscoverOptions, EntityKind, SearchCandidate};
use crate::search::classify::classify;
use crate::search::expander::{QueryVariant, SynonymTable, VariantOrigin};
use crate::search::strategies::{RetrievalStrategy, StrategyLimits};
use crate::surface::RawEntity;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalize a raw surface record into a candidate, or skip it.
///
/// Returns `None` for records without a usable id/title; the `found_by`
/// set starts empty and is filled during the merge.
pub fn candidate_from_raw(entity: &RawEntity) -> Option<SearchCandidate> {
    let id = canonical_entity_id(entity.id.as_deref()?);
    if id.is_empty() {
        return None;
    }
    let title = entity
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let handle = entity.handle.clone().filter(|h| !h.is_empty());
    let kind = if entity.broadcast {
        EntityKind::Channel
    } else {
        EntityKind::Group
    };
    let category = classify(&title, entity.about.as_deref());
    let link = handle.as_ref().map(|h| format!("https://t.me/{}", h));

    Some(SearchCandidate {
        id,
        title,
        handle,
        kind,
        participant_count: entity.participant_count.unwrap_or(0),
        description: entity.about.clone(),
        verified: entity.verified,
        category,
        link,
        found_by: BTreeSet::new(),
    })
}

/// Fans out to all enabled strategies and merges their results.
pub struct Aggregator {
    strategies: Vec<Arc<dyn RetrievalStrategy>>,
    synonyms: SynonymTable,
    limits: StrategyLimits,
}

impl Aggregator {
    pub fn new(strategies: Vec<Arc<dyn RetrievalStrategy>>, synonyms: SynonymTable) -> Self {
        Self {
            strategies,
            synonyms,
            limits: StrategyLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: StrategyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run every strategy against every query variant, merge and
    /// deduplicate. The returned list is unordered; ranking is a
    /// separate pass.
    pub async fn comprehensive_search(
        &self,
        query: &str,
        opts: &DiscoverOptions,
    ) -> Vec<SearchCandidate> {
        let variants = self.synonyms.expand(query);
        debug!(
            "fanning out {} strategies x {} variants for \"{}\"",
            self.strategies.len(),
            variants.len(),
            query
        );

        let mut pending = FuturesUnordered::new();
        for strategy in &self.strategies {
            for variant in &variants {
                let strategy = Arc::clone(strategy);
                let variant = variant.clone();
                let limits = self.limits.clone();
                pending.push(async move {
                    let outcome = strategy.search(&variant.text, &limits).await;
                    (strategy.tag(), variant, outcome)
                });
            }
        }

        let deadline = tokio::time::Instant::now() + opts.timeout;
        let mut merged: HashMap<String, SearchCandidate> = HashMap::new();
        let mut timed_out = false;

        // Drain completions until done or the deadline hits. Merging only
        // happens here, on one task, so no two contributors ever write the
        // same entry concurrently.
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((tag, variant, Ok(entities)))) => {
                    merge_results(&mut merged, entities, tag, &variant, opts);
                }
                Ok(Some((_, variant, Err(e)))) => {
                    warn!("{} (variant \"{}\"); continuing without it", e, variant.text);
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            }
        }

        if timed_out {
            // outstanding calls are abandoned; their results are discarded
            warn!(
                "aggregation deadline {:?} hit for \"{}\"; returning partial merge of {} candidates",
                opts.timeout,
                query,
                merged.len()
            );
        }

        merged.into_values().collect()
    }
}

fn merge_results(
    merged: &mut HashMap<String, SearchCandidate>,
    entities: Vec<RawEntity>,
    tag: &'static str,
    variant: &QueryVariant,
    opts: &DiscoverOptions,
) {
    let found_tag = match variant.origin {
        VariantOrigin::Original => tag.to_string(),
        _ => format!("{}:{}", tag, variant.text),
    };

    for entity in &entities {
        let Some(mut candidate) = candidate_from_raw(entity) else {
            continue;
        };
        if !admits(&candidate, opts) {
            continue;
        }

        match merged.entry(candidate.id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().found_by.insert(found_tag.clone());
            }
            Entry::Vacant(slot) => {
                candidate.found_by.insert(found_tag.clone());
                slot.insert(candidate);
            }
        }
    }
}

/// Hard filters applied before a candidate is admitted to the merge.
fn admits(candidate: &SearchCandidate, opts: &DiscoverOptions) -> bool {
    if !opts.kind.admits(candidate.kind) {
        return false;
    }
    if candidate.participant_count < opts.min_participants {
        return false;
    }
    if opts.verified_only && !candidate.verified {
        return false;
    }
    if let Some(ref category) = opts.category {
        if &candidate.category != category {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KindFilter;
    use crate::search::strategies::{ContactSearch, DirectSearch};
    use crate::surface::mock::{entity, MockSurface};
    use std::time::Duration;

    fn options() -> DiscoverOptions {
        DiscoverOptions {
            timeout: Duration::from_secs(5),
            ..DiscoverOptions::default()
        }
    }

    fn two_strategy_aggregator(surface: Arc<MockSurface>) -> Aggregator {
        let strategies: Vec<Arc<dyn RetrievalStrategy>> = vec![
            Arc::new(DirectSearch::new(surface.clone())),
            Arc::new(ContactSearch::new(surface)),
        ];
        Aggregator::new(strategies, SynonymTable::empty())
    }

    #[tokio::test]
    async fn test_dedup_unions_found_by_tags() {
        // both strategies return the same entity
        let shared = entity("1001", "Crypto News", Some("cryptonews"), 5000, true);
        let surface = Arc::new(MockSurface {
            entities: vec![shared.clone()],
            contacts: vec![shared],
            ..MockSurface::default()
        });

        let results = two_strategy_aggregator(surface)
            .comprehensive_search("crypto", &options())
            .await;

        assert_eq!(results.len(), 1);
        let tags: Vec<&str> = results[0].found_by.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["contacts", "direct"]);
    }

    #[tokio::test]
    async fn test_identity_merge_across_id_shapes() {
        // the same entity reported with chat-style and channel-style ids
        let surface = Arc::new(MockSurface {
            entities: vec![entity("1001", "Crypto News", None, 5000, false)],
            contacts: vec![entity("-1001001", "Crypto News", None, 5000, false)],
            ..MockSurface::default()
        });

        let results = two_strategy_aggregator(surface)
            .comprehensive_search("crypto", &options())
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1001");
        assert_eq!(results[0].found_by.len(), 2);
    }

    #[tokio::test]
    async fn test_one_failing_strategy_does_not_affect_others() {
        let healthy = vec![
            entity("1", "Crypto A", None, 100, false),
            entity("2", "Crypto B", None, 200, false),
        ];

        let broken = Arc::new(MockSurface {
            fail_entities: true, // direct search fails entirely
            contacts: healthy.clone(),
            ..MockSurface::default()
        });
        let clean = Arc::new(MockSurface {
            contacts: healthy,
            ..MockSurface::default()
        });

        let mut with_failure = two_strategy_aggregator(broken)
            .comprehensive_search("crypto", &options())
            .await;
        let contacts_only = Aggregator::new(
            vec![Arc::new(ContactSearch::new(clean)) as Arc<dyn RetrievalStrategy>],
            SynonymTable::empty(),
        )
        .comprehensive_search("crypto", &options())
        .await;

        with_failure.sort_by(|a, b| a.id.cmp(&b.id));
        let mut expected_ids: Vec<&str> = contacts_only.iter().map(|c| c.id.as_str()).collect();
        expected_ids.sort();
        let got_ids: Vec<&str> = with_failure.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(got_ids, expected_ids);
    }

    #[tokio::test]
    async fn test_hard_filters_applied_before_admission() {
        let mut group = entity("3", "Crypto chat", None, 50, false);
        group.broadcast = false;

        let surface = Arc::new(MockSurface {
            entities: vec![
                entity("1", "Crypto big", None, 5000, true),
                entity("2", "Crypto small", None, 10, false),
                group,
            ],
            ..MockSurface::default()
        });

        let opts = DiscoverOptions {
            kind: KindFilter::Channel,
            min_participants: 100,
            ..options()
        };

        let strategies: Vec<Arc<dyn RetrievalStrategy>> =
            vec![Arc::new(DirectSearch::new(surface))];
        let results = Aggregator::new(strategies, SynonymTable::empty())
            .comprehensive_search("crypto", &opts)
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");
    }

    #[tokio::test]
    async fn test_variant_tags_carry_variant_text() {
        let surface = Arc::new(MockSurface {
            entities: vec![entity("1", "Games hub", None, 100, false)],
            ..MockSurface::default()
        });

        let strategies: Vec<Arc<dyn RetrievalStrategy>> =
            vec![Arc::new(DirectSearch::new(surface))];
        let synonyms = SynonymTable::empty().with("игры", ["games"]);
        let results = Aggregator::new(strategies, synonyms)
            .comprehensive_search("игры", &options())
            .await;

        assert_eq!(results.len(), 1);
        let tags: Vec<&str> = results[0].found_by.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["direct", "direct:games"]);
    }

    #[test]
    fn test_candidate_from_raw_defaults() {
        let raw = entity("-1007777", "Crypto Talk", Some("cryptotalk"), 0, false);
        let candidate = candidate_from_raw(&raw).unwrap();
        assert_eq!(candidate.id, "7777");
        assert_eq!(candidate.link.as_deref(), Some("https://t.me/cryptotalk"));
        assert_eq!(candidate.category, "crypto");
        assert!(candidate.found_by.is_empty());

        assert!(candidate_from_raw(&RawEntity::default()).is_none());
    }
}
