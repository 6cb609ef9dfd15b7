//! Activity metrics from a bounded recent-content sample.

use crate::error::MetricsError;
use crate::models::{ActivityMetrics, ContentSample, SearchCandidate};
use crate::surface::{EntitySearch, RawMessage};
use chrono::DateTime;
use std::sync::Arc;
use tracing::debug;

/// Content excerpts are cut at this many characters.
const EXCERPT_MAX_CHARS: usize = 500;
/// Excerpts shorter than this carry too little signal to assess.
const EXCERPT_MIN_CHARS: usize = 20;
/// At most this many excerpts go into the assessment prompt.
const EXCERPT_COUNT: usize = 5;

/// Samples one candidate's recent content and computes activity stats.
pub struct MetricsCollector {
    surface: Arc<dyn EntitySearch>,
    sample_limit: usize,
}

impl MetricsCollector {
    pub fn new(surface: Arc<dyn EntitySearch>) -> Self {
        Self {
            surface,
            sample_limit: 50,
        }
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// Fetch the recent-content sample, newest first.
    ///
    /// An empty sample is a success; only a fetch failure is an error,
    /// and the two are distinct by contract.
    pub async fn sample(
        &self,
        candidate: &SearchCandidate,
    ) -> Result<Vec<RawMessage>, MetricsError> {
        let entity_ref = candidate.entity_ref();
        debug!("sampling {} recent items for {}", self.sample_limit, entity_ref);
        let messages = self
            .surface
            .recent_messages(&entity_ref, self.sample_limit)
            .await?;
        Ok(messages)
    }

    /// Sample and compute in one step.
    pub async fn collect(
        &self,
        candidate: &SearchCandidate,
    ) -> Result<ActivityMetrics, MetricsError> {
        let messages = self.sample(candidate).await?;
        Ok(compute_metrics(candidate, &messages))
    }
}

/// Compute activity statistics from a sample, newest first.
///
/// Items with neither text nor media don't count toward the sample.
/// Missing per-item counters are treated as zero, not excluded.
pub fn compute_metrics(candidate: &SearchCandidate, messages: &[RawMessage]) -> ActivityMetrics {
    let sampled: Vec<&RawMessage> = messages
        .iter()
        .filter(|m| m.text.as_deref().is_some_and(|t| !t.is_empty()) || m.has_media)
        .collect();

    let count = sampled.len();
    if count == 0 {
        return ActivityMetrics::insufficient(candidate.participant_count);
    }

    let newest = sampled.first().and_then(|m| m.date);
    let oldest = sampled.last().and_then(|m| m.date);
    // minimum one day so the per-day rate never divides by zero
    let span_days = match (oldest, newest) {
        (Some(oldest), Some(newest)) if newest > oldest => {
            ((newest - oldest) as f64 / 86_400.0).max(1.0)
        }
        _ => 1.0,
    };

    let total_views: u64 = sampled.iter().map(|m| m.views.unwrap_or(0)).sum();
    let total_reactions: u64 = sampled.iter().map(|m| m.reactions.unwrap_or(0)).sum();
    let total_length: usize = sampled
        .iter()
        .map(|m| m.text.as_deref().map_or(0, |t| t.chars().count()))
        .sum();
    let media = sampled.iter().filter(|m| m.has_media).count();
    let forwards = sampled.iter().filter(|m| m.is_forward).count();

    ActivityMetrics {
        subscriber_count: candidate.participant_count,
        posts_sampled: count,
        avg_posts_per_day: count as f64 / span_days,
        avg_views_per_post: total_views / count as u64,
        avg_reactions_per_post: total_reactions / count as u64,
        avg_post_length: total_length / count,
        media_percent: ratio_percent(media, count),
        forward_percent: ratio_percent(forwards, count),
        last_post_at: newest.and_then(|secs| DateTime::from_timestamp(secs, 0)),
    }
}

fn ratio_percent(part: usize, whole: usize) -> u8 {
    ((part as f64 / whole as f64) * 100.0).round() as u8
}

/// Pick the content excerpts handed to the assessor: the first few items
/// with substantial text, truncated to a bounded length.
pub fn select_excerpts(messages: &[RawMessage]) -> Vec<ContentSample> {
    messages
        .iter()
        .filter(|m| {
            m.text
                .as_deref()
                .is_some_and(|t| t.chars().count() > EXCERPT_MIN_CHARS)
        })
        .take(EXCERPT_COUNT)
        .map(|m| ContentSample {
            text: m
                .text
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(EXCERPT_MAX_CHARS)
                .collect(),
            date: m.date.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            views: m.views.unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;
    use crate::surface::mock::{entity, message, MockSurface};
    use crate::search::aggregator::candidate_from_raw;

    const DAY: i64 = 86_400;

    fn candidate() -> SearchCandidate {
        candidate_from_raw(&entity("1001", "Crypto News", Some("cryptonews"), 5000, true)).unwrap()
    }

    #[test]
    fn test_compute_metrics_averages() {
        let c = candidate();
        // newest first: four posts over three days
        let messages = vec![
            message(4, "latest post with some text", 4 * DAY, 400),
            message(3, "third", 3 * DAY, 300),
            message(2, "second", 2 * DAY, 200),
            message(1, "first", DAY, 100),
        ];

        let metrics = compute_metrics(&c, &messages);
        assert_eq!(metrics.subscriber_count, 5000);
        assert_eq!(metrics.posts_sampled, 4);
        assert!((metrics.avg_posts_per_day - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.avg_views_per_post, 250);
        assert_eq!(metrics.media_percent, 0);
        assert_eq!(
            metrics.last_post_at,
            DateTime::from_timestamp(4 * DAY, 0)
        );
    }

    #[test]
    fn test_compute_metrics_media_and_forward_ratio() {
        let c = candidate();
        let mut with_media = message(2, "has media", DAY, 10);
        with_media.has_media = true;
        let mut forwarded = message(1, "forwarded", DAY, 10);
        forwarded.is_forward = true;

        let metrics = compute_metrics(&c, &[with_media, forwarded, message(3, "plain", DAY, 10)]);
        assert_eq!(metrics.media_percent, 33);
        assert_eq!(metrics.forward_percent, 33);
    }

    #[test]
    fn test_empty_items_do_not_count() {
        let c = candidate();
        let service_item = RawMessage::default(); // no text, no media
        let metrics = compute_metrics(&c, &[service_item, message(1, "real", DAY, 5)]);
        assert_eq!(metrics.posts_sampled, 1);
    }

    #[test]
    fn test_zero_sample_is_success_not_error() {
        let metrics = compute_metrics(&candidate(), &[]);
        assert_eq!(metrics.posts_sampled, 0);
        assert_eq!(metrics.avg_posts_per_day, 0.0);
        assert_eq!(metrics.avg_views_per_post, 0);
        assert_eq!(metrics.last_post_at, None);
        // subscriber count still carried through
        assert_eq!(metrics.subscriber_count, 5000);
    }

    #[test]
    fn test_missing_counters_count_as_zero() {
        let c = candidate();
        let mut no_views = message(2, "counterless post here", DAY, 0);
        no_views.views = None;
        no_views.reactions = None;

        let metrics = compute_metrics(&c, &[message(1, "counted post text", DAY, 100), no_views]);
        // mean over both items, the missing counter contributing zero
        assert_eq!(metrics.avg_views_per_post, 50);
    }

    #[test]
    fn test_span_has_one_day_floor() {
        let c = candidate();
        // two posts an hour apart must not inflate the daily rate
        let metrics = compute_metrics(&c, &[message(2, "b", 3600, 1), message(1, "a", 0, 1)]);
        assert!((metrics.avg_posts_per_day - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_excerpts_bounds() {
        let long_text = "x".repeat(900);
        let messages: Vec<RawMessage> = (0..8)
            .map(|i| message(i, &long_text, DAY, 10))
            .collect();

        let excerpts = select_excerpts(&messages);
        assert_eq!(excerpts.len(), 5);
        assert!(excerpts.iter().all(|e| e.text.chars().count() == 500));
    }

    #[test]
    fn test_select_excerpts_skips_short_texts() {
        let messages = vec![
            message(1, "short", DAY, 10),
            message(2, "this one is long enough to carry signal", DAY, 10),
        ];
        let excerpts = select_excerpts(&messages);
        assert_eq!(excerpts.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_reports_fetch_failure_as_error() {
        let c = candidate();
        let surface = Arc::new(MockSurface {
            fail_recent_for: Some(c.entity_ref()),
            ..MockSurface::default()
        });

        let collector = MetricsCollector::new(surface);
        assert!(collector.collect(&c).await.is_err());
    }

    #[tokio::test]
    async fn test_collect_zero_items_succeeds() {
        let c = candidate();
        // no recent entry configured: surface returns an empty sample
        let collector = MetricsCollector::new(Arc::new(MockSurface::default()));
        let metrics = collector.collect(&c).await.unwrap();
        assert_eq!(metrics.posts_sampled, 0);
        assert_eq!(metrics.subscriber_count, 5000);
    }

    #[test]
    fn test_candidate_kind_carried() {
        assert_eq!(candidate().kind, EntityKind::Channel);
    }
}
