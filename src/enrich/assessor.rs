//! AI quality assessment of one candidate.
//!
//! Builds a structured prompt from candidate metadata, the metrics block,
//! and a few content excerpts, then parses the model's JSON reply with
//! clamping and explicit defaulting. Any transport or parse failure
//! yields the error-flagged fallback - a failed assessment must never
//! read as "average quality".

use crate::error::AssessmentError;
use crate::models::{
    ActivityMetrics, ContentSample, QualityAssessment, SearchCandidate, UNDETERMINED,
};
use crate::surface::TextInference;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Excerpt length inside the prompt; the full sample stays longer.
const PROMPT_EXCERPT_CHARS: usize = 200;

/// Produces a [`QualityAssessment`] for one candidate.
pub struct QualityAssessor {
    inference: Arc<dyn TextInference>,
}

impl QualityAssessor {
    pub fn new(inference: Arc<dyn TextInference>) -> Self {
        Self { inference }
    }

    /// Assess one candidate. Infallible by contract: failures surface as
    /// the fallback assessment with `error` populated.
    pub async fn assess(
        &self,
        candidate: &SearchCandidate,
        metrics: &ActivityMetrics,
        samples: &[ContentSample],
    ) -> QualityAssessment {
        let prompt = build_assessment_prompt(candidate, metrics, samples);

        let raw = match self.inference.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("inference call failed for \"{}\": {}", candidate.title, e);
                return QualityAssessment::fallback(e.to_string());
            }
        };

        match parse_assessment(&raw) {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!("discarding assessment for \"{}\": {}", candidate.title, e);
                QualityAssessment::fallback(e.to_string())
            }
        }
    }
}

/// Build the structured assessment prompt.
pub fn build_assessment_prompt(
    candidate: &SearchCandidate,
    metrics: &ActivityMetrics,
    samples: &[ContentSample],
) -> String {
    let mut prompt = String::new();

    prompt.push_str("Assess the quality of a public messaging community.\n\n");

    prompt.push_str("COMMUNITY:\n");
    prompt.push_str(&format!("- Title: {}\n", candidate.title));
    prompt.push_str(&format!(
        "- Handle: {}\n",
        candidate.handle.as_deref().unwrap_or("none")
    ));
    prompt.push_str(&format!("- Kind: {}\n", candidate.kind));
    prompt.push_str(&format!(
        "- Description: {}\n",
        candidate.description.as_deref().unwrap_or("none")
    ));
    prompt.push_str(&format!("- Subscribers: {}\n\n", metrics.subscriber_count));

    prompt.push_str("ACTIVITY METRICS:\n");
    prompt.push_str(&format!("- Posts sampled: {}\n", metrics.posts_sampled));
    prompt.push_str(&format!(
        "- Posts per day: {:.1}\n",
        metrics.avg_posts_per_day
    ));
    prompt.push_str(&format!(
        "- Average views per post: {}\n",
        metrics.avg_views_per_post
    ));
    prompt.push_str(&format!(
        "- Average reactions per post: {}\n",
        metrics.avg_reactions_per_post
    ));
    prompt.push_str(&format!(
        "- Average post length: {} characters\n",
        metrics.avg_post_length
    ));
    prompt.push_str(&format!("- Media share: {}%\n", metrics.media_percent));
    prompt.push_str(&format!(
        "- Forwarded share: {}%\n\n",
        metrics.forward_percent
    ));

    if samples.is_empty() {
        prompt.push_str("RECENT POSTS: none retrievable\n\n");
    } else {
        prompt.push_str("RECENT POSTS:\n");
        for (i, sample) in samples.iter().enumerate() {
            let excerpt: String = sample.text.chars().take(PROMPT_EXCERPT_CHARS).collect();
            prompt.push_str(&format!("{}. {}\n", i + 1, excerpt));
        }
        prompt.push('\n');
    }

    prompt.push_str("Reply with ONLY a JSON object, no prose and no markdown fences:\n");
    prompt.push_str(
        r#"{
  "qualityScore": <number 0-10>,
  "verdict": "<one-line verdict: useful/spam/advertising/educational/news>",
  "categories": ["<content categories>"],
  "commercialIndex": <number 0-10>,
  "educationalValue": <number 0-10>,
  "contentType": "<original|reposts|mixed>",
  "targetAudience": "<intended audience>",
  "warnings": ["<warnings, if any>"],
  "recommendation": "<subscribe or skip, one line>"
}"#,
    );

    prompt
}

/// Loose shape of the model's reply; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAssessment {
    quality_score: Option<f64>,
    verdict: Option<String>,
    categories: Option<Vec<String>>,
    commercial_index: Option<f64>,
    educational_value: Option<f64>,
    content_type: Option<String>,
    target_audience: Option<String>,
    warnings: Option<Vec<String>>,
    recommendation: Option<String>,
}

/// Parse a model reply into a validated assessment.
///
/// Strips code-fence wrapping, clamps every score into 0-10, defaults
/// missing strings to the placeholder and missing lists to empty.
pub fn parse_assessment(raw: &str) -> Result<QualityAssessment, AssessmentError> {
    let cleaned = strip_code_fences(raw);
    let parsed: RawAssessment =
        serde_json::from_str(cleaned).map_err(|e| AssessmentError::Parse(e.to_string()))?;

    Ok(QualityAssessment {
        quality_score: clamp_score(parsed.quality_score),
        verdict: text_or_placeholder(parsed.verdict),
        categories: parsed.categories.unwrap_or_default(),
        commercial_index: clamp_score(parsed.commercial_index),
        educational_value: clamp_score(parsed.educational_value),
        content_type: text_or_placeholder(parsed.content_type),
        target_audience: text_or_placeholder(parsed.target_audience),
        warnings: parsed.warnings.unwrap_or_default(),
        recommendation: text_or_placeholder(parsed.recommendation),
        error: None,
    })
}

fn clamp_score(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).clamp(0.0, 10.0)
}

fn text_or_placeholder(value: Option<String>) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNDETERMINED.to_string())
}

/// Drop a ```/```json fence around the payload, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // the fence's info string ("json") runs to the first newline
    let inner = match inner.split_once('\n') {
        Some((_, rest)) => rest,
        None => inner,
    };
    inner.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::aggregator::candidate_from_raw;
    use crate::surface::mock::{entity, MockInference};

    const VALID_REPLY: &str = r#"{
        "qualityScore": 8.5,
        "verdict": "useful",
        "categories": ["crypto", "news"],
        "commercialIndex": 2,
        "educationalValue": 7,
        "contentType": "original",
        "targetAudience": "traders",
        "warnings": [],
        "recommendation": "subscribe"
    }"#;

    fn candidate() -> SearchCandidate {
        candidate_from_raw(&entity("1001", "Crypto News", Some("cryptonews"), 5000, true)).unwrap()
    }

    #[test]
    fn test_parse_valid_reply() {
        let assessment = parse_assessment(VALID_REPLY).unwrap();
        assert_eq!(assessment.quality_score, 8.5);
        assert_eq!(assessment.verdict, "useful");
        assert_eq!(assessment.categories, vec!["crypto", "news"]);
        assert_eq!(assessment.error, None);
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let fenced = format!("```json\n{}\n```", VALID_REPLY);
        let assessment = parse_assessment(&fenced).unwrap();
        assert_eq!(assessment.quality_score, 8.5);

        let bare_fence = format!("```\n{}\n```", VALID_REPLY);
        assert!(parse_assessment(&bare_fence).is_ok());
    }

    #[test]
    fn test_parse_clamps_out_of_range_scores() {
        let reply = r#"{"qualityScore": 42, "commercialIndex": -3}"#;
        let assessment = parse_assessment(reply).unwrap();
        assert_eq!(assessment.quality_score, 10.0);
        assert_eq!(assessment.commercial_index, 0.0);
    }

    #[test]
    fn test_parse_defaults_missing_fields() {
        let assessment = parse_assessment(r#"{"qualityScore": 6}"#).unwrap();
        assert_eq!(assessment.verdict, UNDETERMINED);
        assert_eq!(assessment.content_type, UNDETERMINED);
        assert!(assessment.categories.is_empty());
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_assessment("I think this channel is pretty good!").is_err());
        assert!(parse_assessment("").is_err());
        // truncated output from a cut-off generation
        assert!(parse_assessment(r#"{"qualityScore": 8, "verdict": "use"#).is_err());
    }

    #[tokio::test]
    async fn test_assess_transport_failure_yields_fallback() {
        let assessor = QualityAssessor::new(Arc::new(MockInference {
            fail: true,
            ..MockInference::default()
        }));

        let assessment = assessor
            .assess(&candidate(), &ActivityMetrics::insufficient(5000), &[])
            .await;

        assert!(assessment.is_fallback());
        assert_eq!(assessment.quality_score, 0.0);
        assert_eq!(assessment.commercial_index, 0.0);
        assert_eq!(assessment.educational_value, 0.0);
    }

    #[tokio::test]
    async fn test_assess_unparsable_reply_yields_fallback() {
        let assessor = QualityAssessor::new(Arc::new(MockInference {
            reply: Some("Sorry, I cannot help with that.".to_string()),
            ..MockInference::default()
        }));

        let assessment = assessor
            .assess(&candidate(), &ActivityMetrics::insufficient(5000), &[])
            .await;

        assert!(assessment.is_fallback());
        assert_eq!(assessment.quality_score, 0.0);
    }

    #[tokio::test]
    async fn test_assess_valid_reply() {
        let assessor = QualityAssessor::new(Arc::new(MockInference {
            reply: Some(VALID_REPLY.to_string()),
            ..MockInference::default()
        }));

        let assessment = assessor
            .assess(&candidate(), &ActivityMetrics::insufficient(5000), &[])
            .await;

        assert!(!assessment.is_fallback());
        assert_eq!(assessment.quality_score, 8.5);
    }

    #[test]
    fn test_prompt_contains_metadata_and_excerpts() {
        let c = candidate();
        let metrics = ActivityMetrics {
            subscriber_count: 5000,
            posts_sampled: 10,
            ..ActivityMetrics::default()
        };
        let long_sample = ContentSample {
            text: "y".repeat(400),
            date: None,
            views: 7,
        };

        let prompt = build_assessment_prompt(&c, &metrics, &[long_sample]);
        assert!(prompt.contains("Crypto News"));
        assert!(prompt.contains("Subscribers: 5000"));
        assert!(prompt.contains("qualityScore"));
        // excerpt trimmed to the prompt budget
        assert!(prompt.contains(&"y".repeat(200)));
        assert!(!prompt.contains(&"y".repeat(201)));
    }
}
