//! Result-set rendering.
//!
//! Pure transformations of a ranked (optionally enriched) result set into
//! a machine-readable record document, tabular rows, or a human-readable
//! report. No network or storage I/O happens here.

use crate::models::{AssessmentStats, EnrichedCandidate};
use chrono::Utc;
use serde::Serialize;

/// Fixed column header for the tabular export.
pub const EXPORT_COLUMNS: [&str; 9] = [
    "identity",
    "title",
    "handle",
    "kind",
    "participantCount",
    "category",
    "verified",
    "link",
    "foundBy",
];

/// Machine-readable export document.
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    query: &'a str,
    generated_at: chrono::DateTime<Utc>,
    total: usize,
    results: &'a [EnrichedCandidate],
}

/// Render the structured record document as pretty JSON.
pub fn export_records(results: &[EnrichedCandidate], query: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportDocument {
        query,
        generated_at: Utc::now(),
        total: results.len(),
        results,
    })
}

/// Render the tabular row set, header first.
pub fn export_rows(results: &[EnrichedCandidate]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect());

    for result in results {
        let c = &result.candidate;
        rows.push(vec![
            c.id.clone(),
            c.title.clone(),
            c.handle.clone().unwrap_or_default(),
            c.kind.to_string(),
            c.participant_count.to_string(),
            c.category.clone(),
            c.verified.to_string(),
            c.link.clone().unwrap_or_default(),
            c.found_by.iter().cloned().collect::<Vec<_>>().join(";"),
        ]);
    }

    rows
}

/// Render the tabular rows as CSV text.
pub fn export_csv(results: &[EnrichedCandidate]) -> String {
    export_rows(results)
        .iter()
        .map(|row| {
            row.iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the human-readable report: one block per candidate.
///
/// The empty case produces explicit "no results" text, distinguishable
/// from a failed search.
pub fn export_report(results: &[EnrichedCandidate], query: &str) -> String {
    if results.is_empty() {
        return format!(
            "No results for \"{}\".\n\nTry a different query, a synonym, or the other-language spelling.\n",
            query
        );
    }

    let mut output = String::new();
    output.push_str(&format!("# Discovery report: \"{}\"\n\n", query));
    output.push_str(&format!("Found {} communities.\n\n", results.len()));

    for (index, result) in results.iter().enumerate() {
        output.push_str(&generate_candidate_block(index + 1, result));
    }

    output.push_str(&generate_stats_footer(results));

    output
}

fn generate_candidate_block(position: usize, result: &EnrichedCandidate) -> String {
    let c = &result.candidate;
    let mut block = String::new();

    block.push_str(&format!("## {}. {}\n\n", position, c.title));
    block.push_str(&format!(
        "- **Kind:** {} | **Participants:** {} | **Category:** {}{}\n",
        c.kind,
        c.participant_count,
        c.category,
        if c.verified { " | verified" } else { "" }
    ));
    if let Some(ref link) = c.link {
        block.push_str(&format!("- **Link:** {}\n", link));
    }
    block.push_str(&format!(
        "- **Found by:** {}\n",
        c.found_by.iter().cloned().collect::<Vec<_>>().join(", ")
    ));

    if let Some(ref metrics) = result.metrics {
        block.push_str("\n**Activity:**\n");
        if metrics.posts_sampled == 0 {
            block.push_str("- no recent content retrievable\n");
        } else {
            block.push_str(&format!(
                "- {} posts sampled, {:.1} per day\n",
                metrics.posts_sampled, metrics.avg_posts_per_day
            ));
            block.push_str(&format!(
                "- {} avg views, {} avg reactions, {} chars avg length\n",
                metrics.avg_views_per_post,
                metrics.avg_reactions_per_post,
                metrics.avg_post_length
            ));
            block.push_str(&format!(
                "- {}% media, {}% forwards\n",
                metrics.media_percent, metrics.forward_percent
            ));
            if let Some(last) = metrics.last_post_at {
                block.push_str(&format!(
                    "- last post {}\n",
                    last.format("%Y-%m-%d %H:%M UTC")
                ));
            }
        }
    }

    if let Some(ref assessment) = result.assessment {
        block.push_str("\n**Assessment:**\n");
        if let Some(ref error) = assessment.error {
            block.push_str(&format!("- unavailable: {}\n", error));
        } else {
            block.push_str(&format!(
                "- quality {:.1}/10 - {}\n",
                assessment.quality_score, assessment.verdict
            ));
            block.push_str(&format!(
                "- educational {:.1}/10, commercial {:.1}/10\n",
                assessment.educational_value, assessment.commercial_index
            ));
            block.push_str(&format!(
                "- content: {} | audience: {}\n",
                assessment.content_type, assessment.target_audience
            ));
            if !assessment.warnings.is_empty() {
                block.push_str(&format!("- warnings: {}\n", assessment.warnings.join(", ")));
            }
            block.push_str(&format!("- {}\n", assessment.recommendation));
        }
    }

    block.push('\n');
    block
}

fn generate_stats_footer(results: &[EnrichedCandidate]) -> String {
    let stats = AssessmentStats::from_results(results);
    if stats.analyzed == 0 {
        return String::new();
    }

    let mut footer = String::new();
    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "Assessed {} of {} candidates, average quality {:.1}/10.\n",
        stats.analyzed, stats.total, stats.avg_score
    ));
    if stats.high_quality > 0 {
        footer.push_str(&format!("High quality (7+): {}.\n", stats.high_quality));
    }
    if stats.with_warnings > 0 {
        footer.push_str(&format!("With warnings: {}.\n", stats.with_warnings));
    }

    footer
}
