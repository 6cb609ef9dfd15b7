//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{DiscoverOptions, KindFilter};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Chanscout - discover and rank public messaging communities
///
/// Searches several retrieval surfaces in parallel, merges and ranks the
/// results, and can enrich the top candidates with activity metrics and
/// an AI quality assessment.
///
/// Examples:
///   chanscout crypto
///   chanscout "crypto news" --kind channel --min-participants 1000
///   chanscout игры --enrich --analysis-limit 5 --format report
///   chanscout crypto --format csv --output channels.csv
///   chanscout --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Free-text query to search for
    ///
    /// Not required when using --init-config.
    #[arg(value_name = "QUERY", required_unless_present = "init_config")]
    pub query: Option<String>,

    /// Entity kind to admit (channel, group, all)
    #[arg(long, default_value = "all", value_name = "KIND")]
    pub kind: KindArg,

    /// Minimum participant count for a candidate to be admitted
    #[arg(long, default_value = "0", value_name = "COUNT")]
    pub min_participants: u64,

    /// Only admit platform-verified entities
    #[arg(long)]
    pub verified_only: bool,

    /// Only admit candidates classified into this category
    #[arg(long, value_name = "NAME")]
    pub category: Option<String>,

    /// Maximum candidates returned after ranking
    #[arg(short, long, default_value = "20", value_name = "COUNT")]
    pub limit: usize,

    /// Enrich the top candidates with metrics and an AI assessment
    #[arg(short, long)]
    pub enrich: bool,

    /// How many ranked candidates to enrich (the rest pass through)
    #[arg(long, default_value = "10", value_name = "COUNT")]
    pub analysis_limit: usize,

    /// Re-sort enriched results by assessed quality
    #[arg(long)]
    pub sort_by_quality: bool,

    /// Overall retrieval fan-out deadline in milliseconds
    #[arg(long, default_value = "30000", value_name = "MS")]
    pub timeout_ms: u64,

    /// Bypass the ranked-result cache for this call
    #[arg(long)]
    pub no_cache: bool,

    /// Output format (report, json, csv)
    #[arg(long, default_value = "report", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Entity-search gateway URL
    #[arg(long, default_value = "http://localhost:8787", env = "CHANSCOUT_GATEWAY_URL")]
    pub gateway_url: String,

    /// OpenAI-compatible inference API URL
    #[arg(
        long,
        default_value = "http://localhost:11434/v1",
        env = "CHANSCOUT_INFERENCE_URL"
    )]
    pub inference_url: String,

    /// Model used for quality assessment
    #[arg(short, long, default_value = "llama3.2:latest", env = "CHANSCOUT_MODEL")]
    pub model: String,

    /// API key for the inference endpoint, if it requires one
    #[arg(long, env = "CHANSCOUT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for assessment responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.2")]
    pub temperature: f32,

    /// Path to configuration file
    ///
    /// If not specified, looks for .chanscout.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generate a default .chanscout.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Entity kind filter on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KindArg {
    #[default]
    All,
    Channel,
    Group,
}

impl From<KindArg> for KindFilter {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::All => KindFilter::All,
            KindArg::Channel => KindFilter::Channel,
            KindArg::Group => KindFilter::Group,
        }
    }
}

/// Output format for the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Report,
    /// Structured record document
    Json,
    /// Tabular rows with a fixed header
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the query, empty if not set (should be validated first).
    pub fn query_str(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.query_str().trim().is_empty() {
            return Err("Query must not be empty".to_string());
        }

        if self.limit == 0 {
            return Err("Limit must be at least 1".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be at least 1 millisecond".to_string());
        }

        if self.enrich && self.analysis_limit == 0 {
            return Err("Analysis limit must be at least 1 when --enrich is set".to_string());
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        for (name, url) in [
            ("Gateway", &self.gateway_url),
            ("Inference", &self.inference_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} URL must start with 'http://' or 'https://'", name));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build engine discovery options from the arguments.
    pub fn discover_options(&self) -> DiscoverOptions {
        DiscoverOptions {
            kind: self.kind.into(),
            min_participants: self.min_participants,
            verified_only: self.verified_only,
            category: self.category.clone(),
            limit: self.limit,
            enrich: self.enrich,
            analysis_limit: self.analysis_limit,
            sort_by_quality: self.sort_by_quality,
            timeout: Duration::from_millis(self.timeout_ms),
            use_cache: !self.no_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            query: Some("crypto".to_string()),
            kind: KindArg::All,
            min_participants: 0,
            verified_only: false,
            category: None,
            limit: 20,
            enrich: false,
            analysis_limit: 10,
            sort_by_quality: false,
            timeout_ms: 30_000,
            no_cache: false,
            format: OutputFormat::Report,
            output: None,
            gateway_url: "http://localhost:8787".to_string(),
            inference_url: "http://localhost:11434/v1".to_string(),
            model: "test".to_string(),
            api_key: None,
            temperature: 0.2,
            config: None,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_passes_for_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_limit() {
        let mut args = make_args();
        args.limit = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_analysis_limit_only_with_enrich() {
        let mut args = make_args();
        args.analysis_limit = 0;
        assert!(args.validate().is_ok());

        args.enrich = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.gateway_url = "localhost:8787".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_discover_options_mapping() {
        let mut args = make_args();
        args.kind = KindArg::Channel;
        args.no_cache = true;
        args.timeout_ms = 5000;

        let opts = args.discover_options();
        assert_eq!(opts.kind, KindFilter::Channel);
        assert!(!opts.use_cache);
        assert_eq!(opts.timeout, Duration::from_millis(5000));
    }
}
