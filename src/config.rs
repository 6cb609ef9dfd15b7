//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.chanscout.toml` files.

use crate::engine::{default_catalogs, EngineConfig};
use crate::surface::InferenceConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gateway (entity-search surface) settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Model settings for the AI assessor.
    #[serde(default)]
    pub model: ModelConfig,

    /// Search and caching settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Enrichment pipeline settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Entity-search gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL.
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            timeout_seconds: default_gateway_timeout(),
        }
    }
}

fn default_gateway_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_gateway_timeout() -> u64 {
    20
}

/// Inference model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenAI-compatible API base URL.
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the assessment response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_inference_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_inference_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_model_timeout() -> u64 {
    60
}

/// Search and result-cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Ranked-result cache TTL in minutes.
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,

    /// Curated directory handles for the catalog strategy.
    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: default_cache_ttl_minutes(),
            catalogs: default_catalogs(),
        }
    }
}

fn default_cache_ttl_minutes() -> u64 {
    30
}

/// Enrichment pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Inter-item delay in milliseconds (rate-limit safety).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Recent items sampled per candidate.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Enrichment-result cache TTL in minutes.
    #[serde(default = "default_enrichment_ttl_minutes")]
    pub cache_ttl_minutes: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            sample_limit: default_sample_limit(),
            cache_ttl_minutes: default_enrichment_ttl_minutes(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_sample_limit() -> usize {
    50
}

fn default_enrichment_ttl_minutes() -> u64 {
    360
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".chanscout.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.base_url = args.inference_url.clone();
        self.model.temperature = args.temperature;

        // Gateway URL - always override
        self.gateway.base_url = args.gateway_url.clone();
    }

    /// Build the engine configuration from these settings.
    pub fn engine_config(&self, show_progress: bool) -> EngineConfig {
        EngineConfig {
            catalogs: self.search.catalogs.clone(),
            result_ttl: Duration::from_secs(self.search.cache_ttl_minutes * 60),
            enrichment_ttl: Duration::from_secs(self.enrichment.cache_ttl_minutes * 60),
            enrichment_delay: Duration::from_millis(self.enrichment.delay_ms),
            sample_limit: self.enrichment.sample_limit,
            show_progress,
        }
    }

    /// Build the inference client configuration from these settings.
    pub fn inference_config(&self, api_key: Option<String>) -> InferenceConfig {
        InferenceConfig {
            base_url: self.model.base_url.clone(),
            api_key,
            model: self.model.name.clone(),
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
