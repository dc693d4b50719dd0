//! Configuration management for the Inkly assistant
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with INKLY__)
//! - Configuration files (config/default.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main assistant configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssistantConfig {
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Answer synthesis configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Follow-up generation configuration
    #[serde(default)]
    pub followup: FollowupConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Maximum snippets returned per question
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum relevance score for a snippet to count as relevant
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Retrieval time budget in milliseconds
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthesisConfig {
    /// Fail with InsufficientContext instead of hedging when no snippet
    /// clears the relevance threshold
    #[serde(default)]
    pub strict: bool,

    /// Confidence ceiling for answers produced without supporting context
    #[serde(default = "default_no_context_ceiling")]
    pub no_context_confidence_ceiling: f32,

    /// Maximum snippets quoted in a single answer
    #[serde(default = "default_max_answer_snippets")]
    pub max_answer_snippets: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FollowupConfig {
    /// Maximum follow-up questions per answer
    #[serde(default = "default_max_followups")]
    pub max_followups: usize,

    /// Seed for candidate sampling; fixed seed => reproducible output
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_max_results() -> usize { 5 }
fn default_min_score() -> f32 { 0.1 }
fn default_retrieval_timeout() -> u64 { 2000 }
fn default_no_context_ceiling() -> f32 { 0.2 }
fn default_max_answer_snippets() -> usize { 3 }
fn default_max_followups() -> usize { 3 }
fn default_log_level() -> String { "info".to_string() }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_score: default_min_score(),
            timeout_ms: default_retrieval_timeout(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            strict: false,
            no_context_confidence_ceiling: default_no_context_ceiling(),
            max_answer_snippets: default_max_answer_snippets(),
        }
    }
}

impl Default for FollowupConfig {
    fn default() -> Self {
        Self {
            max_followups: default_max_followups(),
            seed: 0,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl AssistantConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with INKLY__ prefix
            // e.g., INKLY__RETRIEVAL__TIMEOUT_MS=500
            .add_source(
                Environment::with_prefix("INKLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("INKLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the retrieval time budget as Duration
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieval.timeout_ms)
    }
}
