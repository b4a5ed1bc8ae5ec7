//! Configuration data model

use crate::config::timeouts;
use crate::error::{BenchError, BenchResult};
use crate::recovery::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which HTTP API the model backends speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Native Ollama `/api/generate`
    #[default]
    Ollama,
    /// OpenAI-compatible `/chat/completions`
    OpenAi,
}

impl ProviderKind {
    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(BenchError::config(format!("Unknown provider: {}", other))),
        }
    }
}

/// Retry budget for one answer generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff in seconds
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    timeouts::retry::MAX_ATTEMPTS
}

fn default_base_delay_secs() -> u64 {
    timeouts::retry::BASE_DELAY_SECS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.base_delay_secs))
    }
}

/// Settings for a benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Directory receiving one artifact per (dataset, model)
    pub results_dir: PathBuf,

    /// Backend API flavour
    pub provider: ProviderKind,

    /// Override for the provider's base URL
    pub base_url: Option<String>,

    /// API key, if the provider needs one
    pub api_key: Option<String>,

    /// Model used for text-only questions
    pub text_model: String,

    /// Model used for questions carrying images
    pub multimodal_model: String,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion length cap
    pub max_tokens: Option<u32>,

    /// Retry budget per item
    pub retry: RetryConfig,

    /// Per-call deadline in seconds
    pub call_timeout_secs: u64,

    /// Concurrent partitions (None = available parallelism)
    pub concurrency: Option<usize>,

    /// Concurrent items inside one partition
    pub item_concurrency: usize,

    /// Items sampled per partition (None = all)
    pub sample_size: Option<usize>,

    /// Seed for reproducible sampling
    pub seed: Option<u64>,

    /// Split name → short code used in question ids
    pub split_aliases: BTreeMap<String, String>,

    /// Keep question text and choices in persisted results
    pub include_inputs: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            provider: ProviderKind::default(),
            base_url: None,
            api_key: None,
            text_model: "llama3.2".to_string(),
            multimodal_model: "llava".to_string(),
            temperature: Some(0.5),
            max_tokens: None,
            retry: RetryConfig::default(),
            call_timeout_secs: timeouts::backend::CALL_SECS,
            concurrency: None,
            item_concurrency: 1,
            sample_size: None,
            seed: None,
            split_aliases: BTreeMap::new(),
            include_inputs: false,
        }
    }
}

impl BenchConfig {
    /// Set the results directory
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Set provider and base URL
    pub fn with_provider(mut self, provider: ProviderKind, base_url: Option<String>) -> Self {
        self.provider = provider;
        self.base_url = base_url;
        self
    }

    /// Set text and multimodal model names
    pub fn with_models(mut self, text: impl Into<String>, multimodal: impl Into<String>) -> Self {
        self.text_model = text.into();
        self.multimodal_model = multimodal.into();
        self
    }

    /// Set the retry budget
    pub fn with_retry(mut self, max_attempts: u32, base_delay_secs: u64) -> Self {
        self.retry = RetryConfig {
            max_attempts,
            base_delay_secs,
        };
        self
    }

    /// Set the partition concurrency bound
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Set the per-partition sample size
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace split aliases
    pub fn with_split_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.split_aliases = aliases;
        self
    }

    /// Keep question inputs in persisted results
    pub fn with_inputs(mut self) -> Self {
        self.include_inputs = true;
        self
    }

    /// Conventional short codes for the common split names
    pub fn short_split_aliases() -> BTreeMap<String, String> {
        [("test", "tes"), ("train", "tra"), ("validation", "val")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Concurrency bound, defaulting to the host's available parallelism
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }

    /// Per-call deadline
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Base URL for the configured provider
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Check invariants the runtime depends on
    pub fn validate(&self) -> BenchResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(BenchError::config("retry.max_attempts must be at least 1"));
        }
        if self.concurrency == Some(0) {
            return Err(BenchError::config("concurrency must be at least 1"));
        }
        if self.item_concurrency == 0 {
            return Err(BenchError::config("item_concurrency must be at least 1"));
        }
        if self.call_timeout_secs == 0 {
            return Err(BenchError::config("call_timeout_secs must be at least 1"));
        }
        if self.text_model.trim().is_empty() || self.multimodal_model.trim().is_empty() {
            return Err(BenchError::config("model names must not be empty"));
        }

        // Two splits sharing a short code would produce colliding question ids.
        let mut seen = HashSet::new();
        for (split, alias) in &self.split_aliases {
            if alias.is_empty() {
                return Err(BenchError::config(format!(
                    "split alias for '{}' is empty",
                    split
                )));
            }
            if !seen.insert(alias.as_str()) {
                return Err(BenchError::config_with_context(
                    format!("split alias '{}' is used more than once", alias),
                    "split_aliases must be injective",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_secs, 5);
        assert_eq!(config.item_concurrency, 1);
        assert!(config.sample_size.is_none());
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BenchConfig::default()
            .with_results_dir("out")
            .with_models("qwen2.5", "llava:13b")
            .with_retry(5, 1)
            .with_concurrency(2)
            .with_sample_size(10)
            .with_seed(7)
            .with_inputs();

        assert_eq!(config.results_dir, PathBuf::from("out"));
        assert_eq!(config.text_model, "qwen2.5");
        assert_eq!(config.multimodal_model, "llava:13b");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.effective_concurrency(), 2);
        assert_eq!(config.sample_size, Some(10));
        assert_eq!(config.seed, Some(7));
        assert!(config.include_inputs);
    }

    #[test]
    fn test_effective_concurrency_defaults_to_host() {
        let config = BenchConfig::default();
        assert!(config.effective_concurrency() >= 1);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = BenchConfig::default().with_retry(0, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_colliding_aliases() {
        let mut aliases = BenchConfig::short_split_aliases();
        aliases.insert("testing".to_string(), "tes".to_string());
        let config = BenchConfig::default().with_split_aliases(aliases);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tes"));
    }

    #[test]
    fn test_short_aliases_are_valid() {
        let config = BenchConfig::default().with_split_aliases(BenchConfig::short_split_aliases());
        assert!(config.validate().is_ok());
        assert_eq!(config.split_aliases.get("validation").map(String::as_str), Some("val"));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_effective_base_url() {
        let config = BenchConfig::default();
        assert_eq!(config.effective_base_url(), "http://localhost:11434");
        let config = config.with_provider(ProviderKind::OpenAi, Some("http://proxy/v1".into()));
        assert_eq!(config.effective_base_url(), "http://proxy/v1");
    }
}
