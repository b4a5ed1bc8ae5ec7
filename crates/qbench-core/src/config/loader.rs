//! Configuration loading from layered sources

use crate::config::model::{BenchConfig, ProviderKind};
use crate::error::{BenchError, BenchResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "QBENCH_";

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a JSON, YAML or TOML file
    File(PathBuf),
    /// `QBENCH_*` environment variables
    Environment,
    /// Built-in defaults; always the base layer, so adding it never
    /// discards earlier sources
    Default,
}

/// Configuration loader; later sources override earlier ones
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
    env_lookup: EnvLookup,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            env_lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Replace how environment variables are read
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Load configuration from all sources
    pub fn load(self) -> BenchResult<BenchConfig> {
        let mut config = BenchConfig::default();

        for source in &self.sources {
            config = match source {
                ConfigSource::Default => {
                    tracing::debug!("Default config is the base layer");
                    config
                }
                ConfigSource::File(path) => {
                    tracing::debug!("Loading config from file: {}", path.display());
                    Self::overlay_file(config, path)?
                }
                ConfigSource::Environment => {
                    tracing::debug!("Loading config from environment");
                    self.overlay_env(config)?
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge a file's keys over the current configuration
    fn overlay_file(config: BenchConfig, path: &Path) -> BenchResult<BenchConfig> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, skipping", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to read config file: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        })?;

        let patch = parse_config_value(path, &content)?;
        let mut base = serde_json::to_value(&config)?;
        merge_values(&mut base, patch);

        serde_json::from_value(base).map_err(|e| {
            BenchError::config_with_context(
                format!("Invalid configuration: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        })
    }

    /// Apply `QBENCH_*` overrides
    fn overlay_env(&self, mut config: BenchConfig) -> BenchResult<BenchConfig> {
        let get = |name: &str| (self.env_lookup)(&format!("{}{}", ENV_PREFIX, name));

        if let Some(provider) = get("PROVIDER") {
            config.provider = ProviderKind::from_str(&provider)?;
        }
        if let Some(url) = get("BASE_URL") {
            config.base_url = Some(url);
        }
        if let Some(key) = get("API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(model) = get("TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = get("MULTIMODAL_MODEL") {
            config.multimodal_model = model;
        }
        if let Some(dir) = get("RESULTS_DIR") {
            config.results_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("CONCURRENCY") {
            config.concurrency = Some(parse_env("CONCURRENCY", &raw)?);
        }
        if let Some(raw) = get("SAMPLE_SIZE") {
            config.sample_size = Some(parse_env("SAMPLE_SIZE", &raw)?);
        }
        if let Some(raw) = get("SEED") {
            config.seed = Some(parse_env("SEED", &raw)?);
        }
        if let Some(raw) = get("MAX_ATTEMPTS") {
            config.retry.max_attempts = parse_env("MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = get("BASE_DELAY_SECS") {
            config.retry.base_delay_secs = parse_env("BASE_DELAY_SECS", &raw)?;
        }
        if let Some(raw) = get("CALL_TIMEOUT_SECS") {
            config.call_timeout_secs = parse_env("CALL_TIMEOUT_SECS", &raw)?;
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> BenchResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| BenchError::config(format!("Invalid {}{} value: {}", ENV_PREFIX, name, raw)))
}

fn parse_config_value(path: &Path, content: &str) -> BenchResult<Value> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
        Some("toml") => Ok(toml::from_str(content)?),
        _ => serde_json::from_str(content).map_err(|e| {
            BenchError::config_with_context(
                format!("Invalid JSON: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        }),
    }
}

/// Recursively merge `patch` into `base`; objects merge, everything else replaces
fn merge_values(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
