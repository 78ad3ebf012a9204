//! Configuration file support.
//!
//! Settings come from `~/.denoise/config.toml`, then `./.denoiserc`, then
//! `DENOISE_*` environment variables, each layer overriding the previous one.

use crate::batch::{DEFAULT_BASE_DELAY, RetryPolicy};
use denoise_models::gradio::{DEFAULT_HUB_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SPACE};
use denoise_models::{EnhancerConfig, EnhancerType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable selecting the enhancer provider.
pub const ENV_PROVIDER: &str = "DENOISE_PROVIDER";
/// Environment variable overriding the Space id or URL.
pub const ENV_SPACE: &str = "DENOISE_SPACE";
/// Environment variable overriding the Hub URL.
pub const ENV_HUB_URL: &str = "DENOISE_HUB_URL";
/// Environment variable carrying the Hugging Face token.
pub const ENV_HF_TOKEN: &str = "HF_TOKEN";
/// Environment variable overriding the backoff unit in milliseconds.
pub const ENV_RETRY_BASE_DELAY_MS: &str = "DENOISE_RETRY_BASE_DELAY_MS";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "DENOISE_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "DENOISE_LOG_LEVEL";

/// Default provider name.
pub const DEFAULT_PROVIDER: &str = "gradio";

/// Denoise configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenoiseConfig {
    /// Enhancer provider (`gradio` or `mock`)
    #[serde(default)]
    pub provider: Option<String>,

    /// Space id (`owner/name`) or app URL
    #[serde(default)]
    pub space: Option<String>,

    /// Hub URL used to resolve Space ids
    #[serde(default)]
    pub hub_url: Option<String>,

    /// Hugging Face token
    #[serde(default)]
    pub hf_token: Option<String>,

    /// Backoff unit between attempts, in milliseconds
    #[serde(default)]
    pub retry_base_delay_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl DenoiseConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".denoise")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".denoiserc")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.denoise/config.toml)
    /// 2. Local config (./.denoiserc)
    ///
    /// Local config overrides global config. Missing files are skipped; a
    /// file that exists but does not parse is an error.
    pub fn discover_and_load() -> ConfigResult<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            match Self::load_from_file(&path) {
                Ok(found) => config.merge(&found),
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(config)
    }

    /// Load the effective configuration.
    ///
    /// `explicit` replaces file discovery. Environment overrides apply in
    /// both cases.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => Self::discover_and_load()?,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref provider) = other.provider {
            self.provider = Some(provider.clone());
        }
        if let Some(ref space) = other.space {
            self.space = Some(space.clone());
        }
        if let Some(ref hub_url) = other.hub_url {
            self.hub_url = Some(hub_url.clone());
        }
        if let Some(ref hf_token) = other.hf_token {
            self.hf_token = Some(hf_token.clone());
        }
        if let Some(delay) = other.retry_base_delay_ms {
            self.retry_base_delay_ms = Some(delay);
        }
        if let Some(timeout) = other.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(provider) = get(ENV_PROVIDER) {
            self.provider = Some(provider);
        }
        if let Some(space) = get(ENV_SPACE) {
            self.space = Some(space);
        }
        if let Some(hub_url) = get(ENV_HUB_URL) {
            self.hub_url = Some(hub_url);
        }
        if let Some(hf_token) = get(ENV_HF_TOKEN) {
            self.hf_token = Some(hf_token);
        }
        if let Some(delay) = get(ENV_RETRY_BASE_DELAY_MS) {
            self.retry_base_delay_ms = Some(parse_number(ENV_RETRY_BASE_DELAY_MS, &delay)?);
        }
        if let Some(timeout) = get(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = Some(parse_number(ENV_REQUEST_TIMEOUT_SECS, &timeout)?);
        }
        if let Some(log_level) = get(ENV_LOG_LEVEL) {
            self.log_level = Some(log_level);
        }

        Ok(())
    }

    /// Enhancer provider, defaulting to the Gradio Space client.
    pub fn enhancer_type(&self) -> ConfigResult<EnhancerType> {
        let provider = self.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
        EnhancerType::from_str(provider)
            .map_err(|()| ConfigError::InvalidValue(format!("unknown provider: {}", provider)))
    }

    /// Space id or URL.
    pub fn space(&self) -> &str {
        self.space.as_deref().unwrap_or(DEFAULT_SPACE)
    }

    /// Hub URL.
    pub fn hub_url(&self) -> &str {
        self.hub_url.as_deref().unwrap_or(DEFAULT_HUB_URL)
    }

    /// Retry policy: fixed attempt budget, configurable backoff unit.
    pub fn retry_policy(&self) -> RetryPolicy {
        let base_delay = self.retry_base_delay_ms.map_or(DEFAULT_BASE_DELAY, Duration::from_millis);
        RetryPolicy::with_base_delay(base_delay)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs.map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Build the enhancer configuration for this run.
    pub fn enhancer_config(&self) -> ConfigResult<EnhancerConfig> {
        let mut config = EnhancerConfig::new(self.enhancer_type()?, self.space().to_string())
            .with_hub_url(self.hub_url().to_string())
            .with_request_timeout(self.request_timeout());
        if let Some(ref token) = self.hf_token {
            config = config.with_hf_token(token.clone());
        }
        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue(format!("{}={} is not a non-negative integer", key, value))
    })
}
