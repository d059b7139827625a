//! Project configuration file support for paperloops.
//!
//! Loads configuration from `paperloops.toml` in the working directory, or
//! from `paperloops/config.toml` under the user config directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use paperloops_agent::RetryPolicy;

/// Project-level configuration loaded from `paperloops.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Model name sent to the endpoint
    pub model: Option<String>,
    /// Endpoint base URL
    pub base_url: Option<String>,
    /// Outline iteration cap
    pub max_iterations: Option<usize>,
    /// Per-call ceiling for actor generations; 0 lifts the ceiling
    pub max_output_tokens: Option<u32>,
    /// Directory the result files are written to
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub outline: OutlineConfig,
}

/// Overrides for the client retry policy
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub min_delay_secs: Option<u64>,
    pub max_delay_secs: Option<u64>,
}

/// Outline completeness requirements
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutlineConfig {
    pub required_sections: Option<Vec<String>>,
    #[serde(default)]
    pub required_aspects: Vec<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "paperloops.toml";

impl ProjectConfig {
    /// Load configuration, preferring the working directory over the user
    /// config directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if neither file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        if let Some(config) = Self::load_file(&working_dir.join(CONFIG_FILE_NAME))? {
            return Ok(Some(config));
        }
        match user_config_path() {
            Some(path) => Self::load_file(&path),
            None => Ok(None),
        }
    }

    /// Load a single config file, `Ok(None)` if it does not exist
    pub fn load_file(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}

impl RetryConfig {
    /// Apply the overrides on top of the default policy
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let defaults = RetryPolicy::default();
        let policy = RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            min_delay: self
                .min_delay_secs
                .map_or(defaults.min_delay, Duration::from_secs),
            max_delay: self
                .max_delay_secs
                .map_or(defaults.max_delay, Duration::from_secs),
        };

        if policy.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        if policy.min_delay > policy.max_delay {
            anyhow::bail!("retry.min_delay_secs must not exceed retry.max_delay_secs");
        }
        Ok(policy)
    }
}

/// `<user config dir>/paperloops/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paperloops").join("config.toml"))
}
