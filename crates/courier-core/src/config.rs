use crate::retry::{MailError, RetryPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Retry policy parameters for one preset (a `[retry.<name>]` table in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay in milliseconds before the second attempt.
    pub initial_delay_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor per attempt (e.g. 2.0 doubles each delay).
    pub backoff_multiplier: f64,
    /// Perturb each delay by up to ±10%.
    pub jitter: bool,
}

impl From<&RetryPolicy> for RetryConfig {
    fn from(p: &RetryPolicy) -> Self {
        Self {
            max_attempts: p.max_attempts,
            initial_delay_ms: u64::try_from(p.initial_delay.as_millis()).unwrap_or(u64::MAX),
            max_delay_ms: u64::try_from(p.max_delay.as_millis()).unwrap_or(u64::MAX),
            backoff_multiplier: p.backoff_multiplier,
            jitter: p.jitter,
        }
    }
}

impl RetryConfig {
    /// Validate and convert into a policy. Invalid shapes are configuration errors.
    pub fn to_policy(&self) -> Result<RetryPolicy, MailError> {
        if self.max_attempts == 0 {
            return Err(MailError::configuration(
                "retry max_attempts must be at least 1",
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 0.0 {
            return Err(MailError::configuration(format!(
                "retry backoff_multiplier must be a positive number, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
        })
    }
}

/// Named retry preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Network sends through the mail transport.
    #[default]
    Send,
    /// Template rendering.
    Render,
    /// Transport connection checks.
    Connection,
}

impl PresetName {
    pub const ALL: [PresetName; 3] = [PresetName::Send, PresetName::Render, PresetName::Connection];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Send => "send",
            PresetName::Render => "render",
            PresetName::Connection => "connection",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "send" => Ok(PresetName::Send),
            "render" => Ok(PresetName::Render),
            "connection" => Ok(PresetName::Connection),
            other => Err(format!(
                "unknown preset '{}' (expected send, render or connection)",
                other
            )),
        }
    }
}

/// The three retry presets; any table missing from the file keeps its built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPresets {
    pub send: RetryConfig,
    pub render: RetryConfig,
    pub connection: RetryConfig,
}

impl Default for RetryPresets {
    fn default() -> Self {
        Self {
            send: RetryConfig::from(&RetryPolicy::email_send()),
            render: RetryConfig::from(&RetryPolicy::template_render()),
            connection: RetryConfig::from(&RetryPolicy::connection_check()),
        }
    }
}

impl RetryPresets {
    pub fn get(&self, name: PresetName) -> &RetryConfig {
        match name {
            PresetName::Send => &self.send,
            PresetName::Render => &self.render,
            PresetName::Connection => &self.connection,
        }
    }

    pub fn policy(&self, name: PresetName) -> Result<RetryPolicy, MailError> {
        self.get(name).to_policy()
    }
}

/// Global configuration loaded from `~/.config/courier/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Retry presets; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: RetryPresets,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("courier")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CourierConfig> {
    load_or_init_at(&config_path()?)
}

/// [`load_or_init`] against an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<CourierConfig> {
    if !path.exists() {
        let default_cfg = CourierConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Read an existing config file.
pub fn load_from_path(path: &Path) -> Result<CourierConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: CourierConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
