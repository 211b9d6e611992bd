//! Provider configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bullet_trade_market_data::CacheManagerConfig;

use crate::constants::*;
use crate::errors::{Error, Result};

/// Whether the provider is feeding a backtest or a live session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Backtest,
    Live,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backtest" => Ok(RunMode::Backtest),
            "live" => Ok(RunMode::Live),
            other => Err(Error::InvalidConfigValue(format!(
                "{}: expected backtest or live, got {}",
                ENV_MODE, other
            ))),
        }
    }
}

/// Provider configuration for initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub mode: RunMode,
    /// Explicit override; unset means on for backtests and off for live
    pub auto_download: Option<bool>,
    /// On-disk cache location; unset keeps the cache in memory
    pub cache_dir: Option<PathBuf>,
    pub retry_backoff_ms: u64,
    pub refresh_interval_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Backtest,
            auto_download: None,
            cache_dir: None,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl ProviderConfig {
    pub fn live() -> Self {
        Self {
            mode: RunMode::Live,
            ..Self::default()
        }
    }

    pub fn auto_download_enabled(&self) -> bool {
        self.auto_download.unwrap_or(self.mode == RunMode::Backtest)
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from any key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get(ENV_MODE) {
            config.mode = mode.parse()?;
        }
        if let Some(flag) = get(ENV_AUTO_DOWNLOAD) {
            config.auto_download = Some(parse_bool(ENV_AUTO_DOWNLOAD, &flag)?);
        }
        if let Some(dir) = get(ENV_CACHE_DIR) {
            config.cache_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(ms) = get(ENV_RETRY_BACKOFF_MS) {
            config.retry_backoff_ms = parse_number(ENV_RETRY_BACKOFF_MS, &ms)?;
        }
        if let Some(secs) = get(ENV_REFRESH_INTERVAL_SECS) {
            config.refresh_interval_secs = parse_number(ENV_REFRESH_INTERVAL_SECS, &secs)?;
        }
        Ok(config)
    }

    pub fn cache_manager_config(&self) -> CacheManagerConfig {
        CacheManagerConfig {
            auto_download: self.auto_download_enabled(),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidConfigValue(format!(
            "{}: expected a boolean, got {}",
            key, other
        ))),
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfigValue(format!("{}: expected a number, got {}", key, value)))
}
