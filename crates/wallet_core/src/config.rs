//! Wallet configuration stored at `~/.wallet/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::currency::Currency;

const DEFAULT_MARKET_API_URL: &str = "https://api.blocksdecoded.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info,wallet_app=debug,wallet_chart=debug,wallet_core=debug";

/// Settings shared by the chart services and the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the market data API (no trailing path).
    pub market_api_url: String,

    /// Timeout applied to every market data request.
    pub request_timeout_secs: u64,

    /// Currency chart values are quoted in.
    pub base_currency: Currency,

    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            market_api_url: DEFAULT_MARKET_API_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            base_currency: Currency::usd(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl WalletConfig {
    /// Returns the base directory: `~/.wallet`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".wallet"))
    }

    /// Returns the config file path: `~/.wallet/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.wallet/logs`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check that the values can actually be used to talk to the market API.
    pub fn validate(&self) -> Result<()> {
        if !validate_url(&self.market_api_url) {
            anyhow::bail!("invalid market API URL: {}", self.market_api_url);
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if self.base_currency.code.trim().is_empty() {
            anyhow::bail!("base currency code must not be empty");
        }
        Ok(())
    }

    /// Save the config to a JSON file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Load config from a JSON file, or return defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str::<WalletConfig>(&data) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Corrupt config file, using defaults: {e}");
                    }
                },
                Err(e) => {
                    warn!("Cannot read config file, using defaults: {e}");
                }
            }
        }
        Self::default()
    }

    /// Load from `~/.wallet/config.json`.
    pub fn load() -> Result<Self> {
        Ok(Self::load_or_default(&Self::config_path()?))
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
