//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PDV_*`)
//! 2. Config file (path in `PDV_CONFIG`, TOML)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use pdv_client::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use pdv_client::ClientConfig;
use pdv_core::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration.
///
/// ## Example file
/// ```toml
/// store_name = "Mercado Central"
/// api_url = "https://erp.example.com/api"
/// api_timeout_secs = 5
/// offline = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Store name (shown in the prompt banner)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Separator between reais and centavos when displaying amounts
    pub decimal_separator: char,

    /// SQLite file; `None` means the platform data directory
    pub database_path: Option<PathBuf>,

    /// ERP backend base URL
    pub api_url: String,

    /// Per-request timeout for backend calls
    pub api_timeout_secs: u64,

    /// Skip the backend entirely
    pub offline: bool,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    fn default() -> Self {
        ConfigState {
            store_name: "PDV Loja".to_string(),
            currency_symbol: "R$".to_string(),
            decimal_separator: ',',
            database_path: None,
            api_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: DEFAULT_TIMEOUT_SECS,
            offline: false,
        }
    }
}

impl ConfigState {
    /// Full startup load: defaults, then the `PDV_CONFIG` file, then env.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("PDV_CONFIG") {
            Ok(path) => ConfigState::from_file(Path::new(&path))?,
            Err(_) => ConfigState::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Creates a new ConfigState from environment variables and defaults.
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Reads a TOML file; keys it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `PDV_*` overrides looked up through `var`.
    ///
    /// ## Environment Variables
    /// - `PDV_STORE_NAME`: store name
    /// - `PDV_DB_PATH`: SQLite file
    /// - `PDV_API_URL`: backend base URL
    /// - `PDV_API_TIMEOUT_SECS`: request timeout (ignored if not a number)
    /// - `PDV_OFFLINE`: `1`/`true`/`yes` to run without the backend
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(store_name) = var("PDV_STORE_NAME") {
            self.store_name = store_name;
        }

        if let Some(path) = var("PDV_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(url) = var("PDV_API_URL") {
            self.api_url = url;
        }

        if let Some(timeout) = var("PDV_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.trim().parse::<u64>() {
                self.api_timeout_secs = secs;
            }
        }

        if let Some(offline) = var("PDV_OFFLINE") {
            self.offline = matches!(
                offline.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Backend client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout(self.api_timeout_secs)
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "R$ 12,34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{} {}{}{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.major().abs(),
            self.decimal_separator,
            amount.minor()
        )
    }
}
