use crate::core::cache::DEFAULT_RATES_TTL;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://valert-api.up.railway.app";

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ttl_secs() -> u64 {
    DEFAULT_RATES_TTL.as_secs()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session payload sent as `X-Telegram-Init-Data`. Requests are anonymous without it.
    #[serde(default)]
    pub init_data: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            init_data: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// A bank's markup over the official rate, in percent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Bank {
    pub code: String,
    pub name: String,
    pub buy_spread: f64,
    pub sell_spread: f64,
}

fn bank(code: &str, name: &str, buy_spread: f64, sell_spread: f64) -> Bank {
    Bank {
        code: code.to_string(),
        name: name.to_string(),
        buy_spread,
        sell_spread,
    }
}

pub fn default_banks() -> Vec<Bank> {
    vec![
        bank("cbu", "Markaziy Bank", 0.0, 0.0),
        bank("nbu", "Milliy Bank", -0.5, 0.8),
        bank("kapitalbank", "Kapitalbank", -0.4, 0.7),
        bank("uzumbank", "Uzum Bank", -0.3, 0.6),
        bank("xalqbank", "Xalq Banki", -0.7, 1.0),
        bank("ipotekabank", "Ipoteka Bank", -0.5, 0.8),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Holding {
    pub currency: String,
    pub amount: f64,
    pub buy_price: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_banks")]
    pub banks: Vec<Bank>,
    #[serde(default)]
    pub portfolio: Vec<Holding>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            banks: default_banks(),
            portfolio: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("uz", "valert", "valert")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn find_bank(&self, code: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.code.eq_ignore_ascii_case(code))
    }
}
