use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use tracing::warn;

use crate::error::{CongresoError, Result};
use crate::types::BillFilter;

pub const BASE_URL_ENV: &str = "API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BillsConfig {
    /// Parliamentary period (perParId)
    pub period_id: u32,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for BillsConfig {
    fn default() -> Self {
        Self {
            period_id: 2021,
            from: None,
            to: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub bills: BillsConfig,
}

/// Browse congressional bills and congress members from the terminal
#[derive(Debug, Default, Parser)]
#[command(name = "congreso", version, about)]
pub struct Cli {
    /// Config file (defaults to <config dir>/congreso/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the congress API (overrides API_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Rows requested per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Quiet time before a search is sent, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Parliamentary period id used for bill searches
    #[arg(long)]
    pub period: Option<u32>,

    /// Only bills filed on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Only bills filed on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

fn default_config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("congreso").join("config.toml"))
}

impl Config {
    /// Defaults, then the config file, then `API_BASE_URL`, then CLI flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let path = cli.config.clone().or_else(default_config_path);
        let mut config = match path {
            Some(path) => Config::load_from(&path),
            None => Config::default(),
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.apply_base_url_env(&url);
        }
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file. Missing or unreadable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Config::default()
            }
        }
    }

    fn apply_base_url_env(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api.base_url = url.to_string();
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_base_url {
            self.api.base_url = url.clone();
        }
        if let Some(size) = cli.page_size {
            self.search.page_size = size;
        }
        if let Some(ms) = cli.debounce_ms {
            self.search.debounce_ms = ms;
        }
        if let Some(secs) = cli.timeout_secs {
            self.api.timeout_secs = secs;
        }
        if let Some(period) = cli.period {
            self.bills.period_id = period;
        }
        if cli.from.is_some() {
            self.bills.from = cli.from;
        }
        if cli.to.is_some() {
            self.bills.to = cli.to;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CongresoError::Config("API base URL is empty".into()));
        }
        if self.search.page_size == 0 {
            return Err(CongresoError::Config("page_size must be at least 1".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(CongresoError::Config("timeout_secs must be at least 1".into()));
        }
        if let (Some(from), Some(to)) = (self.bills.from, self.bills.to) {
            if from > to {
                return Err(CongresoError::Config(format!(
                    "date range is reversed: {} is after {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn bill_filter(&self) -> BillFilter {
        BillFilter {
            period_id: self.bills.period_id,
            filed_from: self.bills.from,
            filed_to: self.bills.to,
        }
    }
}
