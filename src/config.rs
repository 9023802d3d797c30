use crate::constants;
use crate::error::{MonitorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the local mirror, holding the latest/latest-15/felt/all
    /// endpoints
    #[serde(default = "default_mirror_base_url")]
    pub mirror_base_url: String,
    /// The national agency's felt-report feed, used by the legacy fallback
    /// path only
    #[serde(default = "default_agency_felt_url")]
    pub agency_felt_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: f64,
    #[serde(default = "default_recency_minutes")]
    pub recency_minutes: i64,
    #[serde(default = "default_ledger_cap")]
    pub ledger_cap: usize,
    #[serde(default = "default_ledger_evict")]
    pub ledger_evict: usize,
}

fn default_mirror_base_url() -> String {
    "http://localhost:4000/api/v1/earthquake".to_string()
}

fn default_agency_felt_url() -> String {
    "https://data.bmkg.go.id/DataMKG/TEWS/gempadirasakan.json".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_interval_seconds() -> u64 {
    300
}

fn default_min_magnitude() -> f64 {
    constants::ALERT_MAGNITUDE_THRESHOLD
}

fn default_recency_minutes() -> i64 {
    constants::ALERT_RECENCY_MINUTES
}

fn default_ledger_cap() -> usize {
    constants::LEDGER_CAP
}

fn default_ledger_evict() -> usize {
    constants::LEDGER_EVICT
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mirror_base_url: default_mirror_base_url(),
            agency_felt_url: default_agency_felt_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            min_magnitude: default_min_magnitude(),
            recency_minutes: default_recency_minutes(),
            ledger_cap: default_ledger_cap(),
            ledger_evict: default_ledger_evict(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from the given path, falling back to built-in defaults when the
    /// file does not exist. A present-but-malformed file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at '{}', using defaults", path.display());
            return Ok(Self::default().with_env_overrides());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    /// Environment beats file: GEMPA_MIRROR_BASE_URL redirects the mirror
    fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var("GEMPA_MIRROR_BASE_URL") {
            if !base.trim().is_empty() {
                self.feed.mirror_base_url = base.trim_end_matches('/').to_string();
            }
        }
        self
    }
}
