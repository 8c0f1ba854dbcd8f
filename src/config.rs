//! Configuration management and validation.
//!
//! Provides configuration structures for the upstream sources, fetch
//! behaviour, the two catastrophe jobs and the result store, loaded in layers:
//! built-in defaults, then a TOML file, then environment variables, then
//! command-line overrides.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_MAX_WORKERS, DEFAULT_START_DAY, DEFAULT_START_MONTH,
    DEFAULT_START_YEAR, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEPLETION_CATASTROPHE_NAME,
    DEPLETION_DESCRIPTION, ENV_MAX_WORKERS, ENV_STORE_PATH, MAX_WORKERS_LIMIT, MIAMI_ELEVATION_MM,
    RESERVOIR_LISTING_URL, SEA_LEVEL_URL, STATION_CSV_URL, STORE_FILE_NAME,
    SUBMERSION_CATASTROPHE_NAME, SUBMERSION_DESCRIPTION,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upstream document locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// HTML table of reporting reservoirs
    pub reservoir_listing_url: String,

    /// Daily CSV export endpoint (query string is appended per station)
    pub station_csv_url: String,

    /// Global mean sea level text file
    pub sea_level_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            reservoir_listing_url: RESERVOIR_LISTING_URL.to_string(),
            station_csv_url: STATION_CSV_URL.to_string(),
            sea_level_url: SEA_LEVEL_URL.to_string(),
        }
    }
}

/// HTTP client and worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Upper bound on concurrent station fetches
    pub max_workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// How per-station series become one depletion date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DepletionStrategy {
    /// Sum all stations by date, fit once, extrapolate once
    #[default]
    Aggregate,
    /// Fit every station, report the latest crossing still in the future
    LatestPerStation,
}

impl std::fmt::Display for DepletionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepletionStrategy::Aggregate => write!(f, "aggregate"),
            DepletionStrategy::LatestPerStation => write!(f, "latest-per-station"),
        }
    }
}

/// Reservoir depletion job settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirConfig {
    pub catastrophe_name: String,

    pub description: String,

    /// First day requested from every station
    pub start_date: NaiveDate,

    /// Station codes left out of discovery (constant or noisy gauges)
    pub excluded_stations: Vec<String>,

    pub strategy: DepletionStrategy,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            catastrophe_name: DEPLETION_CATASTROPHE_NAME.to_string(),
            description: DEPLETION_DESCRIPTION.to_string(),
            start_date: NaiveDate::from_ymd_opt(
                DEFAULT_START_YEAR,
                DEFAULT_START_MONTH,
                DEFAULT_START_DAY,
            )
            .unwrap_or_default(),
            excluded_stations: Vec::new(),
            strategy: DepletionStrategy::default(),
        }
    }
}

/// Coastal submersion job settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastalConfig {
    pub catastrophe_name: String,

    pub description: String,

    /// Elevation the sea must rise to, in millimetres
    pub elevation_mm: f64,
}

impl Default for CoastalConfig {
    fn default() -> Self {
        Self {
            catastrophe_name: SUBMERSION_CATASTROPHE_NAME.to_string(),
            description: SUBMERSION_DESCRIPTION.to_string(),
            elevation_mm: MIAMI_ELEVATION_MM,
        }
    }
}

/// Result store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join(APP_DIR_NAME).join(STORE_FILE_NAME),
        }
    }
}

/// Complete configuration for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub fetch: FetchConfig,
    pub reservoir: ReservoirConfig,
    pub coastal: CoastalConfig,
    pub store: StoreConfig,
}

impl Config {
    /// `<config_dir>/catastrophe-clock/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the optional file, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides store path: {}", ENV_STORE_PATH, path);
            self.store.path = PathBuf::from(path);
        }

        if let Some(workers) = lookup(ENV_MAX_WORKERS) {
            self.fetch.max_workers = workers.trim().parse().map_err(|_| {
                Error::configuration(format!("{} must be a number, got '{}'", ENV_MAX_WORKERS, workers))
            })?;
        }

        Ok(())
    }

    /// Check the configuration for values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("sources.reservoir_listing_url", &self.sources.reservoir_listing_url),
            ("sources.station_csv_url", &self.sources.station_csv_url),
            ("sources.sea_level_url", &self.sources.sea_level_url),
        ] {
            if url.trim().is_empty() {
                return Err(Error::configuration(format!("{} cannot be empty", name)));
            }
        }

        if self.fetch.max_workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.fetch.max_workers > MAX_WORKERS_LIMIT {
            return Err(Error::configuration(format!(
                "Number of workers cannot exceed {}",
                MAX_WORKERS_LIMIT
            )));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(Error::configuration("Request timeout must be greater than 0"));
        }

        if !self.coastal.elevation_mm.is_finite() || self.coastal.elevation_mm <= 0.0 {
            return Err(Error::configuration(format!(
                "Coastal elevation must be positive, got {}",
                self.coastal.elevation_mm
            )));
        }

        if self.reservoir.catastrophe_name.trim().is_empty()
            || self.coastal.catastrophe_name.trim().is_empty()
        {
            return Err(Error::configuration("Catastrophe names cannot be empty"));
        }

        Ok(())
    }
}
