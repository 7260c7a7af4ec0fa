//! Application configuration
//!
//! Loaded from a TOML file named by `CLIMA_CONFIG` (default
//! `config.toml`); every field has a usable default so an absent file
//! still yields a runnable configuration. Analysis thresholds live here
//! rather than as constants so the engine stays regionally adaptable.

use clima_core::SeasonMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory holding the cached per-city daily JSON payloads
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How far back from today the analysis range reaches
    #[serde(default = "default_history_days")]
    pub history_days: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_days: default_history_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Trailing baseline window for anomaly detection, in observations
    #[serde(default = "default_anomaly_window")]
    pub anomaly_window: usize,

    /// Anomaly threshold in standard deviations of the baseline window
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,

    /// Days of temperature to project forward
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: i32,

    /// Trailing window the forecast trend is fitted over
    #[serde(default = "default_forecast_trailing_days")]
    pub forecast_trailing_days: usize,

    /// Percentile defining an extreme spell
    #[serde(default = "default_spell_percentile")]
    pub spell_percentile: f64,

    /// Shortest spell worth reporting, in consecutive days
    #[serde(default = "default_spell_min_run")]
    pub spell_min_run: usize,

    /// Month-to-season assignment for the seasonal aggregator
    #[serde(default)]
    pub season_map: SeasonMap,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            anomaly_window: default_anomaly_window(),
            anomaly_threshold: default_anomaly_threshold(),
            forecast_horizon: default_forecast_horizon(),
            forecast_trailing_days: default_forecast_trailing_days(),
            spell_percentile: default_spell_percentile(),
            spell_min_run: default_spell_min_run(),
            season_map: SeasonMap::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cities: Vec<CityConfig>,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Directory for exported CSV tables
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            fetch: FetchConfig::default(),
            analysis: AnalysisSettings::default(),
            export_dir: default_export_dir(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from CLIMA_CONFIG path (TOML) if present
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CLIMA_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let cfg = if Path::new(&path).exists() {
            let s = fs::read_to_string(&path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_history_days() -> u64 {
    365
}

fn default_export_dir() -> String {
    "exports".to_string()
}

fn default_anomaly_window() -> usize {
    3
}

fn default_anomaly_threshold() -> f64 {
    2.0
}

fn default_forecast_horizon() -> i32 {
    5
}

fn default_forecast_trailing_days() -> usize {
    14
}

fn default_spell_percentile() -> f64 {
    90.0
}

fn default_spell_min_run() -> usize {
    2
}
