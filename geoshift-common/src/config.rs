//! Configuration loading and data folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; it is logged and the
//! defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_DIR_ENV: &str = "GEOSHIFT_DATA_DIR";

/// File name of the calibration document inside the data folder
pub const CALIBRATION_FILENAME: &str = "calibration.json";

const APP_DIR_NAME: &str = "geoshift";

/// Bootstrap configuration read from `config.toml`
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding `calibration.json`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Reverse-geocoding service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible service
    #[serde(default)]
    pub url: Option<String>,

    /// `accept-language` sent with lookups
    #[serde(default)]
    pub language: Option<String>,

    /// Delay before every lookup, in milliseconds
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Clipboard observation timing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub geocoder_url: String,
    pub geocoder_language: String,
    pub geocode_delay: Duration,
    pub poll_interval: Duration,
    pub wait_timeout: Duration,
}

/// Compiled defaults
pub mod defaults {
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 5002;
    pub const LOG_LEVEL: &str = "info";
    pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
    pub const GEOCODER_LANGUAGE: &str = "ru";
    pub const GEOCODE_DELAY_MS: u64 = 1200;
    pub const POLL_INTERVAL_MS: u64 = 100;
    pub const WAIT_TIMEOUT_MS: u64 = 1000;
}

impl Settings {
    /// Merge command-line overrides, environment and TOML over the defaults.
    pub fn resolve(overrides: &Overrides, toml: &TomlConfig) -> Self {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .or_else(|| toml.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        Self {
            data_dir,
            host: overrides
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| defaults::HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(defaults::PORT),
            log_level: overrides
                .log_level
                .clone()
                .or_else(|| toml.logging.level.clone())
                .unwrap_or_else(|| defaults::LOG_LEVEL.to_string()),
            geocoder_url: toml
                .geocoder
                .url
                .clone()
                .unwrap_or_else(|| defaults::GEOCODER_URL.to_string()),
            geocoder_language: toml
                .geocoder
                .language
                .clone()
                .unwrap_or_else(|| defaults::GEOCODER_LANGUAGE.to_string()),
            geocode_delay: Duration::from_millis(
                toml.geocoder.delay_ms.unwrap_or(defaults::GEOCODE_DELAY_MS),
            ),
            poll_interval: Duration::from_millis(
                toml.monitor.poll_interval_ms.unwrap_or(defaults::POLL_INTERVAL_MS),
            ),
            wait_timeout: Duration::from_millis(
                toml.monitor.wait_timeout_ms.unwrap_or(defaults::WAIT_TIMEOUT_MS),
            ),
        }
    }

    pub fn calibration_path(&self) -> PathBuf {
        self.data_dir.join(CALIBRATION_FILENAME)
    }

    /// Create the data folder if it does not exist.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
            info!("Created data folder: {}", self.data_dir.display());
        }
        Ok(())
    }
}

/// Read and parse a TOML config file.
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Where the TOML config came from
#[derive(Debug)]
pub enum ConfigSource {
    /// No file found; compiled defaults apply
    Defaults,
    Loaded(PathBuf),
    /// File missing or malformed; compiled defaults apply
    Ignored { path: PathBuf, reason: String },
}

/// Result of [`load_toml_config`]
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Report the outcome; call once logging is initialised.
    pub fn log(&self) {
        match &self.source {
            ConfigSource::Defaults => info!("No config file, using defaults"),
            ConfigSource::Loaded(path) => info!("Loaded config file: {}", path.display()),
            ConfigSource::Ignored { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
        }
    }
}

/// Load the explicit config file, or the platform default one if present.
///
/// A missing or malformed file falls back to an empty config. Nothing is
/// logged here since this runs before the subscriber exists.
pub fn load_toml_config(explicit: Option<&Path>) -> LoadedConfig {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                return LoadedConfig {
                    config: TomlConfig::default(),
                    source: ConfigSource::Defaults,
                }
            }
        },
    };

    match read_toml_config(&path) {
        Ok(config) => LoadedConfig {
            config,
            source: ConfigSource::Loaded(path),
        },
        Err(e) => LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Ignored {
                path,
                reason: e.to_string(),
            },
        },
    }
}

/// `<config_dir>/geoshift/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./geoshift_data"))
}
