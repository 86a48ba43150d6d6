//! Configuration module for SerialVis
//!
//! This module handles application configuration including:
//! - Acquisition cadences, retention horizon and input validation
//! - Plot and export behaviour
//! - Log sink settings
//!
//! # Config Location
//!
//! The configuration file is read from the platform config directory under
//! `dev.serialvis`:
//!
//! - **Linux**: `~/.config/dev.serialvis/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.serialvis/config.toml`
//! - **Windows**: `%APPDATA%\dev.serialvis\config.toml`
//!
//! A missing file is not an error; defaults reproduce the behaviour of the
//! reference acquisition tool (10ms poll, 100ms render, 120s window).
//!
//! # Example
//!
//! ```ignore
//! use serialvis::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! assert_eq!(config.acquisition.horizon_secs, 120);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, SerialVisError};
use crate::types::BaudRate;
use chrono::format::{Item, StrftimeItems};
use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config directories
pub const APP_ID: &str = "dev.serialvis";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default serial poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default render tick interval in milliseconds
pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 100;

/// Default port enumeration interval in milliseconds
pub const DEFAULT_PORT_SCAN_INTERVAL_MS: u64 = 1000;

/// Default retention horizon of the sample window in seconds
pub const DEFAULT_HORIZON_SECS: u64 = 120;

/// Longest accepted window horizon (one week)
pub const MAX_HORIZON_SECS: u64 = 7 * 24 * 60 * 60;

/// Default timeout handed to the serial driver in milliseconds
pub const DEFAULT_OPEN_TIMEOUT_MS: u64 = 100;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,serialvis=debug";

/// Log file name written by the file sink
pub const LOG_FILE_NAME: &str = "serialvis.log";

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Serial polling and window settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Plot display settings
    #[serde(default)]
    pub plot: PlotConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Log sink settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SerialVisError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            SerialVisError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        match config_path() {
            Some(path) => Self::load_from_or_default(path),
            None => {
                tracing::debug!("No config directory on this platform; using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults if the file is absent or invalid
    pub fn load_from_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {:?} not found; using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SerialVisError::Config(format!(
                        "Failed to create config directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SerialVisError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            SerialVisError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Reject values the scheduler or window cannot work with
    pub fn validate(&self) -> Result<()> {
        let acq = &self.acquisition;
        if acq.poll_interval_ms == 0 || acq.render_interval_ms == 0 || acq.port_scan_interval_ms == 0
        {
            return Err(SerialVisError::Config(
                "Task intervals must be greater than zero".to_string(),
            ));
        }
        if acq.horizon_secs == 0 {
            return Err(SerialVisError::Config(
                "Window horizon must be greater than zero".to_string(),
            ));
        }
        if acq.horizon_secs > MAX_HORIZON_SECS {
            return Err(SerialVisError::Config(format!(
                "Window horizon of {}s exceeds the {}s limit",
                acq.horizon_secs, MAX_HORIZON_SECS
            )));
        }
        if let Some(range) = acq.value_range {
            if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                return Err(SerialVisError::Config(format!(
                    "Invalid value range: {} > {}",
                    range.min, range.max
                )));
            }
        }
        if StrftimeItems::new(&self.plot.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(SerialVisError::Config(format!(
                "Invalid time format: {:?}",
                self.plot.time_format
            )));
        }
        if let YAxisMode::Fixed { min, max } = self.plot.y_axis {
            if min.is_nan() || max.is_nan() || min >= max {
                return Err(SerialVisError::Config(format!(
                    "Invalid fixed Y axis: {} >= {}",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

// ==================== Acquisition Config ====================

/// Serial acquisition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Serial poll cadence in milliseconds
    pub poll_interval_ms: u64,

    /// Render tick cadence in milliseconds
    pub render_interval_ms: u64,

    /// Port enumeration cadence in milliseconds
    pub port_scan_interval_ms: u64,

    /// Retention horizon of the sample window in seconds
    pub horizon_secs: u64,

    /// Read timeout handed to the serial driver in milliseconds
    pub open_timeout_ms: u64,

    /// How pending values are committed on each render tick
    pub pending_policy: PendingPolicy,

    /// Time zone used to stamp samples and format the time axis
    pub time_zone: Tz,

    /// Baud rate selected at startup
    pub default_baud: BaudRate,

    /// Offer the synthetic `mock://sine` port alongside real devices
    pub mock_port: bool,

    /// Reject values outside this range (disabled when absent)
    pub value_range: Option<ValueRange>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            render_interval_ms: DEFAULT_RENDER_INTERVAL_MS,
            port_scan_interval_ms: DEFAULT_PORT_SCAN_INTERVAL_MS,
            horizon_secs: DEFAULT_HORIZON_SECS,
            open_timeout_ms: DEFAULT_OPEN_TIMEOUT_MS,
            pending_policy: PendingPolicy::default(),
            time_zone: chrono_tz::America::New_York,
            default_baud: BaudRate::default(),
            mock_port: cfg!(feature = "mock-serial"),
            value_range: None,
        }
    }
}

impl AcquisitionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    pub fn port_scan_interval(&self) -> Duration {
        Duration::from_millis(self.port_scan_interval_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    /// Retention horizon as a chrono delta (for timestamp arithmetic)
    ///
    /// Clamped to [`MAX_HORIZON_SECS`]; `validate` rejects larger values.
    pub fn horizon(&self) -> TimeDelta {
        i64::try_from(self.horizon_secs.min(MAX_HORIZON_SECS))
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or_else(|| TimeDelta::seconds(DEFAULT_HORIZON_SECS as i64))
    }
}

// ==================== Plot Config ====================

/// Plot display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    /// strftime pattern for time-axis tick labels
    pub time_format: String,

    /// Line width in points
    pub line_width: f32,

    /// Value axis scaling
    pub y_axis: YAxisMode,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            time_format: "%I:%M:%S".to_string(),
            line_width: 2.0,
            y_axis: YAxisMode::Auto,
        }
    }
}

// ==================== Export Config ====================

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the dated CSV file is written into
    pub directory: PathBuf,

    /// Which samples are exported
    pub scope: ExportScope,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            scope: ExportScope::default(),
        }
    }
}

// ==================== Logging Config ====================

/// Log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to [`LOG_FILE_NAME`] in `directory`
    pub file_enabled: bool,

    /// Directory for the log file
    pub directory: PathBuf,

    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: true,
            directory: PathBuf::from("."),
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
