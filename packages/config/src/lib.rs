#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard control configuration.
//!
//! The default configuration is embedded at compile time from
//! `dashboard.toml` via [`include_str!`]. A different file can be supplied
//! at runtime through the [`CONFIG_ENV`] environment variable, and the
//! dataset path alone can be overridden with [`DATA_ENV`].
//!
//! Every operator control is a bounded [`Slider`] or the fixed list of
//! [`Periods`]; request values are checked against them before they reach
//! the dataset filter or the proximity engine.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crime_watch_incident_models::{GeoPoint, PoliceStation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a TOML file that replaces the embedded
/// configuration.
pub const CONFIG_ENV: &str = "CRIME_WATCH_CONFIG";

/// Environment variable overriding [`DashboardConfig::data_path`].
pub const DATA_ENV: &str = "CRIME_WATCH_DATA";

const EMBEDDED_CONFIG: &str = include_str!("../dashboard.toml");

/// Errors that can occur while loading or applying the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed or missing required fields.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A control value fell outside its slider bounds.
    #[error("{control} value {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        /// Name of the control.
        control: &'static str,
        /// Rejected value.
        value: String,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },

    /// The period is not one of the selectable options.
    #[error("Unsupported period of {days} days: expected one of {options:?}")]
    UnsupportedPeriod {
        /// Rejected period.
        days: u32,
        /// Selectable periods.
        options: Vec<u32>,
    },

    /// The configuration is internally inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A bounded numeric control.
///
/// Only the range is enforced. `step` is the granularity a UI should offer
/// and is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slider<T> {
    /// Smallest accepted value.
    pub min: T,
    /// Largest accepted value.
    pub max: T,
    /// UI step size.
    pub step: T,
    /// Value used when the operator has not set one.
    pub default: T,
}

impl<T: PartialOrd + Copy + Display> Slider<T> {
    /// Returns `value` if it lies within `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] otherwise (including `NaN`).
    pub fn validate(&self, control: &'static str, value: T) -> Result<T, ConfigError> {
        if value >= self.min && value <= self.max {
            Ok(value)
        } else {
            Err(ConfigError::OutOfRange {
                control,
                value: value.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            })
        }
    }

    /// Validates `value` when given, otherwise returns the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for an out-of-range value.
    pub fn resolve(&self, control: &'static str, value: Option<T>) -> Result<T, ConfigError> {
        value.map_or(Ok(self.default), |v| self.validate(control, v))
    }

    fn check(&self, control: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::Invalid(format!(
                "{control}: min {} is greater than max {}",
                self.min, self.max
            )));
        }
        self.validate(control, self.default).map(|_| ()).map_err(|_| {
            ConfigError::Invalid(format!(
                "{control}: default {} is outside {}..={}",
                self.default, self.min, self.max
            ))
        })
    }
}

/// All operator sliders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// How many of the newest incidents to consider.
    pub incident_count: Slider<u32>,
    /// Alert radius around the reference point, in meters.
    pub alert_radius_m: Slider<f64>,
    /// Patrol radius around each police station, in meters.
    pub patrol_radius_m: Slider<f64>,
}

/// Look-back window choices, in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periods {
    /// Selectable periods.
    pub options: Vec<u32>,
    /// Period used when none is selected.
    pub default: u32,
}

impl Periods {
    /// Returns `days` if it is one of the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPeriod`] otherwise.
    pub fn validate(&self, days: u32) -> Result<u32, ConfigError> {
        if self.options.contains(&days) {
            Ok(days)
        } else {
            Err(ConfigError::UnsupportedPeriod {
                days,
                options: self.options.clone(),
            })
        }
    }

    /// Validates `days` when given, otherwise returns the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPeriod`] for an unknown period.
    pub fn resolve(&self, days: Option<u32>) -> Result<u32, ConfigError> {
        days.map_or(Ok(self.default), |d| self.validate(d))
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// Map center.
    pub center: GeoPoint,
    /// Initial zoom level.
    pub zoom: u8,
}

/// Which optional map layers are shown by default.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layers {
    /// Draw the operator's alert circle.
    pub alert_circle: bool,
    /// Draw police patrol circles.
    pub coverage: bool,
    /// Show the mini-map.
    pub minimap: bool,
    /// Show the legend.
    pub legend: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            alert_circle: true,
            coverage: true,
            minimap: true,
            legend: true,
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Path of the incident CSV.
    pub data_path: PathBuf,
    /// How long a loaded dataset stays fresh, in seconds.
    pub cache_ttl_secs: u64,
    /// Number of categories pre-selected when the operator has not chosen.
    pub default_category_count: usize,
    /// Categories drawn and counted as violent.
    pub violent_categories: Vec<String>,
    /// Initial map viewport.
    pub map: MapSettings,
    /// Default reference point.
    pub reference: GeoPoint,
    /// Operator sliders.
    pub controls: Controls,
    /// Look-back window choices.
    pub periods: Periods,
    /// Default layer toggles.
    #[serde(default)]
    pub layers: Layers,
    /// Simulated police bases.
    #[serde(default)]
    pub stations: Vec<PoliceStation>,
}

impl DashboardConfig {
    /// Parses and validates a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for inconsistent values.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`Self::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Returns the configuration embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time guarantee
    /// since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded dashboard.toml: {e}"))
    }

    /// Loads the configuration named by [`CONFIG_ENV`], or the embedded
    /// one, then applies the [`DATA_ENV`] override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the override file cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data_path = std::env::var_os(DATA_ENV).map(PathBuf::from);
        Self::load_from(config_path.as_deref(), data_path)
    }

    /// Loads the configuration from `config_path`, or the embedded one when
    /// `None`, then replaces [`Self::data_path`] with `data_path` if given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be loaded.
    pub fn load_from(
        config_path: Option<&Path>,
        data_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                log::info!("Loading dashboard config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::from_toml_str(EMBEDDED_CONFIG)?,
        };

        if let Some(data_path) = data_path {
            log::info!("Using dataset at {}", data_path.display());
            config.data_path = data_path;
        }

        Ok(config)
    }

    /// Dataset cache lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Returns `true` if `category` is drawn and counted as violent.
    #[must_use]
    pub fn is_violent(&self, category: &str) -> bool {
        self.violent_categories.iter().any(|c| c == category)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controls.incident_count.check("incident_count")?;
        self.controls.alert_radius_m.check("alert_radius_m")?;
        self.controls.patrol_radius_m.check("patrol_radius_m")?;

        if self.controls.incident_count.min == 0 {
            return Err(ConfigError::Invalid(
                "incident_count: min must be at least 1".to_string(),
            ));
        }
        if self.controls.alert_radius_m.min < 0.0 || self.controls.patrol_radius_m.min < 0.0 {
            return Err(ConfigError::Invalid(
                "radius sliders must not allow negative values".to_string(),
            ));
        }

        if self.periods.options.is_empty() {
            return Err(ConfigError::Invalid("periods: no options".to_string()));
        }
        if !self.periods.options.contains(&self.periods.default) {
            return Err(ConfigError::Invalid(format!(
                "periods: default {} is not one of {:?}",
                self.periods.default, self.periods.options
            )));
        }

        if !self.reference.is_finite() || !self.map.center.is_finite() {
            return Err(ConfigError::Invalid(
                "reference and map center must be finite".to_string(),
            ));
        }

        if let Some(station) = self.stations.iter().find(|s| !s.location.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "station '{}' has a non-finite location",
                station.name
            )));
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
