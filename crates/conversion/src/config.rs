//! Conversion configuration.
//!
//! Values come from, in increasing precedence: defaults, an optional YAML
//! file, `AREA_*` environment variables, and finally command-line flags
//! applied by the driver.

use area_common::CalibrationType;
use navigation::DEFAULT_PARALLEL_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConversionError, ConversionResult};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Output calibration type.
    pub cal_type: CalibrationType,

    /// Emit per-pixel latitude/longitude.
    pub include_navigation: bool,

    /// Use CF-convention attribute names and units.
    pub cf: bool,

    /// YAML calibration coefficient library.
    pub coefficients: Option<PathBuf>,

    /// Samples per line from which calibration and navigation run in parallel.
    pub parallel_threshold: usize,

    pub logging: LoggingConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            cal_type: CalibrationType::Radiance,
            include_navigation: true,
            cf: false,
            coefficients: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            logging: LoggingConfig::default(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl ConversionConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConversionResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConversionError::InvalidConfig(format!("Cannot read {:?}: {}", path, e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ConversionError::InvalidConfig(format!("Invalid YAML in {:?}: {}", path, e)))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> ConversionResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `AREA_*` environment overrides.
    pub fn apply_env(&mut self) -> ConversionResult<()> {
        if let Ok(val) = env::var("AREA_CAL_TYPE") {
            self.cal_type = val
                .parse()
                .map_err(|e| ConversionError::InvalidConfig(format!("AREA_CAL_TYPE: {}", e)))?;
        }

        if let Ok(val) = env::var("AREA_NAVIGATION") {
            self.include_navigation = parse_flag(&val);
        }

        if let Ok(val) = env::var("AREA_CF") {
            self.cf = parse_flag(&val);
        }

        if let Ok(val) = env::var("AREA_COEFFICIENTS") {
            self.coefficients = (!val.is_empty()).then(|| PathBuf::from(val));
        }

        if let Ok(val) = env::var("AREA_PARALLEL_THRESHOLD") {
            self.parallel_threshold = val.parse().map_err(|_| {
                ConversionError::InvalidConfig(format!(
                    "AREA_PARALLEL_THRESHOLD must be a positive integer, got {:?}",
                    val
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConversionResult<()> {
        if self.parallel_threshold == 0 {
            return Err(ConversionError::InvalidConfig(
                "parallel_threshold must be at least 1".to_string(),
            ));
        }
        if let Some(path) = &self.coefficients {
            if !path.is_file() {
                return Err(ConversionError::InvalidConfig(format!(
                    "coefficient library {:?} does not exist",
                    path
                )));
            }
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConversionError::InvalidConfig(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
