//! Error types for calibration.

use area_common::CalibrationType;
use thiserror::Error;

/// Result type alias using CalibrationError.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

#[derive(Debug, Error)]
pub enum CalibrationError {
    /// No coefficients exist for a band present in the image. Fatal for
    /// the image: there is no valid calibration to fall back to.
    #[error("No calibration coefficients for band {band} of {platform}")]
    UnknownBand { band: u32, platform: String },

    /// A calibrated GOES sensor whose platform has no coefficient table.
    #[error("No calibration coefficients for {platform}; only RAW output is available")]
    MissingPlatform { platform: String },

    /// Samples stored in one calibrated unit cannot be turned into another.
    #[error("Samples are stored as {from} and cannot be converted to {to}")]
    Unconvertible {
        from: CalibrationType,
        to: CalibrationType,
    },

    #[error("Failed to read coefficient library: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid coefficient library: {0}")]
    Library(#[from] serde_yaml::Error),

    #[error("Invalid coefficients for {platform} band {band}: {reason}")]
    InvalidCoefficients {
        platform: String,
        band: u32,
        reason: String,
    },
}
