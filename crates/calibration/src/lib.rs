//! Radiometric calibration of raw sensor counts.
//!
//! [`CalibrationModel`] is chosen once per image from the sensor source
//! number. GOES platforms of the GVAR era are calibrated with coefficients
//! from a [`CoefficientLibrary`]; every other sensor passes raw values
//! through unchanged.

pub mod coefficients;
pub mod error;
pub mod gvar;
pub mod model;

pub use coefficients::{BandCoefficients, CoefficientLibrary, PlatformCoefficients};
pub use error::{CalibrationError, CalibrationResult};
pub use gvar::GvarCalibrator;
pub use model::{platform_name, CalibrationModel, Fallback};
