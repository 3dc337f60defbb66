//! Per-platform calibration coefficient library.
//!
//! Coefficients are an external input, loaded from YAML:
//!
//! ```yaml
//! platforms:
//!   GOES-8:
//!     count_scale: 32
//!     bands:
//!       1:
//!         kind: visible
//!         gain: 0.5501873
//!         offset: -15.3
//!         albedo_factor: 0.00192979
//!       4:
//!         kind: infrared
//!         gain: 5.2285
//!         offset: 15.6854
//!         wavenumber: 934.30
//!         c1: 1.191066e-5
//!         c2: 1.438833
//!         bc1: -0.322585
//!         bc2: 1.001271
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{CalibrationError, CalibrationResult};

/// Coefficients for one spectral band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BandCoefficients {
    /// Reflective band: radiance is linear in counts.
    Visible {
        gain: f64,
        offset: f64,
        /// Radiance to fractional albedo
        albedo_factor: f64,
    },
    /// Emissive band: radiance is linear in counts, temperature follows the
    /// inverse Planck function with a band correction.
    Infrared {
        gain: f64,
        offset: f64,
        /// Central wavenumber, cm-1
        wavenumber: f64,
        c1: f64,
        c2: f64,
        bc1: f64,
        bc2: f64,
    },
}

impl BandCoefficients {
    fn gain(&self) -> f64 {
        match self {
            BandCoefficients::Visible { gain, .. } | BandCoefficients::Infrared { gain, .. } => {
                *gain
            }
        }
    }
}

fn default_count_scale() -> f64 {
    1.0
}

/// Coefficients for every band of one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformCoefficients {
    /// Divisor from stored sample values to instrument counts.
    #[serde(default = "default_count_scale")]
    pub count_scale: f64,
    pub bands: BTreeMap<u32, BandCoefficients>,
}

/// Coefficient tables keyed by platform name, e.g. `GOES-8`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientLibrary {
    #[serde(default)]
    pub platforms: HashMap<String, PlatformCoefficients>,
}

impl CoefficientLibrary {
    /// Parse and validate a library from YAML text.
    pub fn from_yaml_str(yaml: &str) -> CalibrationResult<Self> {
        let library: CoefficientLibrary = serde_yaml::from_str(yaml)?;
        library.validate()?;
        Ok(library)
    }

    /// Load a library from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> CalibrationResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let library = Self::from_yaml_str(&contents)?;
        debug!(
            path = %path.display(),
            platforms = library.platforms.len(),
            "Loaded calibration coefficients"
        );
        Ok(library)
    }

    pub fn platform(&self, name: &str) -> Option<&PlatformCoefficients> {
        self.platforms.get(name)
    }

    /// Reject tables that would divide by zero or produce no numbers.
    pub fn validate(&self) -> CalibrationResult<()> {
        for (platform, coefficients) in &self.platforms {
            let invalid = |band: u32, reason: &str| CalibrationError::InvalidCoefficients {
                platform: platform.clone(),
                band,
                reason: reason.to_string(),
            };

            if !coefficients.count_scale.is_finite() || coefficients.count_scale <= 0.0 {
                return Err(invalid(0, "count_scale must be positive"));
            }
            for (&band, table) in &coefficients.bands {
                let gain = table.gain();
                if !gain.is_finite() || gain == 0.0 {
                    return Err(invalid(band, "gain must be finite and non-zero"));
                }
                if let BandCoefficients::Infrared {
                    wavenumber, bc2, ..
                } = table
                {
                    if *wavenumber <= 0.0 || *bc2 == 0.0 {
                        return Err(invalid(band, "wavenumber and bc2 must be non-zero"));
                    }
                }
            }
        }
        Ok(())
    }
}
