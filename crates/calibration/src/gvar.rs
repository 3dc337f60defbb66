//! GVAR-era GOES imager and sounder calibration.

use area_common::CalibrationType;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::coefficients::{BandCoefficients, PlatformCoefficients};
use crate::error::{CalibrationError, CalibrationResult};

/// Number of integral raw values covered by a brightness table.
pub const LUT_SIZE: usize = 1 << 16;

/// Calibrates raw GVAR counts with one platform's coefficient table.
#[derive(Debug, Clone)]
pub struct GvarCalibrator {
    platform: String,
    count_scale: f64,
    bands: BTreeMap<u32, BandCoefficients>,
    cal_type: CalibrationType,
    /// Brightness per integral raw value, built on demand
    brightness_lut: HashMap<u32, Vec<u8>>,
}

impl GvarCalibrator {
    pub fn new(platform: impl Into<String>, coefficients: &PlatformCoefficients) -> Self {
        Self {
            platform: platform.into(),
            count_scale: coefficients.count_scale,
            bands: coefficients.bands.clone(),
            cal_type: CalibrationType::default(),
            brightness_lut: HashMap::new(),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn cal_type(&self) -> CalibrationType {
        self.cal_type
    }

    /// Band numbers with coefficients.
    pub fn bands(&self) -> Vec<u32> {
        self.bands.keys().copied().collect()
    }

    /// Fail with [`CalibrationError::UnknownBand`] for the first band without
    /// coefficients.
    pub fn check_bands(&self, bands: &[u32]) -> CalibrationResult<()> {
        match bands.iter().find(|b| !self.bands.contains_key(b)) {
            Some(&band) => Err(CalibrationError::UnknownBand {
                band,
                platform: self.platform.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Select the output convention. Brightness builds a lookup table per band.
    pub fn set_cal_type(&mut self, cal_type: CalibrationType) {
        self.cal_type = cal_type;
        if cal_type != CalibrationType::Brightness || !self.brightness_lut.is_empty() {
            return;
        }

        for (&band, coefficients) in &self.bands {
            let table = (0..LUT_SIZE)
                .map(|raw| brightness(coefficients, raw as f64 / self.count_scale) as u8)
                .collect();
            self.brightness_lut.insert(band, table);
        }
        debug!(
            platform = %self.platform,
            bands = self.brightness_lut.len(),
            "Built brightness lookup tables"
        );
    }

    pub fn calibrate(
        &self,
        raw: f32,
        band: u32,
        output: CalibrationType,
    ) -> CalibrationResult<f32> {
        if output == CalibrationType::Raw {
            return Ok(raw);
        }

        let coefficients = self
            .bands
            .get(&band)
            .ok_or_else(|| CalibrationError::UnknownBand {
                band,
                platform: self.platform.clone(),
            })?;

        if output == CalibrationType::Brightness {
            if let Some(table) = self.brightness_lut.get(&band) {
                if raw >= 0.0 && raw.fract() == 0.0 && (raw as usize) < LUT_SIZE {
                    return Ok(table[raw as usize] as f32);
                }
            }
        }

        let count = raw as f64 / self.count_scale;
        let value = match output {
            CalibrationType::Radiance => radiance(coefficients, count),
            CalibrationType::Temperature => temperature(coefficients, count),
            CalibrationType::Albedo => albedo(coefficients, count),
            CalibrationType::Brightness => brightness(coefficients, count),
            CalibrationType::Raw => raw as f64,
        };
        Ok(value as f32)
    }
}

fn radiance(coefficients: &BandCoefficients, count: f64) -> f64 {
    match *coefficients {
        BandCoefficients::Visible { gain, offset, .. } => gain * count + offset,
        BandCoefficients::Infrared { gain, offset, .. } => (count - offset) / gain,
    }
}

/// Brightness temperature in Kelvin from the inverse Planck function.
fn temperature(coefficients: &BandCoefficients, count: f64) -> f64 {
    match *coefficients {
        BandCoefficients::Visible { .. } => f64::NAN,
        BandCoefficients::Infrared {
            wavenumber,
            c1,
            c2,
            bc1,
            bc2,
            ..
        } => {
            let r = radiance(coefficients, count);
            if r <= 0.0 {
                return f64::NAN;
            }
            let effective = c2 * wavenumber / (1.0 + c1 * wavenumber.powi(3) / r).ln();
            bc1 + bc2 * effective
        }
    }
}

/// Albedo in percent.
fn albedo(coefficients: &BandCoefficients, count: f64) -> f64 {
    match *coefficients {
        BandCoefficients::Visible { albedo_factor, .. } => {
            albedo_factor * radiance(coefficients, count) * 100.0
        }
        BandCoefficients::Infrared { .. } => f64::NAN,
    }
}

/// Display brightness 0..=255.
fn brightness(coefficients: &BandCoefficients, count: f64) -> f64 {
    let value = match coefficients {
        BandCoefficients::Visible { .. } => 25.5 * albedo(coefficients, count).max(0.0).sqrt(),
        BandCoefficients::Infrared { .. } => {
            let t = temperature(coefficients, count);
            if t.is_nan() {
                return 0.0;
            }
            if t <= 242.0 {
                418.0 - t
            } else {
                660.0 - 2.0 * t
            }
        }
    };
    value.round().clamp(0.0, 255.0)
}
