//! Sensor-family dispatch for calibration.

use area_common::{CalibrationType, GoesInstrument, SensorFamily, SensorId};
use rayon::prelude::*;
use std::fmt;
use tracing::{info, warn};

use crate::coefficients::CoefficientLibrary;
use crate::error::{CalibrationError, CalibrationResult};
use crate::gvar::GvarCalibrator;

/// Why the GVAR count calibrator was not chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    None,
    NoCalibrationBlock,
    UnrecognisedSensor,
    MissingCoefficients { platform: String },
    /// Samples were stored already calibrated
    Stored { stored: CalibrationType },
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::None => write!(f, "none"),
            Fallback::NoCalibrationBlock => write!(f, "image has no calibration block"),
            Fallback::UnrecognisedSensor => write!(f, "sensor has no calibration model"),
            Fallback::MissingCoefficients { platform } => {
                write!(f, "no coefficients for {} in the library", platform)
            }
            Fallback::Stored { stored } => write!(f, "samples stored as {}", stored),
        }
    }
}

/// Converts raw counts to the requested physical unit.
#[derive(Debug, Clone)]
pub enum CalibrationModel {
    /// Returns raw values unchanged for every output type.
    Passthrough { cal_type: CalibrationType },
    /// Samples already in `stored` units. Only `stored` and `Raw` can be
    /// produced, both by returning the sample unchanged.
    Stored {
        stored: CalibrationType,
        cal_type: CalibrationType,
    },
    /// GOES platform missing from the coefficient library. Only `Raw` can
    /// be produced.
    Uncalibrated {
        platform: String,
        cal_type: CalibrationType,
    },
    Gvar(GvarCalibrator),
}

/// Coefficient library name of a GOES platform.
pub fn platform_name(satellite: u8, instrument: GoesInstrument) -> String {
    match instrument {
        GoesInstrument::Imager => format!("GOES-{}", satellite),
        GoesInstrument::Sounder => format!("GOES-{} Sounder", satellite),
    }
}

impl CalibrationModel {
    pub fn passthrough() -> Self {
        CalibrationModel::Passthrough {
            cal_type: CalibrationType::default(),
        }
    }

    /// Pick the calibration variant for an image.
    ///
    /// `stored` is the calibration type the directory declares for the
    /// samples; `None` and `Raw` both mean raw counts.
    pub fn for_sensor(
        sensor: SensorId,
        stored: Option<CalibrationType>,
        has_cal_block: bool,
        library: &CoefficientLibrary,
    ) -> (Self, Fallback) {
        let cal_type = CalibrationType::default();
        let (model, fallback) = match (stored, sensor.family()) {
            (Some(stored), _) if stored != CalibrationType::Raw => (
                CalibrationModel::Stored { stored, cal_type },
                Fallback::Stored { stored },
            ),
            _ if !has_cal_block => (Self::passthrough(), Fallback::NoCalibrationBlock),
            (_, SensorFamily::Other) => (Self::passthrough(), Fallback::UnrecognisedSensor),
            (
                _,
                SensorFamily::Goes {
                    satellite,
                    instrument,
                },
            ) => {
                let platform = platform_name(satellite, instrument);
                match library.platform(&platform) {
                    Some(coefficients) => (
                        CalibrationModel::Gvar(GvarCalibrator::new(platform, coefficients)),
                        Fallback::None,
                    ),
                    None => (
                        CalibrationModel::Uncalibrated {
                            platform: platform.clone(),
                            cal_type,
                        },
                        Fallback::MissingCoefficients { platform },
                    ),
                }
            }
        };

        match &fallback {
            Fallback::MissingCoefficients { platform } => warn!(
                sensor = %sensor,
                platform = %platform,
                "No calibration coefficients, only RAW output is available"
            ),
            _ => info!(
                sensor = %sensor,
                model = model.name(),
                reason = %fallback,
                "Calibration selected"
            ),
        }
        (model, fallback)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CalibrationModel::Passthrough { .. } => "passthrough",
            CalibrationModel::Stored { .. } => "stored",
            CalibrationModel::Uncalibrated { .. } => "uncalibrated",
            CalibrationModel::Gvar(_) => "gvar",
        }
    }

    pub fn cal_type(&self) -> CalibrationType {
        match self {
            CalibrationModel::Passthrough { cal_type }
            | CalibrationModel::Stored { cal_type, .. }
            | CalibrationModel::Uncalibrated { cal_type, .. } => *cal_type,
            CalibrationModel::Gvar(gvar) => gvar.cal_type(),
        }
    }

    pub fn set_cal_type(&mut self, cal_type: CalibrationType) {
        match self {
            CalibrationModel::Passthrough { cal_type: current }
            | CalibrationModel::Stored {
                cal_type: current, ..
            }
            | CalibrationModel::Uncalibrated {
                cal_type: current, ..
            } => *current = cal_type,
            CalibrationModel::Gvar(gvar) => gvar.set_cal_type(cal_type),
        }
    }

    /// Check `output` can be produced for every band. Raw never needs
    /// coefficients.
    pub fn check_bands(&self, bands: &[u32], output: CalibrationType) -> CalibrationResult<()> {
        match self {
            CalibrationModel::Gvar(gvar) if output != CalibrationType::Raw => {
                gvar.check_bands(bands)
            }
            _ => self.check_output(output),
        }
    }

    fn check_output(&self, output: CalibrationType) -> CalibrationResult<()> {
        match self {
            CalibrationModel::Stored { stored, .. }
                if output != *stored && output != CalibrationType::Raw =>
            {
                Err(CalibrationError::Unconvertible {
                    from: *stored,
                    to: output,
                })
            }
            CalibrationModel::Uncalibrated { platform, .. } if output != CalibrationType::Raw => {
                Err(CalibrationError::MissingPlatform {
                    platform: platform.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn calibrate(
        &self,
        raw: f32,
        band: u32,
        output: CalibrationType,
    ) -> CalibrationResult<f32> {
        match self {
            CalibrationModel::Passthrough { .. } => Ok(raw),
            CalibrationModel::Stored { .. } | CalibrationModel::Uncalibrated { .. } => {
                self.check_output(output)?;
                Ok(raw)
            }
            CalibrationModel::Gvar(gvar) => gvar.calibrate(raw, band, output),
        }
    }

    /// Calibrate one decoded line to the selected output type.
    ///
    /// `raw` holds `sample[band + element * bands.len()]`; `out` gets the
    /// same layout. Lines of at least `parallel_threshold` samples are split
    /// across the rayon pool.
    pub fn calibrate_line(
        &self,
        raw: &[f32],
        bands: &[u32],
        out: &mut [f32],
        parallel_threshold: usize,
    ) -> CalibrationResult<()> {
        let output = self.cal_type();
        match self {
            CalibrationModel::Gvar(_) => {}
            _ => {
                self.check_output(output)?;
                out.copy_from_slice(raw);
                return Ok(());
            }
        }

        let calibrate = |(i, (o, &r)): (usize, (&mut f32, &f32))| -> CalibrationResult<()> {
            *o = self.calibrate(r, bands[i % bands.len()], output)?;
            Ok(())
        };

        if raw.len() >= parallel_threshold {
            out.par_iter_mut()
                .zip(raw.par_iter())
                .enumerate()
                .try_for_each(calibrate)
        } else {
            out.iter_mut().zip(raw).enumerate().try_for_each(calibrate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::calibration::GVAR_LIBRARY_YAML;
    use test_utils::fixtures::sensors;

    fn library() -> CoefficientLibrary {
        CoefficientLibrary::from_yaml_str(GVAR_LIBRARY_YAML).unwrap()
    }

    fn goes8() -> SensorId {
        SensorId(sensors::GOES_8_IMAGER as u32)
    }

    #[test]
    fn test_goes_with_coefficients() {
        for stored in [None, Some(CalibrationType::Raw)] {
            let (model, fallback) = CalibrationModel::for_sensor(goes8(), stored, true, &library());
            assert_eq!(fallback, Fallback::None);
            assert_eq!(model.name(), "gvar");
        }
    }

    #[test]
    fn test_passthrough_fallbacks() {
        let library = library();
        let cases = [
            (sensors::GOES_8_IMAGER, false, Fallback::NoCalibrationBlock),
            (sensors::GMS_5, true, Fallback::UnrecognisedSensor),
            (sensors::UNKNOWN, true, Fallback::UnrecognisedSensor),
        ];
        for (sensor, has_cal, expected) in cases {
            let (model, fallback) =
                CalibrationModel::for_sensor(SensorId(sensor as u32), None, has_cal, &library);
            assert_eq!(fallback, expected, "sensor {sensor}");
            assert_eq!(model.name(), "passthrough");
        }
    }

    #[test]
    fn test_goes_platform_missing_from_library() {
        let library = library();
        for (sensor, platform) in [
            (sensors::GOES_13_IMAGER, "GOES-13"),
            (sensors::GOES_8_SOUNDER, "GOES-8 Sounder"),
        ] {
            let (model, fallback) =
                CalibrationModel::for_sensor(SensorId(sensor as u32), None, true, &library);
            assert_eq!(
                fallback,
                Fallback::MissingCoefficients {
                    platform: platform.to_string()
                }
            );
            assert_eq!(model.name(), "uncalibrated");

            assert!(model.check_bands(&[1], CalibrationType::Raw).is_ok());
            assert_eq!(model.calibrate(812.0, 1, CalibrationType::Raw).unwrap(), 812.0);
            for output in [
                CalibrationType::Radiance,
                CalibrationType::Temperature,
                CalibrationType::Brightness,
                CalibrationType::Albedo,
            ] {
                assert!(matches!(
                    model.check_bands(&[1], output),
                    Err(CalibrationError::MissingPlatform { platform: ref p }) if p == platform
                ));
                assert!(model.calibrate(812.0, 1, output).is_err());
            }
        }
    }

    #[test]
    fn test_stored_brightness_is_returned_unchanged() {
        let (mut model, fallback) = CalibrationModel::for_sensor(
            goes8(),
            Some(CalibrationType::Brightness),
            true,
            &library(),
        );
        assert_eq!(
            fallback,
            Fallback::Stored {
                stored: CalibrationType::Brightness
            }
        );
        assert_eq!(model.name(), "stored");

        for output in [CalibrationType::Brightness, CalibrationType::Raw] {
            assert!(model.check_bands(&[1, 2], output).is_ok());
            model.set_cal_type(output);
            let raw = [53.0, 58.0, 63.0, 68.0];
            let mut out = [0.0; 4];
            model.calibrate_line(&raw, &[1, 2], &mut out, 1).unwrap();
            assert_eq!(out, raw);
        }
    }

    #[test]
    fn test_stored_type_cannot_be_converted() {
        let (mut model, _) = CalibrationModel::for_sensor(
            SensorId(sensors::UNKNOWN as u32),
            Some(CalibrationType::Temperature),
            false,
            &library(),
        );
        let err = model
            .check_bands(&[1], CalibrationType::Radiance)
            .unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::Unconvertible {
                from: CalibrationType::Temperature,
                to: CalibrationType::Radiance
            }
        ));

        model.set_cal_type(CalibrationType::Albedo);
        let mut out = [0.0; 2];
        assert!(model.calibrate_line(&[250.0, 260.0], &[1], &mut out, 1).is_err());
    }

    #[test]
    fn test_passthrough_returns_raw_for_every_type() {
        let model = CalibrationModel::passthrough();
        for cal in CalibrationType::ALL {
            assert_eq!(model.calibrate(417.0, 3, cal).unwrap(), 417.0);
        }
    }

    #[test]
    fn test_set_cal_type() {
        let mut model = CalibrationModel::passthrough();
        assert_eq!(model.cal_type(), CalibrationType::Radiance);
        model.set_cal_type(CalibrationType::Albedo);
        assert_eq!(model.cal_type(), CalibrationType::Albedo);
    }
}
