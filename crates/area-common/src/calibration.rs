//! Output calibration conventions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeometryError;

/// Physical unit convention for calibrated samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationType {
    #[default]
    Radiance,
    Temperature,
    Brightness,
    Albedo,
    Raw,
}

impl CalibrationType {
    /// All supported types, in the order they are listed to users.
    pub const ALL: [CalibrationType; 5] = [
        CalibrationType::Radiance,
        CalibrationType::Temperature,
        CalibrationType::Brightness,
        CalibrationType::Albedo,
        CalibrationType::Raw,
    ];

    /// Four-character code as stored in an AREA directory.
    pub fn code(&self) -> &'static str {
        match self {
            CalibrationType::Radiance => "RAD ",
            CalibrationType::Temperature => "TEMP",
            CalibrationType::Brightness => "BRIT",
            CalibrationType::Albedo => "ALB ",
            CalibrationType::Raw => "RAW ",
        }
    }

    /// Parse a directory code word (space padded, case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "RAD" => Some(CalibrationType::Radiance),
            "TEMP" => Some(CalibrationType::Temperature),
            "BRIT" => Some(CalibrationType::Brightness),
            "ALB" => Some(CalibrationType::Albedo),
            "RAW" => Some(CalibrationType::Raw),
            _ => None,
        }
    }

    /// Decode the big-endian ASCII code packed into one directory word.
    pub fn from_word(word: i32) -> Option<Self> {
        let bytes = word.to_be_bytes();
        std::str::from_utf8(&bytes).ok().and_then(Self::from_code)
    }

    /// Size in bytes of one emitted sample of this type.
    pub fn output_element_size(&self) -> usize {
        match self {
            CalibrationType::Brightness => 1,
            _ => 4,
        }
    }

    /// Descriptive name attached to the image variable.
    pub fn long_name(&self) -> &'static str {
        match self {
            CalibrationType::Brightness => "brightness values",
            CalibrationType::Temperature => "temperature values",
            CalibrationType::Albedo => "albedo",
            CalibrationType::Raw => "raw sensor values",
            CalibrationType::Radiance => "pixel radiance values",
        }
    }

    /// Unit string attached to the image variable.
    pub fn units(&self, cf: bool) -> &'static str {
        match (self, cf) {
            (CalibrationType::Brightness, true) => "count",
            (CalibrationType::Brightness, false) => "brightness counts",
            (CalibrationType::Temperature, true) => "degK",
            (CalibrationType::Temperature, false) => "degrees Kelvin",
            (CalibrationType::Albedo, _) => "%",
            (CalibrationType::Raw, _) => "count",
            (CalibrationType::Radiance, _) => "mw/cm2/steradian/cm-1",
        }
    }
}

impl fmt::Display for CalibrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code().trim())
    }
}

impl FromStr for CalibrationType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "radiance" => Ok(CalibrationType::Radiance),
            "temperature" => Ok(CalibrationType::Temperature),
            "brightness" => Ok(CalibrationType::Brightness),
            "albedo" => Ok(CalibrationType::Albedo),
            "raw" => Ok(CalibrationType::Raw),
            _ => Self::from_code(s).ok_or_else(|| GeometryError::UnknownCalibrationType(s.to_string())),
        }
    }
}
