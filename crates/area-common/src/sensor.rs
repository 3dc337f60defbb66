//! McIDAS sensor source numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// GOES instrument carried by a GVAR-era platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoesInstrument {
    Imager,
    Sounder,
}

/// Broad platform grouping used to pick a calibration model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    /// GVAR-format GOES platform (GOES-8 onwards).
    Goes {
        satellite: u8,
        instrument: GoesInstrument,
    },
    Other,
}

/// Sensor source number from the image directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId(pub u32);

impl SensorId {
    pub const GOES_8_IMAGER: SensorId = SensorId(70);
    pub const GOES_8_SOUNDER: SensorId = SensorId(71);
    pub const GOES_12_IMAGER: SensorId = SensorId(78);
    pub const GOES_13_IMAGER: SensorId = SensorId(180);

    /// Classify the sensor into a platform family.
    pub fn family(&self) -> SensorFamily {
        let goes = |satellite: u8, code: u32| SensorFamily::Goes {
            satellite,
            instrument: if code % 2 == 0 {
                GoesInstrument::Imager
            } else {
                GoesInstrument::Sounder
            },
        };

        match self.0 {
            // GOES-8 .. GOES-12, imager on even codes
            code @ 70..=79 => goes(8 + ((code - 70) / 2) as u8, code),
            // GOES-13 .. GOES-16
            code @ 180..=187 => goes(13 + ((code - 180) / 2) as u8, code),
            _ => SensorFamily::Other,
        }
    }

    /// Human readable platform/instrument name.
    pub fn name(&self) -> String {
        if let SensorFamily::Goes {
            satellite,
            instrument,
        } = self.family()
        {
            let kind = match instrument {
                GoesInstrument::Imager => "Imager",
                GoesInstrument::Sounder => "Sounder",
            };
            return format!("GOES-{} {}", satellite, kind);
        }

        match self.0 {
            sid @ 54..=58 => format!("MET-{}", sid - 51),
            sid @ 60..=69 => format!("NOAA-{}", sid - 50),
            sid @ 82..=86 => format!("GMS-{}", sid - 78),
            sid @ 89..=94 => format!("DMSP-{}", sid - 79),
            _ => "unknown".to_string(),
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goes_names() {
        assert_eq!(SensorId(70).name(), "GOES-8 Imager");
        assert_eq!(SensorId(75).name(), "GOES-10 Sounder");
        assert_eq!(SensorId(79).name(), "GOES-12 Sounder");
        assert_eq!(SensorId(180).name(), "GOES-13 Imager");
        assert_eq!(SensorId(183).name(), "GOES-14 Sounder");
        assert_eq!(SensorId(187).name(), "GOES-16 Sounder");
    }

    #[test]
    fn test_other_platforms() {
        assert_eq!(SensorId(54).name(), "MET-3");
        assert_eq!(SensorId(64).name(), "NOAA-14");
        assert_eq!(SensorId(83).name(), "GMS-5");
        assert_eq!(SensorId(90).name(), "DMSP-11");
        assert_eq!(SensorId(12).name(), "unknown");
    }

    #[test]
    fn test_family() {
        assert_eq!(
            SensorId(76).family(),
            SensorFamily::Goes {
                satellite: 11,
                instrument: GoesInstrument::Imager
            }
        );
        assert_eq!(SensorId(83).family(), SensorFamily::Other);
    }
}
