//! Conversion outcome reported to the driver.

use area_common::CalibrationType;
use serde::Serialize;
use std::fmt;

use crate::anchors::ProjectionMetadata;

/// Non-fatal conditions; conversion went ahead without the affected output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionWarning {
    /// The image has no navigation block
    NoNavigationBlock,
    /// The navigation block tag names no known projection
    UnsupportedProjection { tag: String },
    /// Projection parameters could not be turned into a navigation model
    NavigationUnavailable { reason: String },
    /// Navigation was requested but the image cannot be navigated
    NavigationDisabled,
    /// Ground resolution along one axis could not be computed
    ResolutionUnavailable { axis: &'static str },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::NoNavigationBlock => write!(f, "image has no navigation block"),
            ConversionWarning::UnsupportedProjection { tag } => {
                write!(f, "unsupported projection {:?}", tag)
            }
            ConversionWarning::NavigationUnavailable { reason } => {
                write!(f, "navigation unavailable: {}", reason)
            }
            ConversionWarning::NavigationDisabled => {
                write!(f, "latitude/longitude not written")
            }
            ConversionWarning::ResolutionUnavailable { axis } => {
                write!(f, "ground resolution along {} unavailable", axis)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub lines: usize,
    pub elements: usize,
    pub bands: Vec<u32>,
    pub cal_type: CalibrationType,
    /// Calibration variant used
    pub calibration: &'static str,
    /// Per-pixel latitude/longitude were written
    pub navigated: bool,
    pub projection: Option<ProjectionMetadata>,
    pub warnings: Vec<ConversionWarning>,
}

impl Summary {
    pub fn dx_km(&self) -> Option<f64> {
        self.projection.as_ref().and_then(|p| p.dx_km)
    }

    pub fn dy_km(&self) -> Option<f64> {
        self.projection.as_ref().and_then(|p| p.dy_km)
    }

    pub fn central_point(&self) -> Option<(f32, f32)> {
        let p = self.projection.as_ref()?;
        Some((p.central_lat?, p.central_lon?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = ConversionWarning::UnsupportedProjection {
            tag: "RECT".to_string(),
        };
        assert_eq!(w.to_string(), "unsupported projection \"RECT\"");
    }

    #[test]
    fn test_accessors_without_projection() {
        let summary = Summary {
            lines: 3,
            elements: 4,
            bands: vec![1],
            cal_type: CalibrationType::Raw,
            calibration: "passthrough",
            navigated: false,
            projection: None,
            warnings: vec![ConversionWarning::NoNavigationBlock],
        };
        assert_eq!(summary.dx_km(), None);
        assert_eq!(summary.central_point(), None);
    }
}
