//! Common test fixtures for AREA conversion tests.
//!
//! This module provides pre-defined navigation blocks, sensor codes and a
//! calibration coefficient library that represent common imagery setups.

use crate::generators::{
    dms, lambert_nav_block, mercator_nav_block, polar_nav_block, ScanLayout, SyntheticArea,
};

/// McIDAS sensor source numbers.
pub mod sensors {
    pub const GOES_8_IMAGER: i32 = 70;
    pub const GOES_8_SOUNDER: i32 = 71;
    pub const GOES_13_IMAGER: i32 = 180;
    /// GMS-5, recognised by name but without a calibration model
    pub const GMS_5: i32 = 83;
    /// Not assigned to any platform
    pub const UNKNOWN: i32 = 12;
}

/// Navigation blocks for the supported projections.
pub mod projections {
    use super::*;

    /// Earth radius in meters used by the fixtures.
    pub const RADIUS_M: i32 = 6_371_000;

    /// Northern-hemisphere Lambert grid over CONUS.
    ///
    /// 40 km spacing, standard parallels 30N/60N, reference meridian 95W.
    /// The pole sits 110 lines above the first area line, so a 100x100
    /// image at area (1, 1) spans roughly 24N to 57N.
    pub fn lambert_conus() -> Vec<i32> {
        lambert_nav_block(-110, 50, dms(30.0), dms(60.0), 40_000, dms(95.0), RADIUS_M, 0)
    }

    /// Southern-hemisphere counterpart of [`lambert_conus`].
    pub fn lambert_southern() -> Vec<i32> {
        lambert_nav_block(
            211,
            50,
            dms(-30.0),
            dms(-60.0),
            40_000,
            dms(-135.0),
            RADIUS_M,
            -900_000,
        )
    }

    /// Both standard parallels at 45N, which has no defined cone constant.
    pub fn lambert_degenerate() -> Vec<i32> {
        lambert_nav_block(-110, 50, dms(45.0), dms(45.0), 40_000, dms(95.0), RADIUS_M, 0)
    }

    /// Mercator grid true at 22.5N, 50 km spacing, centred on 75W.
    pub fn mercator_tropics() -> Vec<i32> {
        mercator_nav_block(50, 50, dms(22.5), 50_000, dms(75.0), RADIUS_M)
    }

    /// North polar stereographic grid true at 60N, 50 km spacing, 105W down.
    pub fn polar_north() -> Vec<i32> {
        polar_nav_block(-60, 50, dms(60.0), 50_000, dms(105.0), RADIUS_M)
    }
}

/// Calibration coefficient fixtures.
pub mod calibration {
    /// Library with a GOES-8 imager table: visible band 1 and IR band 4.
    ///
    /// Visible counts are stored left-shifted by five bits.
    pub const GVAR_LIBRARY_YAML: &str = r#"
platforms:
  GOES-8:
    count_scale: 32
    bands:
      1:
        kind: visible
        gain: 0.5501873
        offset: -15.3
        albedo_factor: 0.00192979
      4:
        kind: infrared
        gain: 5.2285
        offset: 15.6854
        wavenumber: 934.30
        c1: 1.191066e-5
        c2: 1.438833
        bc1: -0.322585
        bc2: 1.001271
"#;
}

/// A small Lambert-navigated image: 3 lines, 4 elements, 2 bands of 2-byte samples.
pub fn small_lambert_area() -> SyntheticArea {
    let mut area = SyntheticArea::new(ScanLayout::new(3, 4, 2, 2));
    area.sensor = sensors::UNKNOWN;
    area.with_nav(projections::lambert_conus())
}
