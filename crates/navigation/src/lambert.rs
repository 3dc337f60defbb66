//! Lambert Conformal Conic projection for `LAMB` navigation blocks.
//!
//! The cone is secant at two standard parallels. Area coordinates are
//! measured in pixels from the pole's position on the projection plane;
//! line numbers grow away from the pole in the northern hemisphere and
//! towards it in the southern.
//!
//! The navigation block carries:
//! - `[1]`, `[2]`: area line and element of the pole
//! - `[3]`, `[4]`: standard parallels (DDDMMSS)
//! - `[5]`: pixel spacing at the standard parallels (meters)
//! - `[6]`: reference meridian (DDDMMSS, west positive)
//! - `[7]`: Earth radius (meters)
//! - `[11]`: pole latitude (DDDMMSS); negative selects the southern
//!   hemisphere, zero means the north pole
//!
//! Projection constants are held in single precision and per-point math is
//! done in double precision, so results match McIDAS navigation exactly.

use crate::dms::float_lat_lon;
use crate::error::{NavigationError, NavigationResult};

const NAME: &str = "LAMBERT_CONFORMAL";

/// Degrees to radians, single precision.
const RAD: f32 = 0.01745329;

/// Radius below which a point is taken to be the pole.
const POLE_EPSILON: f64 = 1.0e-10;

/// Minimum navigation block length.
pub const MIN_BLOCK_WORDS: usize = 12;

#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Area line of the pole
    row: f32,
    /// Area element of the pole
    col: f32,
    /// Reference meridian, degrees west
    q_lon: f32,
    /// +1 northern hemisphere, -1 southern
    hem: i32,
    /// Cone constant
    fac: f32,
    /// Plane radius scale in pixels
    b_lat: f32,
    central_lat: f32,
    central_lon: f32,
}

impl LambertConformal {
    pub fn from_nav_block(block: &[i32]) -> NavigationResult<Self> {
        if block.len() < MIN_BLOCK_WORDS {
            return Err(NavigationError::construction(
                NAME,
                format!(
                    "navigation block has {} words, need {}",
                    block.len(),
                    MIN_BLOCK_WORDS
                ),
            ));
        }

        let central_lat = block[3] as f32 / 10000.0;
        let central_lon = -(block[6] as f32 / 10000.0);
        let row = block[1] as f32;
        let col = block[2] as f32;

        let pole = if block[11] == 0 { 900000 } else { block[11] };
        let hem: i32 = if pole < 0 { -1 } else { 1 };

        // Standard parallels as colatitudes in radians
        let lat1 = (90.0f32 - hem as f32 * float_lat_lon(block[3])) * RAD;
        let lat2 = (90.0f32 - hem as f32 * float_lat_lon(block[4])) * RAD;
        let space = block[5] as f32 / 1000.0;
        let q_lon = float_lat_lon(block[6]);
        let r = block[7] as f32 / 1000.0;

        let (l1, l2) = (lat1 as f64, lat2 as f64);
        let fac = ((l1.sin().ln() - l2.sin().ln()) / ((0.5 * l1).tan().ln() - (0.5 * l2).tan().ln()))
            as f32;
        if !fac.is_finite() || fac == 0.0 {
            return Err(NavigationError::construction(
                NAME,
                format!(
                    "standard parallels {} and {} give no cone constant",
                    block[3], block[4]
                ),
            ));
        }

        let b_lat = (r as f64 * l1.sin()
            / ((space * fac) as f64 * (l1 * 0.5).tan().powf(fac as f64))) as f32;
        if !b_lat.is_finite() || b_lat == 0.0 {
            return Err(NavigationError::construction(
                NAME,
                format!(
                    "spacing {} m and radius {} m give no plane scale",
                    block[5], block[7]
                ),
            ));
        }

        Ok(Self {
            row,
            col,
            q_lon,
            hem,
            fac,
            b_lat,
            central_lat,
            central_lon,
        })
    }

    pub fn central_lat(&self) -> f32 {
        self.central_lat
    }

    /// Central longitude, degrees east.
    pub fn central_lon(&self) -> f32 {
        self.central_lon
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f32 {
        self.fac
    }

    pub fn hemisphere(&self) -> i32 {
        self.hem
    }

    /// Latitude/longitude (degrees, east positive) to area line/element.
    pub fn to_lin_ele(&self, lat: f64, lon: f64) -> (f64, f64) {
        let hem = self.hem as f64;
        let fac = self.fac as f64;
        let rad = RAD as f64;

        let x_lon = -lon;
        let r_lon = hem * (x_lon - self.q_lon as f64);
        let r_lon = ((r_lon + 900.0) % 360.0) - 180.0;
        let r_lon = r_lon * fac * rad;

        let c_lat = (90.0 - hem * lat) * rad * 0.5;
        let r_lat = if c_lat == 0.0 {
            0.0
        } else {
            self.b_lat as f64 * c_lat.abs().tan().powf(fac)
        };

        let line = self.row as f64 + hem * (r_lat * r_lon.cos());
        let elem = self.col as f64 - hem * (r_lat * r_lon.sin());
        (line, elem)
    }

    /// Area line/element to latitude/longitude (degrees, east positive).
    pub fn to_lat_lon(&self, line: f64, elem: f64) -> (f64, f64) {
        let hem = self.hem as f64;
        let fac = self.fac as f64;
        let rad = RAD as f64;
        let b_lat = self.b_lat as f64;

        let line_diff = hem * (line - self.row as f64) / b_lat;
        let elem_diff = -hem * (elem - self.col as f64) / b_lat;

        let r_lon = if line_diff != 0.0 || elem_diff != 0.0 {
            elem_diff.atan2(line_diff)
        } else {
            0.0
        };
        let x_lon = hem * r_lon / fac / rad + self.q_lon as f64;
        let x_lon = ((x_lon + 900.0) % 360.0) - 180.0;

        let radius = (line_diff * line_diff + elem_diff * elem_diff).sqrt();
        let lat = if radius.abs() < POLE_EPSILON {
            hem * 90.0
        } else {
            hem * (90.0 - 2.0 * (radius.ln() / fac).exp().atan() / rad)
        };

        (lat, -x_lon)
    }
}
