//! Spherical Mercator provider for `MERC` navigation blocks.
//!
//! Block layout: `[1]` area line of the equator, `[2]` area element of the
//! normal longitude, `[3]` latitude where the scale is true (DDDMMSS), `[4]`
//! pixel spacing at that latitude in meters, `[5]` normal longitude
//! (DDDMMSS, west positive), `[6]` Earth radius in meters.

use std::f64::consts::FRAC_PI_4;

use crate::dms::float_lat_lon;
use crate::error::{NavigationError, NavigationResult};
use crate::provider::{AreaCoordinates, GeodesyProvider};

const NAME: &str = "MERCATOR";

#[derive(Debug, Clone)]
pub struct MercatorProvider {
    equator_line: f64,
    normal_elem: f64,
    /// Normal longitude, degrees east
    normal_lon: f64,
    /// Pixels per radian of longitude
    scale: f64,
    coords: AreaCoordinates,
}

impl MercatorProvider {
    pub fn from_nav_block(block: &[i32]) -> NavigationResult<Self> {
        if block.len() < 7 {
            return Err(NavigationError::construction(
                NAME,
                format!("navigation block has {} words, need 7", block.len()),
            ));
        }
        let true_lat = (float_lat_lon(block[3]) as f64).to_radians();
        let spacing_km = block[4] as f64 / 1000.0;
        let radius_km = block[6] as f64 / 1000.0;
        let scale = radius_km * true_lat.cos() / spacing_km;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(NavigationError::construction(
                NAME,
                format!(
                    "spacing {} m and radius {} m give no usable scale",
                    block[4], block[6]
                ),
            ));
        }

        Ok(Self {
            equator_line: block[1] as f64,
            normal_elem: block[2] as f64,
            normal_lon: -(float_lat_lon(block[5]) as f64),
            scale,
            coords: AreaCoordinates::default(),
        })
    }
}

/// Wrap a longitude difference into `(-180, 180]`.
pub(crate) fn wrap_degrees(delta: f64) -> f64 {
    let wrapped = (delta + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

impl GeodesyProvider for MercatorProvider {
    fn set_res(&mut self, line_res: f64, elem_res: f64) {
        self.coords.line_res = line_res;
        self.coords.elem_res = elem_res;
    }

    fn set_image_start(&mut self, start_line: f64, start_elem: f64) {
        self.coords.image_start_line = start_line;
        self.coords.image_start_elem = start_elem;
    }

    fn set_start(&mut self, line: f64, elem: f64) {
        self.coords.start_line = line;
        self.coords.start_elem = elem;
    }

    fn to_lat_lon(&self, line: f64, elem: f64) -> (f64, f64) {
        let (line, elem) = self.coords.file_to_area(line, elem);
        let lat = 2.0 * ((self.equator_line - line) / self.scale).exp().atan() - 2.0 * FRAC_PI_4;
        let lon = wrap_degrees(self.normal_lon + ((elem - self.normal_elem) / self.scale).to_degrees());
        (lat.to_degrees(), lon)
    }

    fn to_lin_ele(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat = lat.to_radians();
        let line = self.equator_line - self.scale * (FRAC_PI_4 + lat / 2.0).tan().ln();
        let elem = self.normal_elem + self.scale * wrap_degrees(lon - self.normal_lon).to_radians();
        self.coords.area_to_file(line, elem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::projections;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_equator_and_normal_longitude() {
        let p = MercatorProvider::from_nav_block(&projections::mercator_tropics()).unwrap();
        let (lat, lon) = p.to_lat_lon(50.0, 50.0);
        assert_coords_approx_eq!((lat, lon), (0.0, -75.0), 1e-9);
    }

    #[test]
    fn test_roundtrip_with_resolution() {
        let mut p = MercatorProvider::from_nav_block(&projections::mercator_tropics()).unwrap();
        p.set_res(2.0, 3.0);
        p.set_image_start(10.0, 20.0);
        p.set_start(1.0, 1.0);

        let (lat, lon) = p.to_lat_lon(17.0, 9.5);
        let (line, elem) = p.to_lin_ele(lat, lon);
        assert_coords_approx_eq!((line, elem), (17.0, 9.5), 1e-6);
    }

    #[test]
    fn test_north_is_up() {
        let p = MercatorProvider::from_nav_block(&projections::mercator_tropics()).unwrap();
        let (north, _) = p.to_lat_lon(10.0, 50.0);
        let (south, _) = p.to_lat_lon(90.0, 50.0);
        assert!(north > 0.0 && south < 0.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_approx_eq!(wrap_degrees(190.0), -170.0, 1e-12);
        assert_approx_eq!(wrap_degrees(-180.0), 180.0, 1e-12);
        assert_approx_eq!(wrap_degrees(-190.0), 170.0, 1e-12);
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let mut block = projections::mercator_tropics();
        block[4] = 0;
        assert!(MercatorProvider::from_nav_block(&block).is_err());
    }
}
