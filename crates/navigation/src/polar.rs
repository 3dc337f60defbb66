//! Spherical Polar Stereographic provider for `PS` navigation blocks.
//!
//! Block layout: `[1]`/`[2]` area line and element of the pole, `[3]`
//! latitude where the scale is true (DDDMMSS; its sign picks the
//! hemisphere), `[4]` spacing at that latitude in meters, `[5]` normal
//! longitude (DDDMMSS, west positive) which runs from the pole towards
//! increasing line numbers, `[6]` Earth radius in meters.

use crate::dms::float_lat_lon;
use crate::error::{NavigationError, NavigationResult};
use crate::mercator::wrap_degrees;
use crate::provider::{AreaCoordinates, GeodesyProvider};

const NAME: &str = "STEREOGRAPHIC";

#[derive(Debug, Clone)]
pub struct PolarStereographicProvider {
    pole_line: f64,
    pole_elem: f64,
    /// Normal longitude, degrees east
    normal_lon: f64,
    /// +1 north, -1 south
    hem: f64,
    /// Pixels per unit of `tan(colatitude / 2)`
    scale: f64,
    coords: AreaCoordinates,
}

impl PolarStereographicProvider {
    pub fn from_nav_block(block: &[i32]) -> NavigationResult<Self> {
        if block.len() < 7 {
            return Err(NavigationError::construction(
                NAME,
                format!("navigation block has {} words, need 7", block.len()),
            ));
        }
        let true_lat = float_lat_lon(block[3]) as f64;
        let hem = if true_lat < 0.0 { -1.0 } else { 1.0 };
        let spacing_km = block[4] as f64 / 1000.0;
        let radius_km = block[6] as f64 / 1000.0;
        let scale = radius_km * (1.0 + true_lat.abs().to_radians().sin()) / spacing_km;
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
            pole_line: block[1] as f64,
            pole_elem: block[2] as f64,
            normal_lon: -(float_lat_lon(block[5]) as f64),
            hem,
            scale,
            coords: AreaCoordinates::default(),
        })
    }
}

impl GeodesyProvider for PolarStereographicProvider {
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
        let dl = line - self.pole_line;
        let de = elem - self.pole_elem;
        let rho = dl.hypot(de);
        if rho == 0.0 {
            return (self.hem * 90.0, self.normal_lon);
        }
        let colat = 2.0 * (rho / self.scale).atan();
        let lat = self.hem * (90.0 - colat.to_degrees());
        let lon = wrap_degrees(self.normal_lon + self.hem * de.atan2(dl).to_degrees());
        (lat, lon)
    }

    fn to_lin_ele(&self, lat: f64, lon: f64) -> (f64, f64) {
        let colat = (90.0 - self.hem * lat).to_radians();
        let rho = self.scale * (colat / 2.0).tan();
        let theta = (self.hem * wrap_degrees(lon - self.normal_lon)).to_radians();
        let line = self.pole_line + rho * theta.cos();
        let elem = self.pole_elem + rho * theta.sin();
        self.coords.area_to_file(line, elem)
    }
}
