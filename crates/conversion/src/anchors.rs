//! Anchor points and the projection metadata derived from them.

use area_common::{great_circle_distance_km, ImageGeometry};
use navigation::{NavigationModel, ProjectionKind};
use serde::Serialize;
use tracing::warn;

/// Image coordinates of the anchor points, 0-based `(line, element)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub corner: (f64, f64),
    pub opposite: (f64, f64),
    pub center: (f64, f64),
    /// One line below the center
    pub line_step: (f64, f64),
    /// One element right of the center
    pub elem_step: (f64, f64),
}

impl Anchors {
    pub fn for_geometry(geometry: &ImageGeometry) -> Self {
        let nl = geometry.num_lines;
        let ne = geometry.num_elems;
        let cl = (nl / 2).saturating_sub(1) as f64;
        let ce = (ne / 2).saturating_sub(1) as f64;
        Self {
            corner: (0.0, 0.0),
            opposite: (nl.saturating_sub(1) as f64, ne.saturating_sub(1) as f64),
            center: (cl, ce),
            line_step: (cl + 1.0, ce),
            elem_step: (cl, ce + 1.0),
        }
    }
}

/// Projection description written to the output's global attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionMetadata {
    pub proj_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proj_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_lat: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_lon: Option<f32>,
    pub lat00: Option<f32>,
    pub lon00: Option<f32>,
    #[serde(rename = "latNxNy")]
    pub lat_nx_ny: Option<f32>,
    #[serde(rename = "lonNxNy")]
    pub lon_nx_ny: Option<f32>,
    #[serde(rename = "latDxDy")]
    pub lat_dx_dy: Option<f32>,
    #[serde(rename = "lonDxDy")]
    pub lon_dx_dy: Option<f32>,
    pub dx_km: Option<f64>,
    pub dy_km: Option<f64>,
}

fn finite(v: f64) -> Option<f32> {
    v.is_finite().then_some(v as f32)
}

/// Ground distance between two navigated points, if both are on the Earth.
fn resolution(axis: &'static str, a: (f64, f64), b: (f64, f64)) -> Option<f64> {
    let d = great_circle_distance_km(a.0, a.1, b.0, b.1);
    if d.is_finite() {
        Some(d)
    } else {
        warn!(axis, "Ground resolution is not finite, leaving it out");
        None
    }
}

impl ProjectionMetadata {
    /// Navigate the anchors once and derive the projection attributes.
    pub fn compute(model: &NavigationModel, geometry: &ImageGeometry) -> Self {
        let anchors = Anchors::for_geometry(geometry);
        let nav = |(l, e): (f64, f64)| model.point_to_lat_lon(l, e);

        let corner = nav(anchors.corner);
        let opposite = nav(anchors.opposite);
        let center = nav(anchors.center);
        let line_step = nav(anchors.line_step);
        let elem_step = nav(anchors.elem_step);

        let kind = model.kind();
        let central = model.central_point();
        let rotation = match kind {
            ProjectionKind::LambertConformal => central.map(|c| c.0 as f32),
            ProjectionKind::Mercator | ProjectionKind::PolarStereographic => Some(0.0),
            ProjectionKind::Gvar | ProjectionKind::Geos => None,
        };

        Self {
            proj_name: kind.name(),
            proj_index: kind.proj_index(),
            rotation,
            central_lat: central.map(|c| c.0 as f32),
            central_lon: central.map(|c| c.1 as f32),
            lat00: finite(corner.0),
            lon00: finite(corner.1),
            lat_nx_ny: finite(opposite.0),
            lon_nx_ny: finite(opposite.1),
            lat_dx_dy: finite(center.0),
            lon_dx_dy: finite(center.1),
            dx_km: resolution("x", center, elem_step),
            dy_km: resolution("y", center, line_step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_common::{BandMap, SensorId};
    use navigation::ProviderRegistry;
    use test_utils::fixtures::projections;

    fn geometry(num_lines: usize, num_elems: usize) -> ImageGeometry {
        ImageGeometry {
            sensor: SensorId(0),
            start_line: 1,
            start_elem: 1,
            line_res: 1,
            elem_res: 1,
            num_lines,
            num_elems,
            num_bands: 1,
            band_map: BandMap(1),
            data_width: 1,
            prefix_bytes: 0,
            swapped: false,
            source_cal_type: None,
        }
    }

    #[test]
    fn test_anchor_positions() {
        let a = Anchors::for_geometry(&geometry(100, 60));
        assert_eq!(a.corner, (0.0, 0.0));
        assert_eq!(a.opposite, (99.0, 59.0));
        assert_eq!(a.center, (49.0, 29.0));
        assert_eq!(a.line_step, (50.0, 29.0));
        assert_eq!(a.elem_step, (49.0, 30.0));
    }

    #[test]
    fn test_single_pixel_center_saturates() {
        let a = Anchors::for_geometry(&geometry(1, 1));
        assert_eq!(a.center, (0.0, 0.0));
        assert_eq!(a.opposite, (0.0, 0.0));
    }

    #[test]
    fn test_lambert_metadata() {
        let g = geometry(100, 100);
        let model =
            NavigationModel::new(&projections::lambert_conus(), &g, &ProviderRegistry::empty())
                .unwrap();
        let meta = ProjectionMetadata::compute(&model, &g);

        assert_eq!(meta.proj_name, "LAMBERT_CONFORMAL");
        assert_eq!(meta.proj_index, Some(3));
        assert_eq!(meta.rotation, Some(30.0));
        assert_eq!(meta.central_lon, Some(-95.0));

        // 40 km grid, true at 30N and 60N
        let dx = meta.dx_km.unwrap();
        let dy = meta.dy_km.unwrap();
        assert!(dx > 30.0 && dx < 50.0, "dx = {dx}");
        assert!(dy > 30.0 && dy < 50.0, "dy = {dy}");
        assert!(meta.lat00.unwrap() > meta.lat_nx_ny.unwrap());
    }

    #[test]
    fn test_serialized_names() {
        let g = geometry(10, 10);
        let model = NavigationModel::new(
            &projections::polar_north(),
            &g,
            &ProviderRegistry::with_builtins(),
        )
        .unwrap();
        let json = serde_json::to_value(ProjectionMetadata::compute(&model, &g)).unwrap();
        assert_eq!(json["projName"], "STEREOGRAPHIC");
        assert_eq!(json["projIndex"], 1);
        assert_eq!(json["rotation"], 0.0);
        assert!(json["latNxNy"].is_number());
        assert!(json["dxKm"].is_number());
    }
}
