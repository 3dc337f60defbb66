//! Image navigation: the projection plus the image's place in it.

use area_common::{ImageFrame, ImageGeometry};
use rayon::prelude::*;
use tracing::info;

use crate::error::{NavigationError, NavigationResult};
use crate::kind::ProjectionKind;
use crate::lambert::LambertConformal;
use crate::provider::{GeodesyProvider, ProviderRegistry};

/// Coordinate count from which array transforms run on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Projection families. Lambert is computed here, the rest through a
/// geodesy provider.
#[derive(Debug)]
pub enum Projection {
    Gvar(Box<dyn GeodesyProvider>),
    Geos(Box<dyn GeodesyProvider>),
    LambertConformal(LambertConformal),
    Mercator(Box<dyn GeodesyProvider>),
    PolarStereographic(Box<dyn GeodesyProvider>),
}

impl Projection {
    pub fn kind(&self) -> ProjectionKind {
        match self {
            Projection::Gvar(_) => ProjectionKind::Gvar,
            Projection::Geos(_) => ProjectionKind::Geos,
            Projection::LambertConformal(_) => ProjectionKind::LambertConformal,
            Projection::Mercator(_) => ProjectionKind::Mercator,
            Projection::PolarStereographic(_) => ProjectionKind::PolarStereographic,
        }
    }
}

/// Converts between image coordinates and latitude/longitude.
///
/// Lines and elements are 0-based indices into the image. Latitudes are
/// degrees north, longitudes degrees east. Every array entry is transformed
/// independently of the others.
#[derive(Debug)]
pub struct NavigationModel {
    projection: Projection,
    frame: ImageFrame,
    central_point: Option<(f64, f64)>,
    parallel_threshold: usize,
}

impl NavigationModel {
    /// Build navigation for an image from its navigation block.
    pub fn new(
        nav_block: &[i32],
        geometry: &ImageGeometry,
        providers: &ProviderRegistry,
    ) -> NavigationResult<Self> {
        let tag = *nav_block
            .first()
            .ok_or_else(|| NavigationError::construction("unknown", "navigation block is empty"))?;
        let kind = ProjectionKind::from_tag(tag)
            .ok_or(NavigationError::UnsupportedProjection { tag })?;
        let frame = geometry.frame();

        let provider = |kind| -> NavigationResult<Box<dyn GeodesyProvider>> {
            let mut provider = providers.create(kind, nav_block)?;
            provider.set_res(frame.line_res, frame.elem_res);
            provider.set_image_start(frame.start_line, frame.start_elem);
            provider.set_start(1.0, 1.0);
            Ok(provider)
        };

        let projection = match kind {
            ProjectionKind::LambertConformal => {
                Projection::LambertConformal(LambertConformal::from_nav_block(nav_block)?)
            }
            ProjectionKind::Gvar => Projection::Gvar(provider(kind)?),
            ProjectionKind::Geos => Projection::Geos(provider(kind)?),
            ProjectionKind::Mercator => Projection::Mercator(provider(kind)?),
            ProjectionKind::PolarStereographic => Projection::PolarStereographic(provider(kind)?),
        };

        let central_point = central_point(&projection, nav_block);
        info!(
            projection = kind.name(),
            central_lat = central_point.map(|c| c.0),
            central_lon = central_point.map(|c| c.1),
            "Navigation ready"
        );

        Ok(Self {
            projection,
            frame,
            central_point,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Set the array length from which transforms run in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn kind(&self) -> ProjectionKind {
        self.projection.kind()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Declared central latitude/longitude, where the projection has one.
    pub fn central_point(&self) -> Option<(f64, f64)> {
        self.central_point
    }

    /// Navigate a single image point.
    pub fn point_to_lat_lon(&self, line: f64, elem: f64) -> (f64, f64) {
        match &self.projection {
            Projection::LambertConformal(lc) => {
                let (l, e) = self.frame.image_to_area(line, elem);
                lc.to_lat_lon(l, e)
            }
            Projection::Gvar(p)
            | Projection::Geos(p)
            | Projection::Mercator(p)
            | Projection::PolarStereographic(p) => {
                let (l, e) = self.frame.image_to_file(line, elem);
                p.to_lat_lon(l, e)
            }
        }
    }

    /// Inverse-navigate a single point to image coordinates.
    pub fn point_to_lin_ele(&self, lat: f64, lon: f64) -> (f64, f64) {
        match &self.projection {
            Projection::LambertConformal(lc) => {
                let (l, e) = lc.to_lin_ele(lat, lon);
                self.frame.area_to_image(l, e)
            }
            Projection::Gvar(p)
            | Projection::Geos(p)
            | Projection::Mercator(p)
            | Projection::PolarStereographic(p) => {
                let (l, e) = p.to_lin_ele(lat, lon);
                self.frame.file_to_image(l, e)
            }
        }
    }

    /// Navigate arrays of image lines and elements.
    pub fn to_lat_lon(
        &self,
        lines: &[f64],
        elems: &[f64],
    ) -> NavigationResult<(Vec<f64>, Vec<f64>)> {
        let mut lats = vec![0.0; lines.len()];
        let mut lons = vec![0.0; lines.len()];
        self.to_lat_lon_into(lines, elems, &mut lats, &mut lons)?;
        Ok((lats, lons))
    }

    /// Navigate into caller-owned buffers of the same length as the input.
    pub fn to_lat_lon_into(
        &self,
        lines: &[f64],
        elems: &[f64],
        lats: &mut [f64],
        lons: &mut [f64],
    ) -> NavigationResult<()> {
        check_lengths(lines, elems, lats, lons)?;
        self.apply(lines, elems, lats, lons, |l, e| self.point_to_lat_lon(l, e));
        Ok(())
    }

    /// Inverse-navigate arrays of latitudes and longitudes.
    pub fn to_lin_ele(
        &self,
        lats: &[f64],
        lons: &[f64],
    ) -> NavigationResult<(Vec<f64>, Vec<f64>)> {
        let mut lines = vec![0.0; lats.len()];
        let mut elems = vec![0.0; lats.len()];
        self.to_lin_ele_into(lats, lons, &mut lines, &mut elems)?;
        Ok((lines, elems))
    }

    pub fn to_lin_ele_into(
        &self,
        lats: &[f64],
        lons: &[f64],
        lines: &mut [f64],
        elems: &mut [f64],
    ) -> NavigationResult<()> {
        check_lengths(lats, lons, lines, elems)?;
        self.apply(lats, lons, lines, elems, |lat, lon| self.point_to_lin_ele(lat, lon));
        Ok(())
    }

    fn apply<F>(&self, a: &[f64], b: &[f64], out_a: &mut [f64], out_b: &mut [f64], f: F)
    where
        F: Fn(f64, f64) -> (f64, f64) + Sync,
    {
        if a.len() >= self.parallel_threshold {
            out_a
                .par_iter_mut()
                .zip(out_b.par_iter_mut())
                .zip(a.par_iter().zip(b.par_iter()))
                .for_each(|((oa, ob), (&x, &y))| {
                    let (p, q) = f(x, y);
                    *oa = p;
                    *ob = q;
                });
        } else {
            for (((oa, ob), &x), &y) in out_a.iter_mut().zip(out_b.iter_mut()).zip(a).zip(b) {
                let (p, q) = f(x, y);
                *oa = p;
                *ob = q;
            }
        }
    }
}

fn check_lengths(a: &[f64], b: &[f64], out_a: &[f64], out_b: &[f64]) -> NavigationResult<()> {
    for (first, second) in [(a.len(), b.len()), (a.len(), out_a.len()), (a.len(), out_b.len())] {
        if first != second {
            return Err(NavigationError::LengthMismatch { first, second });
        }
    }
    Ok(())
}

/// Central latitude/longitude as declared in the navigation block.
fn central_point(projection: &Projection, block: &[i32]) -> Option<(f64, f64)> {
    use crate::dms::float_lat_lon;

    match projection {
        Projection::LambertConformal(lc) => Some((lc.central_lat() as f64, lc.central_lon() as f64)),
        Projection::Mercator(_) if block.len() > 5 => Some((
            float_lat_lon(block[3]) as f64,
            -(float_lat_lon(block[5]) as f64),
        )),
        Projection::PolarStereographic(_) if block.len() > 5 => Some((
            (block[3] as f32 / 10000.0) as f64,
            -((block[5] as f32 / 10000.0) as f64),
        )),
        _ => None,
    }
}
