//! Geodesy providers for projections without a closed form here.
//!
//! A provider navigates in 1-based file coordinates. Before first use it is
//! told the image resolution, the area coordinates of the image's first
//! line and element, and the file coordinate of that first pixel (always
//! `(1, 1)`); from then on it maps file coordinates to area coordinates
//! itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{NavigationError, NavigationResult};
use crate::kind::ProjectionKind;
use crate::mercator::MercatorProvider;
use crate::polar::PolarStereographicProvider;

/// Per-point navigation for one projection.
///
/// Latitudes are degrees north, longitudes degrees east.
pub trait GeodesyProvider: Send + Sync + fmt::Debug {
    /// Area lines/elements per file line/element.
    fn set_res(&mut self, line_res: f64, elem_res: f64);

    /// Area coordinates of the first image line and element.
    fn set_image_start(&mut self, start_line: f64, start_elem: f64);

    /// File coordinates of the first image line and element.
    fn set_start(&mut self, line: f64, elem: f64);

    fn to_lat_lon(&self, line: f64, elem: f64) -> (f64, f64);

    fn to_lin_ele(&self, lat: f64, lon: f64) -> (f64, f64);
}

/// File/area coordinate bookkeeping shared by the built-in providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaCoordinates {
    pub line_res: f64,
    pub elem_res: f64,
    pub image_start_line: f64,
    pub image_start_elem: f64,
    pub start_line: f64,
    pub start_elem: f64,
}

impl Default for AreaCoordinates {
    fn default() -> Self {
        Self {
            line_res: 1.0,
            elem_res: 1.0,
            image_start_line: 1.0,
            image_start_elem: 1.0,
            start_line: 1.0,
            start_elem: 1.0,
        }
    }
}

impl AreaCoordinates {
    pub fn file_to_area(&self, line: f64, elem: f64) -> (f64, f64) {
        (
            self.image_start_line + (line - self.start_line) * self.line_res,
            self.image_start_elem + (elem - self.start_elem) * self.elem_res,
        )
    }

    pub fn area_to_file(&self, line: f64, elem: f64) -> (f64, f64) {
        (
            (line - self.image_start_line) / self.line_res + self.start_line,
            (elem - self.image_start_elem) / self.elem_res + self.start_elem,
        )
    }
}

/// Builds a provider from a navigation block.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, nav_block: &[i32]) -> NavigationResult<Box<dyn GeodesyProvider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&[i32]) -> NavigationResult<Box<dyn GeodesyProvider>> + Send + Sync,
{
    fn create(&self, nav_block: &[i32]) -> NavigationResult<Box<dyn GeodesyProvider>> {
        self(nav_block)
    }
}

/// Provider factories by projection family.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<ProjectionKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Registry with no providers at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the spherical Mercator and Polar Stereographic providers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(ProjectionKind::Mercator, |block: &[i32]| {
            MercatorProvider::from_nav_block(block)
                .map(|p| Box::new(p) as Box<dyn GeodesyProvider>)
        });
        registry.register(ProjectionKind::PolarStereographic, |block: &[i32]| {
            PolarStereographicProvider::from_nav_block(block)
                .map(|p| Box::new(p) as Box<dyn GeodesyProvider>)
        });
        registry
    }

    /// Add or replace the factory for a projection family.
    pub fn register(&mut self, kind: ProjectionKind, factory: impl ProviderFactory + 'static) {
        self.factories.insert(kind, Arc::new(factory));
    }

    pub fn contains(&self, kind: ProjectionKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Build a provider, or fail if none is registered for the family.
    pub fn create(
        &self,
        kind: ProjectionKind,
        nav_block: &[i32],
    ) -> NavigationResult<Box<dyn GeodesyProvider>> {
        let factory = self.factories.get(&kind).ok_or_else(|| {
            NavigationError::construction(kind.name(), "no geodesy provider registered")
        })?;
        factory.create(nav_block)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
