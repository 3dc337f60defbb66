//! Navigation for McIDAS AREA images.
//!
//! [`NavigationModel`] converts between image line/element indices and
//! latitude/longitude. The projection is chosen by the tag in word 0 of the
//! navigation block. Lambert Conformal is computed in closed form; the
//! satellite projections (GVAR, GEOS) and the Mercator and Polar
//! Stereographic families go through a [`GeodesyProvider`], with spherical
//! Mercator and Polar Stereographic providers built in.

pub mod dms;
pub mod error;
pub mod kind;
pub mod lambert;
pub mod mercator;
pub mod model;
pub mod polar;
pub mod provider;

pub use error::{NavigationError, NavigationResult};
pub use kind::ProjectionKind;
pub use lambert::LambertConformal;
pub use mercator::MercatorProvider;
pub use model::{NavigationModel, Projection, DEFAULT_PARALLEL_THRESHOLD};
pub use polar::PolarStereographicProvider;
pub use provider::{AreaCoordinates, GeodesyProvider, ProviderFactory, ProviderRegistry};
