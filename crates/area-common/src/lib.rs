//! Common types shared by the AREA conversion crates.
//!
//! Everything here is immutable image-level description: the geometry of
//! the scan grid, which spectral bands are present, which sensor produced
//! the data and which physical units a caller asked for.

pub mod band;
pub mod calibration;
pub mod distance;
pub mod error;
pub mod geometry;
pub mod sensor;

pub use band::BandMap;
pub use calibration::CalibrationType;
pub use distance::great_circle_distance_km;
pub use error::{GeometryError, GeometryResult};
pub use geometry::{ImageFrame, ImageGeometry};
pub use sensor::{GoesInstrument, SensorFamily, SensorId};
