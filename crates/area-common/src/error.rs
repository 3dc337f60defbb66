//! Error types for image geometry validation.

use thiserror::Error;

/// Result type alias using GeometryError.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Problems with the image description itself, detected before any data is read.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Image has no {0}")]
    Empty(&'static str),

    #[error("Band map {map:#010x} has {present} bands set but the image declares {declared}")]
    BandCountMismatch {
        map: u32,
        present: usize,
        declared: usize,
    },

    #[error("Image declares {value} {what}, more than the {max} supported")]
    TooLarge {
        what: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Invalid resolution: line {line_res}, element {elem_res}")]
    InvalidResolution { line_res: i32, elem_res: i32 },

    #[error("Unknown calibration type: {0}")]
    UnknownCalibrationType(String),
}
