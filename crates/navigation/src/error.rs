//! Error types for navigation.

use thiserror::Error;

use crate::kind::tag_text;

/// Result type alias using NavigationError.
pub type NavigationResult<T> = Result<T, NavigationError>;

#[derive(Debug, Error)]
pub enum NavigationError {
    /// The parameters are missing or describe a degenerate projection.
    /// Conversion continues without geolocation.
    #[error("Cannot construct {projection} navigation: {reason}")]
    Construction {
        projection: &'static str,
        reason: String,
    },

    /// The navigation block tag names no known projection.
    #[error("Unsupported projection tag {tag} ({})", tag_text(*.tag))]
    UnsupportedProjection { tag: i32 },

    #[error("Coordinate arrays differ in length: {first} and {second}")]
    LengthMismatch { first: usize, second: usize },
}

impl NavigationError {
    pub(crate) fn construction(projection: &'static str, reason: impl Into<String>) -> Self {
        NavigationError::Construction {
            projection,
            reason: reason.into(),
        }
    }
}
