//! Error types for the conversion crate.

use area_common::GeometryError;
use area_reader::ReaderError;
use calibration::CalibrationError;
use navigation::NavigationError;
use std::fmt;
use thiserror::Error;

/// Errors that end a conversion.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read image: {0}")]
    Reader(#[from] ReaderError),

    #[error("Invalid image geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Navigation failed: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Output sink failed: {0}")]
    Sink(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pipeline is {found}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        found: String,
    },
}

impl ConversionError {
    /// Wrap an error raised by an output sink.
    pub fn sink(err: impl fmt::Display) -> Self {
        ConversionError::Sink(err.to_string())
    }
}

/// Result type for conversion operations.
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
