//! AREA image conversion.
//!
//! Ties the reader, navigation and calibration crates together into a
//! single-pass, line-at-a-time conversion:
//!
//! - [`ConversionPipeline`] decodes, calibrates and navigates each scan line
//!   and hands it to an [`OutputSink`]
//! - [`ProjectionMetadata`] derives projection attributes and ground
//!   resolution from a handful of anchor points
//! - [`ConversionConfig`] holds the driver's options (YAML plus `AREA_*`
//!   environment overrides)
//!
//! Writing a particular container format is left to the sink.

pub mod anchors;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod summary;

pub use anchors::{Anchors, ProjectionMetadata};
pub use config::{ConversionConfig, LogFormat, LoggingConfig};
pub use error::{ConversionError, ConversionResult};
pub use pipeline::{
    brightness_byte, ConversionPipeline, PipelineContext, PipelineState, CONVERTER_VERSION,
};
pub use sink::{
    CalibratedLine, DirectoryValue, DirectoryVariable, GlobalMetadata, MemorySink, OutputSink,
    VariableAttributes,
};
pub use summary::{ConversionWarning, Summary};
