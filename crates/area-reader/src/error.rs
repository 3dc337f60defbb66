//! Error types for AREA reading.

use area_common::GeometryError;
use thiserror::Error;

/// Result type alias using ReaderError.
pub type ReaderResult<T> = Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a full record could be read. Nothing from the
    /// partial record is returned.
    #[error("Stream truncated: expected {expected} bytes, received {received}")]
    TruncatedStream { expected: usize, received: usize },

    #[error("Invalid AREA directory: {0}")]
    InvalidDirectory(String),

    #[error("Block offset {offset} is behind the stream position {position}")]
    OffsetBehindCursor { offset: u64, position: u64 },

    #[error("Line buffer holds {actual} samples, decoder produces {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid image geometry: {0}")]
    Geometry(#[from] GeometryError),
}
