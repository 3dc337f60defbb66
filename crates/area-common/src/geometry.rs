//! Image geometry: the shape of the scan grid and how it maps onto the
//! satellite's native line/element coordinate system.
//!
//! Three coordinate systems are in play:
//!
//! - **image** coordinates: 0-based `(line, element)` indices into the grid
//!   as stored in the file. This is what the conversion loop iterates over.
//! - **file** coordinates: the same grid addressed 1-based.
//! - **area** coordinates: the satellite/projection line and element, i.e.
//!   `start + (file - 1) * resolution`.
//!
//! Only the navigation layer converts between them; [`ImageFrame`] holds the
//! arithmetic so every projection applies it the same way.

use serde::{Deserialize, Serialize};

use crate::band::BandMap;
use crate::calibration::CalibrationType;
use crate::error::{GeometryError, GeometryResult};
use crate::sensor::SensorId;

/// Largest accepted element count. Line buffers are sized from it.
pub const MAX_ELEMENTS: usize = 100_000;

/// Largest accepted line count.
pub const MAX_LINES: usize = 1_000_000;

/// Largest accepted line prefix, in bytes.
pub const MAX_PREFIX_BYTES: usize = 1 << 20;

/// Immutable description of one image, produced once when the image is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Sensor source number
    pub sensor: SensorId,
    /// Area line of the first image line
    pub start_line: i32,
    /// Area element of the first image element
    pub start_elem: i32,
    /// Area lines per image line
    pub line_res: i32,
    /// Area elements per image element
    pub elem_res: i32,
    pub num_lines: usize,
    pub num_elems: usize,
    pub num_bands: usize,
    pub band_map: BandMap,
    /// Bytes per stored sample
    pub data_width: usize,
    /// Bytes preceding each scan line's samples
    pub prefix_bytes: usize,
    /// Samples and parameter blocks are stored in the opposite byte order
    pub swapped: bool,
    /// Calibration convention the stored samples are in, when the directory names one
    pub source_cal_type: Option<CalibrationType>,
}

impl ImageGeometry {
    /// Check the invariants every downstream component relies on.
    pub fn validate(&self) -> GeometryResult<()> {
        if self.num_lines == 0 {
            return Err(GeometryError::Empty("lines"));
        }
        if self.num_elems == 0 {
            return Err(GeometryError::Empty("elements"));
        }
        if self.num_bands == 0 {
            return Err(GeometryError::Empty("bands"));
        }
        for (what, value, max) in [
            ("lines", self.num_lines, MAX_LINES),
            ("elements", self.num_elems, MAX_ELEMENTS),
            ("prefix bytes", self.prefix_bytes, MAX_PREFIX_BYTES),
        ] {
            if value > max {
                return Err(GeometryError::TooLarge { what, value, max });
            }
        }
        if self.band_map.count() != self.num_bands {
            return Err(GeometryError::BandCountMismatch {
                map: self.band_map.0,
                present: self.band_map.count(),
                declared: self.num_bands,
            });
        }
        if self.line_res <= 0 || self.elem_res <= 0 {
            return Err(GeometryError::InvalidResolution {
                line_res: self.line_res,
                elem_res: self.elem_res,
            });
        }
        Ok(())
    }

    /// Samples in one decoded scan line (all bands, all elements).
    pub fn samples_per_line(&self) -> usize {
        self.num_bands * self.num_elems
    }

    /// Present band numbers, in the order they are interleaved on each element.
    pub fn bands(&self) -> Vec<u32> {
        self.band_map.bands()
    }

    /// Coordinate frame used by navigation.
    pub fn frame(&self) -> ImageFrame {
        ImageFrame {
            start_line: self.start_line as f64,
            start_elem: self.start_elem as f64,
            line_res: self.line_res as f64,
            elem_res: self.elem_res as f64,
        }
    }
}

/// Mapping between image, file and area coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub start_line: f64,
    pub start_elem: f64,
    pub line_res: f64,
    pub elem_res: f64,
}

impl ImageFrame {
    /// Frame where image and area coordinates differ only by the 1-based shift.
    pub fn identity() -> Self {
        Self {
            start_line: 1.0,
            start_elem: 1.0,
            line_res: 1.0,
            elem_res: 1.0,
        }
    }

    /// Image (0-based) to file (1-based) coordinates.
    #[inline]
    pub fn image_to_file(&self, line: f64, elem: f64) -> (f64, f64) {
        (line + 1.0, elem + 1.0)
    }

    /// File (1-based) to image (0-based) coordinates.
    #[inline]
    pub fn file_to_image(&self, line: f64, elem: f64) -> (f64, f64) {
        (line - 1.0, elem - 1.0)
    }

    /// File coordinates to area coordinates.
    #[inline]
    pub fn file_to_area(&self, line: f64, elem: f64) -> (f64, f64) {
        (
            self.start_line + (line - 1.0) * self.line_res,
            self.start_elem + (elem - 1.0) * self.elem_res,
        )
    }

    /// Area coordinates to file coordinates.
    #[inline]
    pub fn area_to_file(&self, line: f64, elem: f64) -> (f64, f64) {
        (
            (line - self.start_line) / self.line_res + 1.0,
            (elem - self.start_elem) / self.elem_res + 1.0,
        )
    }

    /// Image coordinates straight to area coordinates.
    #[inline]
    pub fn image_to_area(&self, line: f64, elem: f64) -> (f64, f64) {
        let (fl, fe) = self.image_to_file(line, elem);
        self.file_to_area(fl, fe)
    }

    /// Area coordinates straight to image coordinates.
    #[inline]
    pub fn area_to_image(&self, line: f64, elem: f64) -> (f64, f64) {
        let (fl, fe) = self.area_to_file(line, elem);
        self.file_to_image(fl, fe)
    }
}
