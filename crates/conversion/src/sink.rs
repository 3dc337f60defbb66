//! Output sink interface and the metadata handed to it.

use area_common::{CalibrationType, ImageGeometry};
use area_reader::AreaInfo;
use serde::Serialize;

use crate::anchors::ProjectionMetadata;
use crate::error::ConversionResult;
use crate::summary::Summary;

/// One calibrated scan line, `sample[band + element * bands]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibratedLine<'a> {
    /// One byte per sample
    Brightness(&'a [u8]),
    /// Four-byte floats for every other calibration type
    Physical(&'a [f32]),
}

impl CalibratedLine<'_> {
    pub fn len(&self) -> usize {
        match self {
            CalibratedLine::Brightness(s) => s.len(),
            CalibratedLine::Physical(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per sample.
    pub fn element_size(&self) -> usize {
        match self {
            CalibratedLine::Brightness(_) => 1,
            CalibratedLine::Physical(_) => 4,
        }
    }
}

/// Receives a converted image one line at a time.
///
/// Calls arrive in order: `begin`, then for each line `write_line` and
/// (when navigation is on) `write_lat_lon`, then `finish`. A sink that sees
/// no `finish` must not leave a finished-looking output behind.
pub trait OutputSink {
    fn begin(&mut self, metadata: &GlobalMetadata) -> ConversionResult<()>;

    fn write_line(&mut self, line: usize, samples: CalibratedLine<'_>) -> ConversionResult<()>;

    fn write_lat_lon(&mut self, line: usize, lats: &[f32], lons: &[f32]) -> ConversionResult<()>;

    fn finish(&mut self, summary: &Summary) -> ConversionResult<()>;
}

/// Name, units and description of an output variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableAttributes {
    pub long_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DirectoryValue {
    Int(i64),
    Text(String),
}

/// An image directory field carried to the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryVariable {
    pub name: &'static str,
    pub value: DirectoryValue,
    #[serde(flatten)]
    pub attributes: VariableAttributes,
}

impl DirectoryVariable {
    fn int(
        name: &'static str,
        value: impl Into<i64>,
        long_name: &'static str,
        units: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            value: DirectoryValue::Int(value.into()),
            attributes: VariableAttributes { long_name, units },
        }
    }
}

/// Directory fields written alongside the image.
pub fn directory_variables(
    geometry: &ImageGeometry,
    info: &AreaInfo,
    cf: bool,
) -> Vec<DirectoryVariable> {
    let count_or = |native: &'static str| Some(if cf { "count" } else { native });

    vec![
        DirectoryVariable::int("version", info.version, "McIDAS area file version number", None),
        DirectoryVariable {
            name: "sensor_ID",
            value: DirectoryValue::Text(geometry.sensor.name()),
            attributes: VariableAttributes {
                long_name: "sensor identification",
                units: None,
            },
        },
        DirectoryVariable::int("image_date", info.image_date, "image year and day of year", Some("ccyyddd")),
        DirectoryVariable::int("image_time", info.image_time, "image time in UTC", Some("hhmmss UTC")),
        DirectoryVariable::int("start_line", geometry.start_line, "image starting line", count_or("satellite coordinates")),
        DirectoryVariable::int("start_elem", geometry.start_elem, "image starting element", count_or("satellite coordinates")),
        DirectoryVariable::int("num_lines", geometry.num_lines as i64, "number of lines", None),
        DirectoryVariable::int("num_elems", geometry.num_elems as i64, "number of elements", None),
        DirectoryVariable::int("data_width", geometry.data_width as i64, "number of bytes per source data point", count_or("bytes/data point")),
        DirectoryVariable::int("line_res", geometry.line_res, "resolution of each pixel in line direction", Some("km")),
        DirectoryVariable::int("elem_res", geometry.elem_res, "resolution of each pixel in elem direction", Some("km")),
        DirectoryVariable::int("prefix_size", geometry.prefix_bytes as i64, "line prefix size", count_or("bytes")),
        DirectoryVariable::int("project_number", info.project, "project number", None),
        DirectoryVariable::int("creation_date", info.creation_date, "image creation year and day of year", Some("ccyyddd")),
        DirectoryVariable::int("creation_time", info.creation_time, "image creation time in UTC", Some("hhmmss UTC")),
    ]
}

/// Attributes of the calibrated image variable.
pub fn image_attributes(cal_type: CalibrationType, cf: bool) -> VariableAttributes {
    VariableAttributes {
        long_name: cal_type.long_name(),
        units: Some(cal_type.units(cf)),
    }
}

pub fn latitude_attributes(cf: bool) -> VariableAttributes {
    VariableAttributes {
        long_name: "pixel latitude",
        units: Some(if cf { "degrees_north" } else { "degrees North" }),
    }
}

pub fn longitude_attributes(cf: bool) -> VariableAttributes {
    VariableAttributes {
        long_name: "pixel longitude",
        units: Some(if cf { "degrees_east" } else { "degrees East" }),
    }
}

/// Everything a sink needs before the first line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalMetadata {
    pub num_lines: usize,
    pub num_elems: usize,
    pub bands: Vec<u32>,
    pub cal_type: CalibrationType,
    /// Absent when the image has no usable navigation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionMetadata>,
    pub history: String,
    pub version: String,
    pub image: VariableAttributes,
    /// Present when lat/lon lines will be written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<VariableAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<VariableAttributes>,
    pub directory: Vec<DirectoryVariable>,
}

impl GlobalMetadata {
    /// Bytes per emitted image sample.
    pub fn element_size(&self) -> usize {
        self.cal_type.output_element_size()
    }
}

/// Sink that keeps everything in memory. Useful for tests and small images.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub metadata: Option<GlobalMetadata>,
    pub brightness: Vec<Vec<u8>>,
    pub physical: Vec<Vec<f32>>,
    pub lats: Vec<Vec<f32>>,
    pub lons: Vec<Vec<f32>>,
    pub summary: Option<Summary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of image lines received.
    pub fn lines_written(&self) -> usize {
        self.brightness.len().max(self.physical.len())
    }
}

impl OutputSink for MemorySink {
    fn begin(&mut self, metadata: &GlobalMetadata) -> ConversionResult<()> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn write_line(&mut self, _line: usize, samples: CalibratedLine<'_>) -> ConversionResult<()> {
        match samples {
            CalibratedLine::Brightness(s) => self.brightness.push(s.to_vec()),
            CalibratedLine::Physical(s) => self.physical.push(s.to_vec()),
        }
        Ok(())
    }

    fn write_lat_lon(&mut self, _line: usize, lats: &[f32], lons: &[f32]) -> ConversionResult<()> {
        self.lats.push(lats.to_vec());
        self.lons.push(lons.to_vec());
        Ok(())
    }

    fn finish(&mut self, summary: &Summary) -> ConversionResult<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
