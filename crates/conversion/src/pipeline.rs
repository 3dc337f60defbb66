//! The per-image conversion loop.
//!
//! A pipeline owns one image's stream and moves through
//! `Uninitialized -> GeometryKnown -> AnchorsComputed -> Streaming -> Closed`.
//! Lines are decoded, calibrated and navigated strictly in order into
//! buffers sized once when the image is opened, so memory use does not
//! depend on the number of lines.

use std::fmt;
use std::io::Read;

use area_common::{CalibrationType, ImageGeometry};
use area_reader::{AreaDirectory, AreaImage, AreaInfo, AreaStream, LineDecoder, ParameterBlocks};
use calibration::{CalibrationModel, CoefficientLibrary};
use navigation::kind::tag_text;
use navigation::{NavigationError, NavigationModel, ProviderRegistry, DEFAULT_PARALLEL_THRESHOLD};
use tracing::{debug, error, info, warn};

use crate::anchors::ProjectionMetadata;
use crate::config::ConversionConfig;
use crate::error::{ConversionError, ConversionResult};
use crate::sink::{
    directory_variables, image_attributes, latitude_attributes, longitude_attributes,
    CalibratedLine, GlobalMetadata, OutputSink,
};
use crate::summary::{ConversionWarning, Summary};

/// Lines between progress log events.
const PROGRESS_INTERVAL: usize = 100;

/// Converter version recorded in the output.
pub const CONVERTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    GeometryKnown,
    AnchorsComputed,
    Streaming { line: usize },
    Closed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Uninitialized => write!(f, "Uninitialized"),
            PipelineState::GeometryKnown => write!(f, "GeometryKnown"),
            PipelineState::AnchorsComputed => write!(f, "AnchorsComputed"),
            PipelineState::Streaming { line } => write!(f, "Streaming(line {})", line),
            PipelineState::Closed => write!(f, "Closed"),
            PipelineState::Failed => write!(f, "Failed"),
        }
    }
}

/// Collaborators shared by every image a driver converts.
#[derive(Debug)]
pub struct PipelineContext {
    pub providers: ProviderRegistry,
    pub coefficients: CoefficientLibrary,
    /// CF-convention attribute names and units
    pub cf: bool,
    pub parallel_threshold: usize,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self {
            providers: ProviderRegistry::with_builtins(),
            coefficients: CoefficientLibrary::default(),
            cf: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl PipelineContext {
    /// Built-in providers plus the configured coefficient library.
    pub fn from_config(config: &ConversionConfig) -> ConversionResult<Self> {
        let coefficients = match &config.coefficients {
            Some(path) => CoefficientLibrary::from_yaml_file(path)?,
            None => CoefficientLibrary::default(),
        };
        Ok(Self {
            providers: ProviderRegistry::with_builtins(),
            coefficients,
            cf: config.cf,
            parallel_threshold: config.parallel_threshold.max(1),
        })
    }
}

/// Caller-owned scratch space for one line.
#[derive(Debug)]
struct LineBuffers {
    raw: Vec<f32>,
    calibrated: Vec<f32>,
    bytes: Vec<u8>,
    nav_lines: Vec<f64>,
    nav_elems: Vec<f64>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    lats_out: Vec<f32>,
    lons_out: Vec<f32>,
}

impl LineBuffers {
    fn new(samples: usize, elems: usize) -> Self {
        Self {
            raw: vec![0.0; samples],
            calibrated: vec![0.0; samples],
            bytes: vec![0; samples],
            nav_lines: vec![0.0; elems],
            nav_elems: (0..elems).map(|e| e as f64).collect(),
            lats: vec![0.0; elems],
            lons: vec![0.0; elems],
            lats_out: vec![0.0; elems],
            lons_out: vec![0.0; elems],
        }
    }
}

/// Byte value of a brightness sample: NaN is 0, everything else is
/// clamped to 0..=255 and truncated.
pub fn brightness_byte(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.clamp(0.0, 255.0) as u8
    }
}

pub struct ConversionPipeline<R> {
    geometry: ImageGeometry,
    info: AreaInfo,
    bands: Vec<u32>,
    stream: R,
    decoder: LineDecoder,
    navigation: Option<NavigationModel>,
    calibration: CalibrationModel,
    cf: bool,
    parallel_threshold: usize,
    buffers: LineBuffers,
    warnings: Vec<ConversionWarning>,
    state: PipelineState,
}

impl<R: Read> ConversionPipeline<AreaStream<R>> {
    /// Open a pipeline over an image read by `area-reader`.
    pub fn open_image(image: AreaImage<R>, context: &PipelineContext) -> ConversionResult<Self> {
        ConversionPipeline::open(image.directory, image.blocks, image.stream, context)
    }
}

impl<R: Read> ConversionPipeline<R> {
    /// Set up navigation, calibration and line buffers for one image.
    ///
    /// `stream` must be positioned at the first scan line. Navigation
    /// problems are recorded as warnings; the image is still converted.
    pub fn open(
        directory: AreaDirectory,
        blocks: ParameterBlocks,
        stream: R,
        context: &PipelineContext,
    ) -> ConversionResult<Self> {
        let AreaDirectory { geometry, info, .. } = directory;
        geometry.validate()?;

        let mut warnings = Vec::new();
        let parallel_threshold = context.parallel_threshold.max(1);

        let navigation = match blocks.navigation.as_deref() {
            None => {
                warn!("Image has no navigation block");
                warnings.push(ConversionWarning::NoNavigationBlock);
                None
            }
            Some(block) => match NavigationModel::new(block, &geometry, &context.providers) {
                Ok(model) => Some(model.with_parallel_threshold(parallel_threshold)),
                Err(NavigationError::UnsupportedProjection { tag }) => {
                    warn!(tag = %tag_text(tag), "Unsupported projection, navigation disabled");
                    warnings.push(ConversionWarning::UnsupportedProjection { tag: tag_text(tag) });
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Navigation disabled");
                    warnings.push(ConversionWarning::NavigationUnavailable {
                        reason: e.to_string(),
                    });
                    None
                }
            },
        };

        let (calibration, _) = CalibrationModel::for_sensor(
            geometry.sensor,
            geometry.source_cal_type,
            blocks.calibration.is_some(),
            &context.coefficients,
        );

        let decoder = LineDecoder::new(&geometry);
        let buffers = LineBuffers::new(decoder.samples_per_line(), geometry.num_elems);
        let bands = geometry.bands();

        info!(
            sensor = %geometry.sensor,
            lines = geometry.num_lines,
            elements = geometry.num_elems,
            bands = ?bands,
            width = geometry.data_width,
            swapped = geometry.swapped,
            "Opened image"
        );

        let mut pipeline = Self {
            geometry,
            info,
            bands,
            stream,
            decoder,
            navigation,
            calibration,
            cf: context.cf,
            parallel_threshold,
            buffers,
            warnings,
            state: PipelineState::Uninitialized,
        };
        pipeline.transition(PipelineState::GeometryKnown);
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn navigation(&self) -> Option<&NavigationModel> {
        self.navigation.as_ref()
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "Pipeline state");
        self.state = next;
    }

    /// Convert every line into `sink`.
    ///
    /// May be called once, from `GeometryKnown`. Any error leaves the
    /// pipeline `Failed`; the sink is then never finished.
    pub fn run<S: OutputSink + ?Sized>(
        &mut self,
        sink: &mut S,
        output: CalibrationType,
        include_navigation: bool,
    ) -> ConversionResult<Summary> {
        if self.state != PipelineState::GeometryKnown {
            return Err(ConversionError::InvalidState {
                expected: "GeometryKnown",
                found: self.state.to_string(),
            });
        }

        match self.execute(sink, output, include_navigation) {
            Ok(summary) => {
                self.transition(PipelineState::Closed);
                info!(
                    lines = summary.lines,
                    bands = ?summary.bands,
                    cal_type = %summary.cal_type,
                    navigated = summary.navigated,
                    dx_km = ?summary.dx_km(),
                    dy_km = ?summary.dy_km(),
                    warnings = summary.warnings.len(),
                    "Conversion complete"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(state = %self.state, error = %e, "Conversion failed");
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn execute<S: OutputSink + ?Sized>(
        &mut self,
        sink: &mut S,
        output: CalibrationType,
        include_navigation: bool,
    ) -> ConversionResult<Summary> {
        self.calibration.check_bands(&self.bands, output)?;
        self.calibration.set_cal_type(output);

        let projection = self
            .navigation
            .as_ref()
            .map(|model| ProjectionMetadata::compute(model, &self.geometry));
        if let Some(p) = &projection {
            for (axis, value) in [("x", p.dx_km), ("y", p.dy_km)] {
                if value.is_none() {
                    self.warnings
                        .push(ConversionWarning::ResolutionUnavailable { axis });
                }
            }
        }
        self.transition(PipelineState::AnchorsComputed);

        let navigate = include_navigation && self.navigation.is_some();
        if include_navigation && !navigate {
            warn!("Latitude/longitude requested but the image cannot be navigated");
            self.warnings.push(ConversionWarning::NavigationDisabled);
        }

        let metadata = GlobalMetadata {
            num_lines: self.geometry.num_lines,
            num_elems: self.geometry.num_elems,
            bands: self.bands.clone(),
            cal_type: output,
            projection: projection.clone(),
            history: format!(
                "Converted on {}",
                chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT")
            ),
            version: CONVERTER_VERSION.to_string(),
            image: image_attributes(output, self.cf),
            latitude: navigate.then(|| latitude_attributes(self.cf)),
            longitude: navigate.then(|| longitude_attributes(self.cf)),
            directory: directory_variables(&self.geometry, &self.info, self.cf),
        };
        sink.begin(&metadata)?;

        let num_lines = self.geometry.num_lines;
        for line in 0..num_lines {
            self.state = PipelineState::Streaming { line };
            self.stream_line(sink, line, output, navigate)?;
            if (line + 1) % PROGRESS_INTERVAL == 0 {
                debug!(line = line + 1, total = num_lines, "Converted lines");
            }
        }

        let summary = Summary {
            lines: num_lines,
            elements: self.geometry.num_elems,
            bands: self.bands.clone(),
            cal_type: output,
            calibration: self.calibration.name(),
            navigated: navigate,
            projection,
            warnings: self.warnings.clone(),
        };
        sink.finish(&summary)?;
        Ok(summary)
    }

    fn stream_line<S: OutputSink + ?Sized>(
        &mut self,
        sink: &mut S,
        line: usize,
        output: CalibrationType,
        navigate: bool,
    ) -> ConversionResult<()> {
        let buf = &mut self.buffers;

        self.decoder.decode_line(&mut self.stream, &mut buf.raw)?;
        self.calibration.calibrate_line(
            &buf.raw,
            &self.bands,
            &mut buf.calibrated,
            self.parallel_threshold,
        )?;

        if output == CalibrationType::Brightness {
            for (b, &v) in buf.bytes.iter_mut().zip(&buf.calibrated) {
                *b = brightness_byte(v);
            }
            sink.write_line(line, CalibratedLine::Brightness(&buf.bytes))?;
        } else {
            sink.write_line(line, CalibratedLine::Physical(&buf.calibrated))?;
        }

        if let (true, Some(model)) = (navigate, &self.navigation) {
            buf.nav_lines.fill(line as f64);
            model.to_lat_lon_into(&buf.nav_lines, &buf.nav_elems, &mut buf.lats, &mut buf.lons)?;
            for (o, &v) in buf.lats_out.iter_mut().zip(&buf.lats) {
                *o = v as f32;
            }
            for (o, &v) in buf.lons_out.iter_mut().zip(&buf.lons) {
                *o = v as f32;
            }
            sink.write_lat_lon(line, &buf.lats_out, &buf.lons_out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_byte() {
        assert_eq!(brightness_byte(f32::NAN), 0);
        assert_eq!(brightness_byte(-3.0), 0);
        assert_eq!(brightness_byte(17.9), 17);
        assert_eq!(brightness_byte(255.0), 255);
        assert_eq!(brightness_byte(1000.0), 255);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Streaming { line: 7 }.to_string(), "Streaming(line 7)");
        assert_eq!(PipelineState::GeometryKnown.to_string(), "GeometryKnown");
    }
}
