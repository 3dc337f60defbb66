//! End-to-end conversions of synthetic AREA files.

use std::io::Cursor;

use area_common::CalibrationType;
use area_reader::{AreaImage, AreaStream, ReaderError};
use calibration::{CalibrationError, CoefficientLibrary};
use conversion::{
    CalibratedLine, ConversionError, ConversionPipeline, ConversionWarning, MemorySink,
    OutputSink, PipelineContext, PipelineState,
};
use test_utils::fixtures::calibration::GVAR_LIBRARY_YAML;
use test_utils::fixtures::{projections, sensors, small_lambert_area};
use test_utils::generators::{tag_word, ScanLayout, SyntheticArea};

type Pipeline = ConversionPipeline<AreaStream<Cursor<Vec<u8>>>>;

fn open_bytes(bytes: Vec<u8>, context: &PipelineContext) -> Pipeline {
    let image = AreaImage::from_reader(Cursor::new(bytes)).unwrap();
    ConversionPipeline::open_image(image, context).unwrap()
}

fn open(area: &SyntheticArea, context: &PipelineContext) -> Pipeline {
    open_bytes(area.to_bytes(), context)
}

fn goes_context() -> PipelineContext {
    PipelineContext {
        coefficients: CoefficientLibrary::from_yaml_str(GVAR_LIBRARY_YAML).unwrap(),
        ..Default::default()
    }
}

#[test]
fn test_identity_brightness_line_matches_raw() {
    // 3 lines x 2 bands x 4 elements, 2-byte samples, no prefix, no swap
    let area = small_lambert_area();
    let mut pipeline = open(&area, &PipelineContext::default());
    let mut sink = MemorySink::new();

    let summary = pipeline
        .run(&mut sink, CalibrationType::Brightness, true)
        .unwrap();

    assert_eq!(pipeline.state(), PipelineState::Closed);
    assert_eq!(summary.lines, 3);
    assert_eq!(summary.bands, vec![1, 2]);
    assert_eq!(summary.calibration, "passthrough");
    assert_eq!(sink.lines_written(), 3);
    assert!(sink.physical.is_empty());

    for line in 0..3 {
        let expected: Vec<u8> = area
            .layout
            .raw_line(line)
            .iter()
            .map(|&v| v as u8)
            .collect();
        assert_eq!(sink.brightness[line], expected, "line {line}");
    }
    assert_eq!(sink.summary.as_ref(), Some(&summary));
}

#[test]
fn test_lat_lon_lines_follow_navigation() {
    let area = small_lambert_area();
    let mut pipeline = open(&area, &PipelineContext::default());
    let mut sink = MemorySink::new();
    let summary = pipeline.run(&mut sink, CalibrationType::Raw, true).unwrap();
    assert!(summary.navigated);

    let model = pipeline.navigation().unwrap();
    assert_eq!(sink.lats.len(), 3);
    for line in 0..3 {
        assert_eq!(sink.lats[line].len(), 4);
        for elem in 0..4 {
            let (lat, lon) = model.point_to_lat_lon(line as f64, elem as f64);
            assert_eq!(sink.lats[line][elem], lat as f32);
            assert_eq!(sink.lons[line][elem], lon as f32);
        }
    }

    let metadata = sink.metadata.unwrap();
    assert_eq!(metadata.latitude.unwrap().units, Some("degrees North"));
}

#[test]
fn test_no_lat_lon_when_not_requested() {
    let mut pipeline = open(&small_lambert_area(), &PipelineContext::default());
    let mut sink = MemorySink::new();
    let summary = pipeline.run(&mut sink, CalibrationType::Raw, false).unwrap();

    assert!(!summary.navigated);
    assert!(sink.lats.is_empty());
    // Projection metadata is still derived
    assert_eq!(summary.projection.unwrap().proj_name, "LAMBERT_CONFORMAL");
}

#[test]
fn test_ground_resolution_is_finite() {
    let mut area = SyntheticArea::new(ScanLayout::new(40, 30, 1, 1));
    area.sensor = sensors::UNKNOWN;
    let area = area.with_nav(projections::lambert_conus());

    let mut pipeline = open(&area, &PipelineContext::default());
    let summary = pipeline
        .run(&mut MemorySink::new(), CalibrationType::Raw, false)
        .unwrap();

    for d in [summary.dx_km().unwrap(), summary.dy_km().unwrap()] {
        assert!(d.is_finite() && d >= 0.0);
    }
    assert_eq!(summary.central_point(), Some((30.0, -95.0)));
}

#[test]
fn test_truncated_stream_emits_no_partial_line() {
    let area = small_lambert_area();
    let mut bytes = area.to_bytes();
    let cut = area.layout.line_bytes() / 2;
    bytes.truncate(bytes.len() - cut);

    let mut pipeline = open_bytes(bytes, &PipelineContext::default());
    let mut sink = MemorySink::new();
    let err = pipeline
        .run(&mut sink, CalibrationType::Brightness, true)
        .unwrap_err();

    assert!(matches!(
        err,
        ConversionError::Reader(ReaderError::TruncatedStream { .. })
    ));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(sink.brightness.len(), 2);
    assert_eq!(sink.lats.len(), 2);
    assert!(sink.summary.is_none());
}

#[test]
fn test_run_twice_is_invalid() {
    let mut pipeline = open(&small_lambert_area(), &PipelineContext::default());
    pipeline
        .run(&mut MemorySink::new(), CalibrationType::Raw, false)
        .unwrap();

    let err = pipeline
        .run(&mut MemorySink::new(), CalibrationType::Raw, false)
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::InvalidState { expected: "GeometryKnown", .. }
    ));
    assert_eq!(pipeline.state(), PipelineState::Closed);
}

#[test]
fn test_unsupported_projection_converts_without_navigation() {
    let mut nav = vec![0i32; 12];
    nav[0] = tag_word(b"RECT");
    let area = SyntheticArea::new(ScanLayout::new(2, 3, 1, 1)).with_nav(nav);

    let mut pipeline = open(&area, &PipelineContext::default());
    let mut sink = MemorySink::new();
    let summary = pipeline.run(&mut sink, CalibrationType::Raw, true).unwrap();

    assert_eq!(sink.lines_written(), 2);
    assert!(sink.lats.is_empty());
    assert!(summary.projection.is_none());
    assert!(summary.warnings.contains(&ConversionWarning::UnsupportedProjection {
        tag: "RECT".to_string()
    }));
    assert!(summary.warnings.contains(&ConversionWarning::NavigationDisabled));
}

#[test]
fn test_degenerate_lambert_disables_navigation() {
    let area = SyntheticArea::new(ScanLayout::new(2, 3, 1, 1))
        .with_nav(projections::lambert_degenerate());

    let mut pipeline = open(&area, &PipelineContext::default());
    assert!(pipeline.navigation().is_none());
    assert!(matches!(
        pipeline.warnings(),
        [ConversionWarning::NavigationUnavailable { .. }]
    ));

    let summary = pipeline
        .run(&mut MemorySink::new(), CalibrationType::Raw, false)
        .unwrap();
    assert_eq!(summary.lines, 2);
}

#[test]
fn test_missing_navigation_block() {
    let area = SyntheticArea::new(ScanLayout::new(2, 3, 1, 1));
    let mut pipeline = open(&area, &PipelineContext::default());
    let summary = pipeline
        .run(&mut MemorySink::new(), CalibrationType::Raw, true)
        .unwrap();
    assert_eq!(
        summary.warnings,
        vec![
            ConversionWarning::NoNavigationBlock,
            ConversionWarning::NavigationDisabled
        ]
    );
}

#[test]
fn test_swapped_prefixed_file() {
    let layout = ScanLayout::new(4, 5, 3, 2).with_prefix(6).swapped();
    let area = SyntheticArea::new(layout).with_nav(projections::lambert_conus());

    let mut pipeline = open(&area, &PipelineContext::default());
    let mut sink = MemorySink::new();
    pipeline.run(&mut sink, CalibrationType::Raw, true).unwrap();

    for line in 0..4 {
        assert_eq!(sink.physical[line], layout.raw_line(line));
    }
    assert_eq!(sink.lats.len(), 4);
}

fn goes8_area(band_map: u32) -> SyntheticArea {
    let mut area = SyntheticArea::new(ScanLayout::new(2, 3, 2, 2));
    area.sensor = sensors::GOES_8_IMAGER;
    area.band_map = band_map;
    area.with_cal(vec![tag_word(b"GVAR"), 1, 2, 3])
}

#[test]
fn test_goes_radiance() {
    let area = goes8_area(0b1001);
    let context = goes_context();
    let mut pipeline = open(&area, &context);
    assert_eq!(pipeline.calibration().name(), "gvar");

    let mut sink = MemorySink::new();
    let summary = pipeline.run(&mut sink, CalibrationType::Radiance, false).unwrap();
    assert_eq!(summary.bands, vec![1, 4]);
    assert_eq!(summary.calibration, "gvar");

    let model = pipeline.calibration();
    for line in 0..2 {
        let raw = area.layout.raw_line(line);
        for (i, &r) in raw.iter().enumerate() {
            let band = [1, 4][i % 2];
            let expected = model.calibrate(r, band, CalibrationType::Radiance).unwrap();
            assert_eq!(sink.physical[line][i], expected);
        }
    }
}

#[test]
fn test_goes_unknown_band_fails_before_output() {
    // Band 2 has no coefficients
    let area = goes8_area(0b0011);
    let mut pipeline = open(&area, &goes_context());
    let mut sink = MemorySink::new();

    let err = pipeline
        .run(&mut sink, CalibrationType::Temperature, false)
        .unwrap_err();
    assert!(matches!(err, ConversionError::Calibration(_)));
    assert!(sink.metadata.is_none());
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[test]
fn test_goes_raw_needs_no_coefficients() {
    let area = goes8_area(0b0011);
    let mut pipeline = open(&area, &goes_context());
    let mut sink = MemorySink::new();
    pipeline.run(&mut sink, CalibrationType::Raw, false).unwrap();
    assert_eq!(sink.physical[1], area.layout.raw_line(1));
}

#[test]
fn test_goes_without_library_fails_unless_raw() {
    let mut area = goes8_area(0b0011);
    area.sensor = sensors::GOES_13_IMAGER;

    for output in [CalibrationType::Radiance, CalibrationType::Albedo] {
        let mut pipeline = open(&area, &goes_context());
        assert_eq!(pipeline.calibration().name(), "uncalibrated");
        let mut sink = MemorySink::new();

        let err = pipeline.run(&mut sink, output, false).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Calibration(CalibrationError::MissingPlatform { ref platform })
                if platform == "GOES-13"
        ));
        assert!(sink.metadata.is_none());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    let mut pipeline = open(&area, &goes_context());
    let mut sink = MemorySink::new();
    pipeline.run(&mut sink, CalibrationType::Raw, false).unwrap();
    assert_eq!(sink.physical[0], area.layout.raw_line(0));
}

/// GOES-8 visible image stored as BRIT, one byte per sample.
fn goes8_brightness_area() -> SyntheticArea {
    let mut area = SyntheticArea::new(ScanLayout::new(2, 4, 1, 1));
    area.sensor = sensors::GOES_8_IMAGER;
    area.cal_type = *b"BRIT";
    area.with_cal(vec![tag_word(b"GVAR"), 1, 2, 3])
}

#[test]
fn test_stored_brightness_written_unchanged() {
    let area = goes8_brightness_area();
    let mut pipeline = open(&area, &goes_context());
    assert_eq!(
        pipeline.geometry().source_cal_type,
        Some(CalibrationType::Brightness)
    );
    assert_eq!(pipeline.calibration().name(), "stored");

    let mut sink = MemorySink::new();
    let summary = pipeline
        .run(&mut sink, CalibrationType::Brightness, false)
        .unwrap();
    assert_eq!(summary.calibration, "stored");

    assert_eq!(sink.brightness[1], vec![53, 58, 63, 68]);
    for line in 0..2 {
        let expected: Vec<u8> = area
            .layout
            .raw_line(line)
            .iter()
            .map(|&v| v as u8)
            .collect();
        assert_eq!(sink.brightness[line], expected, "line {line}");
    }
}

#[test]
fn test_stored_brightness_cannot_become_temperature() {
    let mut pipeline = open(&goes8_brightness_area(), &goes_context());
    let mut sink = MemorySink::new();

    let err = pipeline
        .run(&mut sink, CalibrationType::Temperature, false)
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Calibration(CalibrationError::Unconvertible {
            from: CalibrationType::Brightness,
            to: CalibrationType::Temperature
        })
    ));
    assert!(sink.metadata.is_none());
}

/// Sink that rejects the second line.
#[derive(Default)]
struct FailingSink {
    lines: usize,
}

impl OutputSink for FailingSink {
    fn begin(&mut self, _: &conversion::GlobalMetadata) -> conversion::ConversionResult<()> {
        Ok(())
    }

    fn write_line(
        &mut self,
        line: usize,
        _: CalibratedLine<'_>,
    ) -> conversion::ConversionResult<()> {
        if line == 1 {
            return Err(ConversionError::sink("disk full"));
        }
        self.lines += 1;
        Ok(())
    }

    fn write_lat_lon(&mut self, _: usize, _: &[f32], _: &[f32]) -> conversion::ConversionResult<()> {
        Ok(())
    }

    fn finish(&mut self, _: &conversion::Summary) -> conversion::ConversionResult<()> {
        panic!("finish called after a failed line");
    }
}

#[test]
fn test_sink_failure_is_fatal() {
    let mut pipeline = open(&small_lambert_area(), &PipelineContext::default());
    let mut sink = FailingSink::default();
    let err = pipeline.run(&mut sink, CalibrationType::Raw, true).unwrap_err();

    assert!(matches!(err, ConversionError::Sink(ref m) if m == "disk full"));
    assert_eq!(sink.lines, 1);
    assert_eq!(pipeline.state(), PipelineState::Failed);
}
