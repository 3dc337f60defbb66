//! Flat-file output.
//!
//! For an output base `out`, writes:
//! - `out.img`: calibrated samples, band-interleaved by pixel, little-endian
//!   (`u8` for brightness, `f32` otherwise)
//! - `out.lat` / `out.lon`: per-pixel `f32` latitude and longitude, when
//!   navigation is on
//! - `out.json`: global metadata, variable attributes and the summary
//!
//! Everything is staged in temporary files next to the output and renamed
//! into place by `finish`, so a failed conversion leaves nothing behind.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use conversion::{
    CalibratedLine, ConversionError, ConversionResult, GlobalMetadata, OutputSink, Summary,
};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

type Staged = BufWriter<NamedTempFile>;

#[derive(Serialize)]
struct Sidecar<'a> {
    image_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lon_file: Option<String>,
    metadata: &'a GlobalMetadata,
    summary: &'a Summary,
}

#[derive(Debug)]
pub struct FlatFileSink {
    base: PathBuf,
    metadata: Option<GlobalMetadata>,
    image: Option<Staged>,
    lats: Option<Staged>,
    lons: Option<Staged>,
    next_line: usize,
}

impl FlatFileSink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            metadata: None,
            image: None,
            lats: None,
            lons: None,
            next_line: 0,
        }
    }

    /// Path of one output file: the base name plus `extension`.
    pub fn path(&self, extension: &str) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    fn staging_dir(&self) -> &Path {
        match self.base.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn stage(&self) -> ConversionResult<Staged> {
        let file = NamedTempFile::new_in(self.staging_dir()).map_err(ConversionError::sink)?;
        Ok(BufWriter::new(file))
    }

    /// Flush one staged writer, keeping it as a temporary file.
    fn flush(staged: Staged) -> ConversionResult<NamedTempFile> {
        staged
            .into_inner()
            .map_err(|e| ConversionError::sink(e.error()))
    }

    /// Flush every data file and write the sidecar, all still under
    /// temporary names.
    fn prepare(&mut self, summary: &Summary) -> ConversionResult<Prepared> {
        let metadata = self
            .metadata
            .take()
            .ok_or_else(|| ConversionError::sink("finish before begin"))?;
        let image = self
            .image
            .take()
            .ok_or_else(|| ConversionError::sink("finish before begin"))?;

        let mut files = vec![(Self::flush(image)?, self.path("img"))];
        let mut lat_file = None;
        let mut lon_file = None;
        if let (Some(lats), Some(lons)) = (self.lats.take(), self.lons.take()) {
            lat_file = Some(self.path("lat").display().to_string());
            lon_file = Some(self.path("lon").display().to_string());
            files.push((Self::flush(lats)?, self.path("lat")));
            files.push((Self::flush(lons)?, self.path("lon")));
        }

        let sidecar = Sidecar {
            image_file: self.path("img").display().to_string(),
            lat_file,
            lon_file,
            metadata: &metadata,
            summary,
        };
        let mut json = self.stage()?;
        serde_json::to_writer_pretty(&mut json, &sidecar).map_err(ConversionError::sink)?;
        files.push((Self::flush(json)?, self.path("json")));

        Ok(Prepared { files })
    }
}

/// Complete output waiting under temporary names. The sidecar is last.
struct Prepared {
    files: Vec<(NamedTempFile, PathBuf)>,
}

impl Prepared {
    fn persist(self) -> ConversionResult<()> {
        for (file, path) in self.files {
            file.persist(&path).map_err(|e| ConversionError::sink(e.error))?;
        }
        Ok(())
    }
}

fn write_f32s(writer: &mut Staged, values: &[f32]) -> ConversionResult<()> {
    for v in values {
        writer
            .write_all(&v.to_le_bytes())
            .map_err(ConversionError::sink)?;
    }
    Ok(())
}

impl OutputSink for FlatFileSink {
    fn begin(&mut self, metadata: &GlobalMetadata) -> ConversionResult<()> {
        if let Some(dir) = self.base.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(ConversionError::sink)?;
        }
        self.image = Some(self.stage()?);
        if metadata.latitude.is_some() {
            self.lats = Some(self.stage()?);
            self.lons = Some(self.stage()?);
        }
        self.metadata = Some(metadata.clone());
        debug!(base = %self.base.display(), "Staging flat-file output");
        Ok(())
    }

    fn write_line(&mut self, line: usize, samples: CalibratedLine<'_>) -> ConversionResult<()> {
        if line != self.next_line {
            return Err(ConversionError::Sink(format!(
                "line {} arrived, expected {}",
                line, self.next_line
            )));
        }
        let writer = self
            .image
            .as_mut()
            .ok_or_else(|| ConversionError::sink("write_line before begin"))?;
        match samples {
            CalibratedLine::Brightness(bytes) => {
                writer.write_all(bytes).map_err(ConversionError::sink)?
            }
            CalibratedLine::Physical(values) => write_f32s(writer, values)?,
        }
        self.next_line += 1;
        Ok(())
    }

    fn write_lat_lon(&mut self, _line: usize, lats: &[f32], lons: &[f32]) -> ConversionResult<()> {
        match (self.lats.as_mut(), self.lons.as_mut()) {
            (Some(lat_writer), Some(lon_writer)) => {
                write_f32s(lat_writer, lats)?;
                write_f32s(lon_writer, lons)
            }
            _ => Err(ConversionError::sink(
                "latitude/longitude written but not announced in metadata",
            )),
        }
    }

    fn finish(&mut self, summary: &Summary) -> ConversionResult<()> {
        self.prepare(summary)?.persist()?;
        debug!(base = %self.base.display(), lines = self.next_line, "Flat-file output written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_common::CalibrationType;
    use conversion::{ConversionPipeline, PipelineContext};
    use std::io::Cursor;
    use test_utils::fixtures::small_lambert_area;

    fn convert(base: &Path, output: CalibrationType, navigate: bool) -> Summary {
        let area = small_lambert_area();
        let image = area_reader::AreaImage::from_reader(Cursor::new(area.to_bytes())).unwrap();
        let mut pipeline =
            ConversionPipeline::open_image(image, &PipelineContext::default()).unwrap();
        let mut sink = FlatFileSink::new(base);
        pipeline.run(&mut sink, output, navigate).unwrap()
    }

    #[test]
    fn test_brightness_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("small");
        convert(&base, CalibrationType::Brightness, true);

        let layout = small_lambert_area().layout;
        let image = fs::read(dir.path().join("small.img")).unwrap();
        assert_eq!(image.len(), 3 * 4 * 2);
        let expected: Vec<u8> = (0..3)
            .flat_map(|l| layout.raw_line(l))
            .map(|v| v as u8)
            .collect();
        assert_eq!(image, expected);

        let lats = fs::read(dir.path().join("small.lat")).unwrap();
        assert_eq!(lats.len(), 3 * 4 * 4);

        let sidecar: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("small.json")).unwrap()).unwrap();
        assert_eq!(sidecar["metadata"]["projection"]["projName"], "LAMBERT_CONFORMAL");
        assert_eq!(sidecar["metadata"]["image"]["units"], "brightness counts");
        assert_eq!(sidecar["summary"]["lines"], 3);
    }

    #[test]
    fn test_float_samples_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("raw");
        convert(&base, CalibrationType::Raw, false);

        let image = fs::read(dir.path().join("raw.img")).unwrap();
        let values: Vec<f32> = image
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(&values[..8], &small_lambert_area().layout.raw_line(0)[..]);
        assert!(!dir.path().join("raw.lat").exists());
    }

    #[test]
    fn test_nothing_committed_without_finish() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("partial");

        let area = small_lambert_area();
        let mut bytes = area.to_bytes();
        bytes.truncate(bytes.len() - 3);
        let image = area_reader::AreaImage::from_reader(Cursor::new(bytes)).unwrap();
        let mut pipeline =
            ConversionPipeline::open_image(image, &PipelineContext::default()).unwrap();
        let mut sink = FlatFileSink::new(&base);
        assert!(pipeline.run(&mut sink, CalibrationType::Raw, true).is_err());
        drop(sink);

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sidecar_staged_before_any_file_is_persisted() {
        let area = small_lambert_area();
        let image = area_reader::AreaImage::from_reader(Cursor::new(area.to_bytes())).unwrap();
        let mut pipeline =
            ConversionPipeline::open_image(image, &PipelineContext::default()).unwrap();
        let mut memory = conversion::MemorySink::new();
        let summary = pipeline.run(&mut memory, CalibrationType::Raw, true).unwrap();
        let metadata = memory.metadata.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut sink = FlatFileSink::new(dir.path().join("staged"));
        sink.begin(&metadata).unwrap();
        for (line, values) in memory.physical.iter().enumerate() {
            sink.write_line(line, CalibratedLine::Physical(values)).unwrap();
            sink.write_lat_lon(line, &memory.lats[line], &memory.lons[line])
                .unwrap();
        }

        let prepared = sink.prepare(&summary).unwrap();
        assert_eq!(prepared.files.len(), 4);
        assert_eq!(prepared.files[3].1, sink.path("json"));
        for ext in ["img", "lat", "lon", "json"] {
            assert!(!sink.path(ext).exists(), "{ext} persisted early");
        }

        prepared.persist().unwrap();
        for ext in ["img", "lat", "lon", "json"] {
            assert!(sink.path(ext).exists(), "{ext} missing");
        }
    }

    #[test]
    fn test_finish_before_begin_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FlatFileSink::new(dir.path().join("early"));
        let summary = convert(&dir.path().join("ref"), CalibrationType::Raw, false);
        assert!(sink.finish(&summary).is_err());
        assert!(!sink.path("json").exists());
    }

    #[test]
    fn test_output_paths() {
        let sink = FlatFileSink::new("/data/AREA0001");
        assert_eq!(sink.path("img"), PathBuf::from("/data/AREA0001.img"));
        assert_eq!(sink.path("json"), PathBuf::from("/data/AREA0001.json"));
    }
}
