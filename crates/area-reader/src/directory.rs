//! AREA image directory (the 64-word header at the start of every file).

use std::io::Read;

use area_common::{BandMap, CalibrationType, ImageGeometry, SensorId};
use bytes::Buf;
use tracing::debug;

use crate::error::{ReaderError, ReaderResult};
use crate::stream::{read_full, AreaStream};

/// Directory size in 32-bit words.
pub const DIRECTORY_WORDS: usize = 64;

/// Directory size in bytes.
pub const DIRECTORY_BYTES: usize = DIRECTORY_WORDS * 4;

/// Value of word 1 in a directory stored in native order.
pub const AREA_VERSION: i32 = 4;

// Word indices (0-based)
const W_VERSION: usize = 1;
const W_SENSOR: usize = 2;
const W_IMAGE_DATE: usize = 3;
const W_IMAGE_TIME: usize = 4;
const W_START_LINE: usize = 5;
const W_START_ELEM: usize = 6;
const W_NUM_LINES: usize = 8;
const W_NUM_ELEMS: usize = 9;
const W_DATA_WIDTH: usize = 10;
const W_LINE_RES: usize = 11;
const W_ELEM_RES: usize = 12;
const W_NUM_BANDS: usize = 13;
const W_PREFIX: usize = 14;
const W_PROJECT: usize = 15;
const W_CREATION_DATE: usize = 16;
const W_CREATION_TIME: usize = 17;
const W_BAND_MAP: usize = 18;
const W_DATA_OFFSET: usize = 33;
const W_NAV_OFFSET: usize = 34;
const W_SOURCE_TYPE: usize = 51;
const W_CAL_TYPE: usize = 52;
const W_CAL_OFFSET: usize = 62;

/// Words holding ASCII text, stored byte-for-byte regardless of byte order.
const TEXT_WORDS: [usize; 11] = [24, 25, 26, 27, 28, 29, 30, 31, 51, 52, 56];

/// Directory fields that describe the image but play no part in decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaInfo {
    pub version: i32,
    /// Nominal image date, CYYDDD
    pub image_date: i32,
    /// Nominal image time, HHMMSS
    pub image_time: i32,
    pub creation_date: i32,
    pub creation_time: i32,
    pub project: i32,
    /// Four-character source type, e.g. `GVAR`
    pub source_type: String,
}

/// Absolute byte offsets of the file sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOffsets {
    pub data: u64,
    pub navigation: Option<u64>,
    pub calibration: Option<u64>,
}

impl BlockOffsets {
    /// Navigation block length in bytes; it runs up to the calibration block
    /// when there is one, otherwise up to the data.
    pub fn navigation_len(&self) -> u64 {
        match self.navigation {
            Some(nav) => self
                .calibration
                .unwrap_or(self.data)
                .saturating_sub(nav),
            None => 0,
        }
    }

    /// Calibration block length in bytes.
    pub fn calibration_len(&self) -> u64 {
        self.calibration
            .map(|cal| self.data.saturating_sub(cal))
            .unwrap_or(0)
    }
}

/// Parsed directory.
#[derive(Debug, Clone)]
pub struct AreaDirectory {
    pub geometry: ImageGeometry,
    pub info: AreaInfo,
    pub offsets: BlockOffsets,
}

impl AreaDirectory {
    /// Read and parse the directory from the start of a stream.
    pub fn read_from<R: Read>(stream: &mut AreaStream<R>) -> ReaderResult<Self> {
        let mut raw = [0u8; DIRECTORY_BYTES];
        read_full(stream, &mut raw)?;
        Self::parse(&raw)
    }

    /// Parse a directory image, detecting byte order from the version word.
    pub fn parse(raw: &[u8; DIRECTORY_BYTES]) -> ReaderResult<Self> {
        let mut buf = &raw[..];
        let mut words = [0i32; DIRECTORY_WORDS];
        for w in words.iter_mut() {
            *w = buf.get_i32();
        }

        let swapped = words[W_VERSION] != AREA_VERSION;
        if swapped {
            for (i, w) in words.iter_mut().enumerate() {
                if !TEXT_WORDS.contains(&i) {
                    *w = w.swap_bytes();
                }
            }
            if words[W_VERSION] != AREA_VERSION {
                return Err(ReaderError::InvalidDirectory(format!(
                    "version word is {} in either byte order",
                    words[W_VERSION].swap_bytes()
                )));
            }
        }

        let geometry = ImageGeometry {
            sensor: SensorId(non_negative(&words, W_SENSOR, "sensor")? as u32),
            start_line: words[W_START_LINE],
            start_elem: words[W_START_ELEM],
            line_res: words[W_LINE_RES],
            elem_res: words[W_ELEM_RES],
            num_lines: non_negative(&words, W_NUM_LINES, "line count")?,
            num_elems: non_negative(&words, W_NUM_ELEMS, "element count")?,
            num_bands: non_negative(&words, W_NUM_BANDS, "band count")?,
            band_map: BandMap(words[W_BAND_MAP] as u32),
            data_width: non_negative(&words, W_DATA_WIDTH, "data width")?,
            prefix_bytes: non_negative(&words, W_PREFIX, "prefix size")?,
            swapped,
            source_cal_type: CalibrationType::from_word(words[W_CAL_TYPE]),
        };
        geometry.validate()?;

        let offsets = BlockOffsets {
            data: non_negative(&words, W_DATA_OFFSET, "data offset")? as u64,
            navigation: optional_offset(words[W_NAV_OFFSET]),
            calibration: optional_offset(words[W_CAL_OFFSET]),
        };

        let info = AreaInfo {
            version: words[W_VERSION],
            image_date: words[W_IMAGE_DATE],
            image_time: words[W_IMAGE_TIME],
            creation_date: words[W_CREATION_DATE],
            creation_time: words[W_CREATION_TIME],
            project: words[W_PROJECT],
            source_type: ascii_word(words[W_SOURCE_TYPE]),
        };

        debug!(
            sensor = %geometry.sensor,
            lines = geometry.num_lines,
            elems = geometry.num_elems,
            bands = geometry.num_bands,
            width = geometry.data_width,
            swapped,
            "Parsed AREA directory"
        );

        Ok(Self {
            geometry,
            info,
            offsets,
        })
    }
}

fn non_negative(words: &[i32], index: usize, what: &str) -> ReaderResult<usize> {
    usize::try_from(words[index]).map_err(|_| {
        ReaderError::InvalidDirectory(format!("{} is negative ({})", what, words[index]))
    })
}

fn optional_offset(word: i32) -> Option<u64> {
    (word > 0).then_some(word as u64)
}

fn ascii_word(word: i32) -> String {
    word.to_be_bytes()
        .iter()
        .filter(|b| b.is_ascii_graphic())
        .map(|&b| b as char)
        .collect()
}
