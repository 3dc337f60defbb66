//! Scan-line decoding.
//!
//! A scan line is `prefix_bytes` of per-line header followed by
//! `bands * elems` samples, band-minor: the samples of every band for
//! element 0, then every band for element 1, and so on. Decoded samples keep
//! that layout, so sample `(band, elem)` lands at `band + elem * bands`.

use std::io::Read;

use area_common::ImageGeometry;
use bytes::Buf;
use tracing::warn;

use crate::error::{ReaderError, ReaderResult};
use crate::stream::read_full;

/// How samples are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned byte
    U8,
    /// Unsigned 16-bit
    U16,
    /// Signed 32-bit
    I32,
}

impl SampleFormat {
    /// Format for a declared width. Unknown widths fall back to 32-bit.
    pub fn for_width(width: usize) -> Self {
        match width {
            1 => SampleFormat::U8,
            2 => SampleFormat::U16,
            _ => SampleFormat::I32,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
            SampleFormat::I32 => 4,
        }
    }
}

/// Decodes scan lines from a sequential stream into `f32` samples.
///
/// The decoder owns a byte scratch buffer sized for one line; it is reused
/// for every call.
#[derive(Debug)]
pub struct LineDecoder {
    format: SampleFormat,
    swapped: bool,
    prefix_bytes: usize,
    samples: usize,
    scratch: Vec<u8>,
}

impl LineDecoder {
    pub fn new(geometry: &ImageGeometry) -> Self {
        let format = SampleFormat::for_width(geometry.data_width);
        if format.size() != geometry.data_width {
            warn!(
                declared = geometry.data_width,
                used = format.size(),
                "Unrecognised sample width, decoding as 32-bit"
            );
        }
        let samples = geometry.samples_per_line();
        Self {
            format,
            swapped: geometry.swapped,
            prefix_bytes: geometry.prefix_bytes,
            samples,
            scratch: vec![0u8; geometry.prefix_bytes + samples * format.size()],
        }
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Samples produced per line (bands times elements).
    pub fn samples_per_line(&self) -> usize {
        self.samples
    }

    /// Bytes consumed per line, prefix included.
    pub fn bytes_per_line(&self) -> usize {
        self.scratch.len()
    }

    /// Decode the next line into `out`.
    ///
    /// Consumes exactly [`bytes_per_line`](Self::bytes_per_line) bytes. On a
    /// short read `out` is left untouched and
    /// [`ReaderError::TruncatedStream`] is returned.
    pub fn decode_line<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        out: &mut [f32],
    ) -> ReaderResult<()> {
        if out.len() != self.samples {
            return Err(ReaderError::BufferSize {
                expected: self.samples,
                actual: out.len(),
            });
        }

        read_full(stream, &mut self.scratch)?;

        let mut buf = &self.scratch[self.prefix_bytes..];
        match (self.format, self.swapped) {
            (SampleFormat::U8, _) => {
                for v in out.iter_mut() {
                    *v = buf.get_u8() as f32;
                }
            }
            (SampleFormat::U16, false) => {
                for v in out.iter_mut() {
                    *v = buf.get_u16() as f32;
                }
            }
            (SampleFormat::U16, true) => {
                for v in out.iter_mut() {
                    *v = buf.get_u16_le() as f32;
                }
            }
            (SampleFormat::I32, false) => {
                for v in out.iter_mut() {
                    *v = buf.get_i32() as f32;
                }
            }
            (SampleFormat::I32, true) => {
                for v in out.iter_mut() {
                    *v = partial_swap(buf.get_i32()) as f32;
                }
            }
        }
        Ok(())
    }
}

/// Swapped 32-bit samples keep only bytes 0 and 1 of the stored word,
/// rebuilt as a 16-bit value. The upper half is discarded.
#[inline]
pub fn partial_swap(v: i32) -> i32 {
    (((v >> 16) & 0xff) << 8) | ((v >> 24) & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_common::{BandMap, SensorId};
    use std::io::Cursor;

    fn geometry(width: usize, swapped: bool, prefix: usize) -> ImageGeometry {
        ImageGeometry {
            sensor: SensorId(0),
            start_line: 1,
            start_elem: 1,
            line_res: 1,
            elem_res: 1,
            num_lines: 1,
            num_elems: 2,
            num_bands: 1,
            band_map: BandMap(1),
            data_width: width,
            prefix_bytes: prefix,
            swapped,
            source_cal_type: None,
        }
    }

    #[test]
    fn test_u8_is_unsigned() {
        let mut decoder = LineDecoder::new(&geometry(1, false, 0));
        let mut out = [0.0f32; 2];
        decoder
            .decode_line(&mut Cursor::new(vec![0xFF, 0x80]), &mut out)
            .unwrap();
        assert_eq!(out, [255.0, 128.0]);
    }

    #[test]
    fn test_u16_swapped() {
        let mut decoder = LineDecoder::new(&geometry(2, true, 0));
        let mut out = [0.0f32; 2];
        decoder
            .decode_line(&mut Cursor::new(vec![0x34, 0x12, 0xFF, 0xFF]), &mut out)
            .unwrap();
        assert_eq!(out, [0x1234 as f32, 65535.0]);
    }

    #[test]
    fn test_i32_signed() {
        let mut decoder = LineDecoder::new(&geometry(4, false, 0));
        let mut bytes = (-5i32).to_be_bytes().to_vec();
        bytes.extend_from_slice(&70000i32.to_be_bytes());
        let mut out = [0.0f32; 2];
        decoder.decode_line(&mut Cursor::new(bytes), &mut out).unwrap();
        assert_eq!(out, [-5.0, 70000.0]);
    }

    #[test]
    fn test_partial_swap_discards_upper_half() {
        // Little-endian 0x0001_0203 on disk reads back as 0x0302_0100
        let v = i32::from_be_bytes([0x03, 0x02, 0x01, 0x00]);
        assert_eq!(partial_swap(v), 0x0203);
        assert_eq!(partial_swap(i32::from_be_bytes(70000u32.to_le_bytes())), 70000 & 0xFFFF);
    }

    #[test]
    fn test_odd_width_falls_back_to_four_bytes() {
        let decoder = LineDecoder::new(&geometry(3, false, 6));
        assert_eq!(decoder.format(), SampleFormat::I32);
        assert_eq!(decoder.bytes_per_line(), 6 + 2 * 4);
    }

    #[test]
    fn test_buffer_size_checked() {
        let mut decoder = LineDecoder::new(&geometry(1, false, 0));
        let mut out = [0.0f32; 3];
        assert!(matches!(
            decoder.decode_line(&mut Cursor::new(vec![0u8; 8]), &mut out),
            Err(ReaderError::BufferSize { expected: 2, actual: 3 })
        ));
    }
}
