//! Test data generators for synthetic AREA images.
//!
//! These generators create predictable, verifiable byte streams and
//! parameter blocks so decoders and navigators can be checked against known
//! values without shipping real satellite files.

/// Size of the AREA image directory in 32-bit words.
pub const DIRECTORY_WORDS: usize = 64;

/// Typical navigation block length for non-GVAR projections.
pub const NAV_BLOCK_WORDS: usize = 128;

/// GVAR navigation block length.
pub const GVAR_NAV_BLOCK_WORDS: usize = 640;

/// Directory words that hold ASCII text and are never byte-swapped.
const DIRECTORY_TEXT_WORDS: [usize; 11] = [24, 25, 26, 27, 28, 29, 30, 31, 51, 52, 56];

/// Word ranges of a GVAR navigation block that hold binary values.
const GVAR_BINARY_RANGES: [(usize, usize); 5] =
    [(2, 126), (129, 254), (257, 382), (385, 510), (513, 638)];

/// Pack a four-character tag into a big-endian word.
pub fn tag_word(tag: &[u8; 4]) -> i32 {
    i32::from_be_bytes(*tag)
}

/// Encode decimal degrees as a McIDAS DDDMMSS integer.
///
/// ```
/// use test_utils::dms;
///
/// assert_eq!(dms(25.0), 250000);
/// assert_eq!(dms(-97.5), -973000);
/// ```
pub fn dms(degrees: f64) -> i32 {
    let sign = if degrees < 0.0 { -1 } else { 1 };
    let total_seconds = (degrees.abs() * 3600.0).round() as i32;
    let d = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    sign * (d * 10000 + m * 100 + s)
}

/// Predictable raw count for a sample position. Always fits in one byte.
///
/// ```
/// use test_utils::raw_sample;
///
/// assert_eq!(raw_sample(0, 0, 0), 0);
/// assert!(raw_sample(7, 3, 99) < 256);
/// ```
pub fn raw_sample(line: usize, band: usize, elem: usize) -> u32 {
    ((line * 53 + band * 17 + elem * 5) % 251) as u32
}

/// Shape of a synthetic scan-data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLayout {
    pub lines: usize,
    pub elems: usize,
    pub bands: usize,
    /// Declared sample width; anything but 1 or 2 is stored as 4 bytes
    pub width: usize,
    pub prefix: usize,
    pub swapped: bool,
}

impl ScanLayout {
    pub fn new(lines: usize, elems: usize, bands: usize, width: usize) -> Self {
        Self {
            lines,
            elems,
            bands,
            width,
            prefix: 0,
            swapped: false,
        }
    }

    pub fn with_prefix(mut self, prefix: usize) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn swapped(mut self) -> Self {
        self.swapped = true;
        self
    }

    pub fn effective_width(&self) -> usize {
        match self.width {
            1 | 2 => self.width,
            _ => 4,
        }
    }

    /// Bytes occupied by one scan line including its prefix.
    pub fn line_bytes(&self) -> usize {
        self.prefix + self.effective_width() * self.bands * self.elems
    }

    /// Expected decoded samples of one line, interleaved as `[band + elem * bands]`.
    pub fn raw_line(&self, line: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.bands * self.elems);
        for elem in 0..self.elems {
            for band in 0..self.bands {
                out.push(raw_sample(line, band, elem) as f32);
            }
        }
        out
    }
}

/// Append one sample in the on-disk representation.
///
/// Swapped 4-byte samples are written little-endian, which is what a
/// byte-swapped producer would have stored.
pub fn encode_sample(value: u32, width: usize, swapped: bool, out: &mut Vec<u8>) {
    match width {
        1 => out.push(value as u8),
        2 => {
            let v = value as u16;
            if swapped {
                out.extend_from_slice(&v.to_le_bytes());
            } else {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
        _ => {
            if swapped {
                out.extend_from_slice(&value.to_le_bytes());
            } else {
                out.extend_from_slice(&value.to_be_bytes());
            }
        }
    }
}

/// Creates the scan-data section for a layout, filled with [`raw_sample`] values.
///
/// Prefix bytes are filled with `0xEE` so a decoder that forgets to skip them
/// produces visibly wrong samples.
pub fn scanline_stream(layout: &ScanLayout) -> Vec<u8> {
    let width = layout.effective_width();
    let mut out = Vec::with_capacity(layout.lines * layout.line_bytes());
    for line in 0..layout.lines {
        out.extend(std::iter::repeat(0xEE).take(layout.prefix));
        for elem in 0..layout.elems {
            for band in 0..layout.bands {
                encode_sample(raw_sample(line, band, elem), width, layout.swapped, &mut out);
            }
        }
    }
    out
}

fn padded_block(tag: &[u8; 4], values: &[(usize, i32)], len: usize) -> Vec<i32> {
    let mut block = vec![0i32; len];
    block[0] = tag_word(tag);
    for &(index, value) in values {
        block[index] = value;
    }
    block
}

/// Lambert Conformal navigation block.
///
/// Pole position is in area coordinates, latitudes and the reference
/// longitude (west-positive) in DDDMMSS, spacing and radius in meters.
#[allow(clippy::too_many_arguments)]
pub fn lambert_nav_block(
    pole_line: i32,
    pole_elem: i32,
    lat1_dms: i32,
    lat2_dms: i32,
    spacing_m: i32,
    lon_dms: i32,
    radius_m: i32,
    pole_indicator: i32,
) -> Vec<i32> {
    padded_block(
        b"LAMB",
        &[
            (1, pole_line),
            (2, pole_elem),
            (3, lat1_dms),
            (4, lat2_dms),
            (5, spacing_m),
            (6, lon_dms),
            (7, radius_m),
            (11, pole_indicator),
        ],
        NAV_BLOCK_WORDS,
    )
}

/// Mercator navigation block.
pub fn mercator_nav_block(
    equator_line: i32,
    normal_elem: i32,
    std_lat_dms: i32,
    spacing_m: i32,
    normal_lon_dms: i32,
    radius_m: i32,
) -> Vec<i32> {
    padded_block(
        b"MERC",
        &[
            (1, equator_line),
            (2, normal_elem),
            (3, std_lat_dms),
            (4, spacing_m),
            (5, normal_lon_dms),
            (6, radius_m),
        ],
        NAV_BLOCK_WORDS,
    )
}

/// Polar Stereographic navigation block.
pub fn polar_nav_block(
    pole_line: i32,
    pole_elem: i32,
    std_lat_dms: i32,
    spacing_m: i32,
    normal_lon_dms: i32,
    radius_m: i32,
) -> Vec<i32> {
    padded_block(
        b"PS  ",
        &[
            (1, pole_line),
            (2, pole_elem),
            (3, std_lat_dms),
            (4, spacing_m),
            (5, normal_lon_dms),
            (6, radius_m),
        ],
        NAV_BLOCK_WORDS,
    )
}

/// GVAR navigation block whose binary words hold their own index.
///
/// Words outside the binary ranges hold an ASCII marker so swap tests can
/// tell the two apart.
pub fn gvar_nav_block() -> Vec<i32> {
    let marker = tag_word(b"TEXT");
    let mut block: Vec<i32> = (0..GVAR_NAV_BLOCK_WORDS)
        .map(|i| if gvar_word_is_binary(i) { i as i32 } else { marker })
        .collect();
    block[0] = tag_word(b"GVAR");
    block
}

fn gvar_word_is_binary(index: usize) -> bool {
    GVAR_BINARY_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&index))
}

/// Encode words big-endian, writing the ones selected by `swap` little-endian.
pub fn encode_words(words: &[i32], swap: impl Fn(usize) -> bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 4);
    for (i, w) in words.iter().enumerate() {
        if swap(i) {
            out.extend_from_slice(&w.to_le_bytes());
        } else {
            out.extend_from_slice(&w.to_be_bytes());
        }
    }
    out
}

/// A complete synthetic AREA file.
#[derive(Debug, Clone)]
pub struct SyntheticArea {
    pub sensor: i32,
    pub start_line: i32,
    pub start_elem: i32,
    pub line_res: i32,
    pub elem_res: i32,
    pub layout: ScanLayout,
    pub band_map: u32,
    pub image_date: i32,
    pub image_time: i32,
    pub creation_date: i32,
    pub creation_time: i32,
    pub project: i32,
    pub source_type: [u8; 4],
    pub cal_type: [u8; 4],
    pub nav: Vec<i32>,
    pub cal: Vec<i32>,
    /// Padding bytes between the directory and the first block
    pub gap: usize,
}

impl SyntheticArea {
    /// An image with bands 1..=n present, no blocks and unit resolution.
    pub fn new(layout: ScanLayout) -> Self {
        Self {
            sensor: 70,
            start_line: 1,
            start_elem: 1,
            line_res: 1,
            elem_res: 1,
            layout,
            band_map: if layout.bands >= 32 {
                u32::MAX
            } else {
                (1u32 << layout.bands) - 1
            },
            image_date: 104123,
            image_time: 180000,
            creation_date: 104123,
            creation_time: 181500,
            project: 6999,
            source_type: *b"GVAR",
            cal_type: *b"RAW ",
            nav: Vec::new(),
            cal: Vec::new(),
            gap: 0,
        }
    }

    pub fn with_nav(mut self, nav: Vec<i32>) -> Self {
        self.nav = nav;
        self
    }

    pub fn with_cal(mut self, cal: Vec<i32>) -> Self {
        self.cal = cal;
        self
    }

    fn nav_offset(&self) -> usize {
        DIRECTORY_WORDS * 4 + self.gap
    }

    fn cal_offset(&self) -> usize {
        self.nav_offset() + self.nav.len() * 4
    }

    pub fn data_offset(&self) -> usize {
        self.cal_offset() + self.cal.len() * 4
    }

    /// Directory words in native order.
    pub fn directory_words(&self) -> Vec<i32> {
        let mut dir = vec![0i32; DIRECTORY_WORDS];
        dir[1] = 4;
        dir[2] = self.sensor;
        dir[3] = self.image_date;
        dir[4] = self.image_time;
        dir[5] = self.start_line;
        dir[6] = self.start_elem;
        dir[8] = self.layout.lines as i32;
        dir[9] = self.layout.elems as i32;
        dir[10] = self.layout.width as i32;
        dir[11] = self.line_res;
        dir[12] = self.elem_res;
        dir[13] = self.layout.bands as i32;
        dir[14] = self.layout.prefix as i32;
        dir[15] = self.project;
        dir[16] = self.creation_date;
        dir[17] = self.creation_time;
        dir[18] = self.band_map as i32;
        dir[33] = self.data_offset() as i32;
        dir[34] = if self.nav.is_empty() { 0 } else { self.nav_offset() as i32 };
        dir[51] = tag_word(&self.source_type);
        dir[52] = tag_word(&self.cal_type);
        dir[62] = if self.cal.is_empty() { 0 } else { self.cal_offset() as i32 };
        dir
    }

    /// Serialize the whole file, honouring the layout's swap flag.
    pub fn to_bytes(&self) -> Vec<u8> {
        let swapped = self.layout.swapped;
        let mut out = encode_words(&self.directory_words(), |i| {
            swapped && !DIRECTORY_TEXT_WORDS.contains(&i)
        });
        out.extend(std::iter::repeat(0u8).take(self.gap));

        let gvar = self.nav.first() == Some(&tag_word(b"GVAR"));
        out.extend(encode_words(&self.nav, |i| {
            swapped && if gvar { gvar_word_is_binary(i) } else { i >= 1 }
        }));
        out.extend(encode_words(&self.cal, |i| swapped && i >= 1));
        out.extend(scanline_stream(&self.layout));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_encoding() {
        assert_eq!(dms(0.0), 0);
        assert_eq!(dms(45.5), 453000);
        assert_eq!(dms(-0.25), -1500);
        assert_eq!(dms(10.0 + 1.0 / 60.0 + 30.0 / 3600.0), 100130);
    }

    #[test]
    fn test_scanline_stream_size() {
        let layout = ScanLayout::new(3, 4, 2, 2).with_prefix(5);
        assert_eq!(layout.line_bytes(), 5 + 2 * 2 * 4);
        assert_eq!(scanline_stream(&layout).len(), 3 * layout.line_bytes());
    }

    #[test]
    fn test_odd_width_stored_as_four_bytes() {
        let layout = ScanLayout::new(1, 2, 1, 3);
        assert_eq!(layout.effective_width(), 4);
        assert_eq!(scanline_stream(&layout).len(), 8);
    }

    #[test]
    fn test_raw_line_layout() {
        let layout = ScanLayout::new(2, 3, 2, 1);
        let line = layout.raw_line(1);
        assert_eq!(line.len(), 6);
        // element 2, band 1
        assert_eq!(line[1 + 2 * 2], raw_sample(1, 1, 2) as f32);
    }

    #[test]
    fn test_encode_sample_swapped() {
        let mut out = Vec::new();
        encode_sample(0x0102, 2, true, &mut out);
        assert_eq!(out, vec![0x02, 0x01]);
    }

    #[test]
    fn test_synthetic_area_offsets() {
        let area = SyntheticArea::new(ScanLayout::new(2, 2, 1, 1))
            .with_nav(lambert_nav_block(-110, 50, 300000, 600000, 40000, 950000, 6371000, 0))
            .with_cal(vec![0; 16]);
        let dir = area.directory_words();
        assert_eq!(dir[34], 256);
        assert_eq!(dir[62], 256 + 128 * 4);
        assert_eq!(dir[33], 256 + 128 * 4 + 64);
        assert_eq!(area.to_bytes().len(), area.data_offset() + 4);
    }

    #[test]
    fn test_gvar_block_markers() {
        let block = gvar_nav_block();
        assert_eq!(block.len(), GVAR_NAV_BLOCK_WORDS);
        assert_eq!(block[2], 2);
        assert_eq!(block[127], tag_word(b"TEXT"));
        assert_eq!(block[513], 513);
        assert_eq!(block[639], tag_word(b"TEXT"));
    }
}
