//! Spectral band bookkeeping.

use serde::{Deserialize, Serialize};

/// Highest band number representable in a single band map word.
pub const MAX_BANDS: u32 = 32;

/// Bitmap of the bands present in an image.
///
/// Bit `i` set means band `i + 1` is present. Samples for the present bands
/// appear in ascending band-number order within each element of a scan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BandMap(pub u32);

impl BandMap {
    /// Build a map from explicit 1-based band numbers. Numbers outside 1..=32 are ignored.
    pub fn from_bands(bands: &[u32]) -> Self {
        let bits = bands
            .iter()
            .filter(|&&b| (1..=MAX_BANDS).contains(&b))
            .fold(0u32, |acc, &b| acc | (1 << (b - 1)));
        Self(bits)
    }

    /// Number of bands present.
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check whether a 1-based band number is present.
    pub fn contains(&self, band: u32) -> bool {
        (1..=MAX_BANDS).contains(&band) && (self.0 >> (band - 1)) & 1 == 1
    }

    /// Present band numbers in ascending order.
    pub fn bands(&self) -> Vec<u32> {
        (0..MAX_BANDS)
            .filter(|i| (self.0 >> i) & 1 == 1)
            .map(|i| i + 1)
            .collect()
    }
}
