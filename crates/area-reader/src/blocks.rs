//! Navigation and calibration parameter blocks.
//!
//! Both blocks are arrays of 32-bit words following the directory. Word 0
//! is always a four-character tag and is never byte-swapped. For a GVAR
//! navigation block several other words are text too, so only five binary
//! ranges are swapped.

use std::io::Read;

use tracing::debug;

use crate::directory::AreaDirectory;
use crate::error::ReaderResult;
use crate::stream::AreaStream;

/// Navigation tag of GOES Variable format blocks.
pub const GVAR_TAG: i32 = i32::from_be_bytes(*b"GVAR");

/// Binary word ranges of a GVAR navigation block (inclusive).
pub const GVAR_SWAP_RANGES: [(usize, usize); 5] =
    [(2, 126), (129, 254), (257, 382), (385, 510), (513, 638)];

/// Parameter blocks in native byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBlocks {
    pub navigation: Option<Vec<i32>>,
    pub calibration: Option<Vec<i32>>,
}

impl ParameterBlocks {
    /// Read whichever blocks the directory declares, leaving the stream at
    /// the start of scan data.
    pub fn read_from<R: Read>(
        stream: &mut AreaStream<R>,
        directory: &AreaDirectory,
    ) -> ReaderResult<Self> {
        let offsets = directory.offsets;
        let swapped = directory.geometry.swapped;

        let navigation = match offsets.navigation {
            Some(offset) if offsets.navigation_len() >= 4 => {
                stream.skip_to(offset)?;
                let mut block = stream.read_words((offsets.navigation_len() / 4) as usize)?;
                if swapped {
                    normalize_nav_block(&mut block);
                }
                Some(block)
            }
            _ => None,
        };

        let calibration = match offsets.calibration {
            Some(offset) if offsets.calibration_len() >= 4 => {
                stream.skip_to(offset)?;
                let mut block = stream.read_words((offsets.calibration_len() / 4) as usize)?;
                if swapped {
                    normalize_cal_block(&mut block);
                }
                Some(block)
            }
            _ => None,
        };

        stream.skip_to(offsets.data)?;

        debug!(
            nav_words = navigation.as_ref().map(Vec::len).unwrap_or(0),
            cal_words = calibration.as_ref().map(Vec::len).unwrap_or(0),
            "Read parameter blocks"
        );

        Ok(Self {
            navigation,
            calibration,
        })
    }
}

/// Swap a navigation block read from a byte-swapped file into native order.
pub fn normalize_nav_block(block: &mut [i32]) {
    if block.first() == Some(&GVAR_TAG) {
        for &(lo, hi) in &GVAR_SWAP_RANGES {
            swap_range(block, lo, hi);
        }
    } else if !block.is_empty() {
        let last = block.len() - 1;
        swap_range(block, 1, last);
    }
}

/// Swap a calibration block read from a byte-swapped file into native order.
pub fn normalize_cal_block(block: &mut [i32]) {
    if !block.is_empty() {
        let last = block.len() - 1;
        swap_range(block, 1, last);
    }
}

/// Byte-swap words `lo..=hi`, clipped to the block.
fn swap_range(block: &mut [i32], lo: usize, hi: usize) {
    let hi = hi.min(block.len().saturating_sub(1));
    if lo > hi || lo >= block.len() {
        return;
    }
    for w in &mut block[lo..=hi] {
        *w = w.swap_bytes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_swap_keeps_tag() {
        let tag = i32::from_be_bytes(*b"LAMB");
        let mut block = vec![tag, 1i32.swap_bytes(), 2i32.swap_bytes()];
        normalize_nav_block(&mut block);
        assert_eq!(block, vec![tag, 1, 2]);
    }

    #[test]
    fn test_gvar_ranges() {
        let mut block: Vec<i32> = (0..640).map(|i: i32| i.swap_bytes()).collect();
        block[0] = GVAR_TAG;
        normalize_nav_block(&mut block);

        assert_eq!(block[0], GVAR_TAG);
        // Text words are left alone
        for i in [1usize, 127, 128, 255, 256, 383, 384, 511, 512, 639] {
            assert_eq!(block[i], (i as i32).swap_bytes(), "word {}", i);
        }
        for i in [2usize, 126, 129, 254, 257, 382, 385, 510, 513, 638] {
            assert_eq!(block[i], i as i32, "word {}", i);
        }
    }

    #[test]
    fn test_short_gvar_block_clipped() {
        let mut block = vec![GVAR_TAG, 0, 5i32.swap_bytes()];
        normalize_nav_block(&mut block);
        assert_eq!(block, vec![GVAR_TAG, 0, 5]);
    }

    #[test]
    fn test_cal_block() {
        let mut block = vec![9, 3i32.swap_bytes()];
        normalize_cal_block(&mut block);
        assert_eq!(block, vec![9, 3]);

        let mut single = vec![9];
        normalize_cal_block(&mut single);
        assert_eq!(single, vec![9]);
    }
}
