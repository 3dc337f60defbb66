//! McIDAS AREA reader.
//!
//! An AREA file is a 64-word directory, optional navigation and calibration
//! parameter blocks, then scan data. This crate reads the directory and the
//! blocks up front and hands back a stream positioned at the first scan
//! line; the lines themselves are pulled one at a time through
//! [`LineDecoder`], so an image is never held in memory whole.

pub mod blocks;
pub mod directory;
pub mod error;
pub mod line_decoder;
pub mod stream;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub use blocks::{normalize_cal_block, normalize_nav_block, ParameterBlocks};
pub use directory::{AreaDirectory, AreaInfo, BlockOffsets};
pub use error::{ReaderError, ReaderResult};
pub use line_decoder::{LineDecoder, SampleFormat};
pub use stream::AreaStream;

/// An opened AREA image: parsed header, parameter blocks, and the scan data
/// still waiting in the stream.
#[derive(Debug)]
pub struct AreaImage<R> {
    pub directory: AreaDirectory,
    pub blocks: ParameterBlocks,
    pub stream: AreaStream<R>,
}

impl<R: Read> AreaImage<R> {
    /// Read the header and blocks from any byte source.
    pub fn from_reader(reader: R) -> ReaderResult<Self> {
        let mut stream = AreaStream::new(reader);
        let directory = AreaDirectory::read_from(&mut stream)?;
        let blocks = ParameterBlocks::read_from(&mut stream, &directory)?;
        Ok(Self {
            directory,
            blocks,
            stream,
        })
    }
}

/// Open an AREA file from disk.
pub fn open_area(path: impl AsRef<Path>) -> ReaderResult<AreaImage<BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    AreaImage::from_reader(BufReader::with_capacity(64 * 1024, file))
}
