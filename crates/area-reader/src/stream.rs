//! Forward-only byte stream with position tracking.
//!
//! AREA sections are addressed by absolute byte offsets, but the input may be
//! a pipe or a network stream, so the reader never seeks. Gaps are skipped by
//! reading and discarding.

use std::io::{self, Read};

use bytes::Buf;

use crate::error::{ReaderError, ReaderResult};

/// A reader that knows how many bytes it has consumed.
#[derive(Debug)]
pub struct AreaStream<R> {
    inner: R,
    position: u64,
}

impl<R: Read> AreaStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes consumed since the stream was opened.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Advance to an absolute offset, discarding the bytes in between.
    pub fn skip_to(&mut self, offset: u64) -> ReaderResult<()> {
        if offset < self.position {
            return Err(ReaderError::OffsetBehindCursor {
                offset,
                position: self.position,
            });
        }
        let gap = offset - self.position;
        let skipped = io::copy(&mut self.by_ref().take(gap), &mut io::sink())?;
        if skipped < gap {
            return Err(ReaderError::TruncatedStream {
                expected: gap as usize,
                received: skipped as usize,
            });
        }
        Ok(())
    }

    /// Read `count` big-endian 32-bit words.
    pub fn read_words(&mut self, count: usize) -> ReaderResult<Vec<i32>> {
        let mut raw = vec![0u8; count * 4];
        read_full(self, &mut raw)?;
        let mut buf = &raw[..];
        Ok((0..count).map(|_| buf.get_i32()).collect())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for AreaStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Fill `buf` completely or fail with [`ReaderError::TruncatedStream`].
///
/// Unlike `read_exact`, the error reports how many bytes did arrive.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> ReaderResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(ReaderError::TruncatedStream {
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
