//! Fixed-capacity read buffer backing the XML scanner (C2).
//!
//! `BoundedReader` is a `BufRead` implementation with a fixed internal
//! buffer, refilled on demand, wrapping any byte source (a plain file, or
//! one of the decompressing readers from [`crate::codec`]). The scanner
//! layered on top (C3) is responsible for raising [`crate::Error::Xml`]
//! with a `LineTooLong`-flavoured reason when a single tag or text run
//! outgrows [`MAX_ELEMENT_SIZE`] — this module only guarantees that no
//! single fill never copies more than `capacity` bytes the caller hasn't
//! asked for.

use std::io::{self, BufRead, Read};

/// Default internal buffer capacity: 64 KiB, per spec.md's recommendation.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Maximum size a single scanner-accumulated tag or text run may reach
/// before the scanner reports `LineTooLong`. Set far above
/// [`DEFAULT_CAPACITY`]: this guards against a malformed, never-terminated
/// element consuming unbounded memory, not against ordinary revision text —
/// a single wikitext article revision routinely exceeds 64 KiB.
pub const MAX_ELEMENT_SIZE: usize = 256 * 1024 * 1024;

/// A `BufRead` wrapper with a fixed-capacity internal buffer.
pub struct BoundedReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    cap: usize,
    capacity: usize,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: vec![0; capacity],
            pos: 0,
            cap: 0,
            capacity,
        }
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.cap {
            if out.len() >= self.capacity {
                // Bypass the internal buffer for large reads, like BufReader does.
                return self.inner.read(out);
            }
            self.fill()?;
        }
        let n = std::cmp::min(out.len(), self.cap - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl<R: Read> BoundedReader<R> {
    fn fill(&mut self) -> io::Result<()> {
        self.pos = 0;
        self.cap = self.inner.read(&mut self.buf)?;
        Ok(())
    }
}

impl<R: Read> BufRead for BoundedReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.cap {
            self.fill()?;
        }
        Ok(&self.buf[self.pos..self.cap])
    }

    fn consume(&mut self, amount: usize) {
        self.pos = std::cmp::min(self.pos + amount, self.cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn reads_through_bounded_buffer() {
        let data = b"hello, world".to_vec();
        let mut reader = BoundedReader::with_capacity(&data[..], 4);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn fill_buf_never_exceeds_capacity() {
        let data = vec![1u8; 1000];
        let mut reader = BoundedReader::with_capacity(&data[..], 16);
        let chunk = reader.fill_buf().unwrap();
        assert!(chunk.len() <= 16);
    }
}
