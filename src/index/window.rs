//! A fixed-capacity byte window over a larger seekable file.

use std::io::{Read, Seek, SeekFrom};
use log::trace;

use super::utils;

/// An in-memory slice of a larger file, refilled on demand.
///
/// The window covers the absolute byte range `[start, start + len)`. A read
/// is served from memory only when it lies entirely inside that range;
/// otherwise the caller refills the window first.
#[derive(Debug)]
pub struct ByteWindow {
    buf: Vec<u8>,
    start: u64,
    filled: usize,
    cursor: usize,
}

impl ByteWindow {
    /// Allocates a window able to hold `capacity` bytes. Nothing is buffered yet.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)],
            start: 0,
            filled: 0,
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Absolute file offset of the first buffered byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of valid bytes currently buffered.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Absolute file offset just past the last byte handed out by `read_at`.
    pub fn position(&self) -> u64 {
        self.start + self.cursor as u64
    }

    /// Whether `[pos, pos + len)` is fully buffered.
    pub fn contains(&self, pos: u64, len: usize) -> bool {
        pos >= self.start && pos + len as u64 <= self.start + self.filled as u64
    }

    /// Repositions `source` at `from` and buffers up to `length` bytes.
    ///
    /// `length` is capped at the window capacity. Reaching the end of the
    /// source early leaves a partially filled window, which is not an error.
    pub fn refill<R: Read + Seek + ?Sized>(
        &mut self,
        source: &mut R,
        from: u64,
        length: usize,
    ) -> std::io::Result<usize> {
        let length = length.min(self.buf.len());
        source.seek(SeekFrom::Start(from))?;
        // Invalidate first so a failed read never leaves stale bytes addressable.
        self.start = from;
        self.filled = 0;
        self.cursor = 0;
        self.filled = utils::read_fully(source, &mut self.buf[..length])?;
        trace!("Window refilled at {}: {} of {} bytes", from, self.filled, length);
        Ok(self.filled)
    }

    /// Borrows `len` buffered bytes starting at absolute offset `pos`.
    ///
    /// Returns `None` when the range is not inside the window.
    pub fn read_at(&mut self, pos: u64, len: usize) -> Option<&[u8]> {
        if !self.contains(pos, len) {
            return None;
        }
        let begin = (pos - self.start) as usize;
        self.cursor = begin + len;
        Some(&self.buf[begin..begin + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source() -> Cursor<Vec<u8>> {
        Cursor::new((0..=255u8).collect())
    }

    #[test]
    fn test_empty_window_contains_nothing() {
        let window = ByteWindow::with_capacity(16);
        assert!(window.is_empty());
        assert!(!window.contains(0, 1));
        assert!(window.contains(0, 0));
    }

    #[test]
    fn test_refill_and_read() {
        let mut src = source();
        let mut window = ByteWindow::with_capacity(16);
        assert_eq!(window.refill(&mut src, 100, 16).unwrap(), 16);
        assert_eq!(window.start(), 100);
        assert!(window.contains(100, 16));
        assert!(!window.contains(99, 2));
        assert!(!window.contains(110, 8));

        assert_eq!(window.read_at(104, 4), Some(&[104u8, 105, 106, 107][..]));
        assert_eq!(window.position(), 108);
        assert_eq!(window.read_at(116, 1), None);
    }

    #[test]
    fn test_refill_is_capped_at_capacity() {
        let mut src = source();
        let mut window = ByteWindow::with_capacity(8);
        assert_eq!(window.refill(&mut src, 0, 64).unwrap(), 8);
        assert_eq!(window.len(), 8);
    }

    #[test]
    fn test_short_fill_at_end_of_source() {
        let mut src = source();
        let mut window = ByteWindow::with_capacity(16);
        assert_eq!(window.refill(&mut src, 250, 16).unwrap(), 6);
        assert!(window.contains(250, 6));
        assert!(!window.contains(250, 7));
        assert_eq!(window.read_at(255, 1), Some(&[255u8][..]));
    }
}
