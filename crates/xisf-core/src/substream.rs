//! Substream view (C4): a bounded, read-only window onto a seekable carrier.
//!
//! Used by the data-block processor (C5) to hand each `Attached` block's
//! reader a view it cannot read or seek past, and by the `.xisb` index
//! navigator (C9) to hand out per-element views without granting access to
//! the rest of the file.

use std::io::{self, Read, Seek, SeekFrom};

/// A read-only `[offset, offset + length)` window onto a carrier.
///
/// Does not own the carrier: dropping a `SubstreamView` leaves the carrier
/// open (`leave_open` semantics, per the XISF 1.0 specification's substream
/// view section). The carrier must not be used concurrently while a view
/// over it is live.
pub struct SubstreamView<'a, C> {
    carrier: &'a mut C,
    offset: u64,
    length: u64,
    /// Current read position, relative to `offset`.
    cursor: u64,
}

impl<'a, C: Seek> SubstreamView<'a, C> {
    /// Create a view of `length` bytes starting at `offset` in `carrier`.
    pub fn new(carrier: &'a mut C, offset: u64, length: u64) -> io::Result<Self> {
        let mut view = SubstreamView {
            carrier,
            offset,
            length,
            cursor: 0,
        };
        view.carrier.seek(SeekFrom::Start(offset))?;
        Ok(view)
    }

    /// Window length in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<C: Read + Seek> Read for SubstreamView<'_, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.length.saturating_sub(self.cursor);
        if remaining == 0 {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(remaining) as usize;
        let n = self.carrier.read(&mut buf[..want])?;
        self.cursor += n as u64;
        Ok(n)
    }
}

impl<C: Seek> Seek for SubstreamView<'_, C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::End(n) => self.length as i128 + n as i128,
            SeekFrom::Current(n) => self.cursor as i128 + n as i128,
        };
        // Clamp to [0, length] rather than erroring.
        let clamped = target.clamp(0, self.length as i128) as u64;
        self.carrier.seek(SeekFrom::Start(self.offset + clamped))?;
        self.cursor = clamped;
        Ok(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_only_the_window() {
        let data = b"0123456789".to_vec();
        let mut carrier = Cursor::new(data);
        let mut view = SubstreamView::new(&mut carrier, 2, 4).unwrap();
        let mut buf = Vec::new();
        view.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"2345");
    }

    #[test]
    fn read_returns_zero_at_eof() {
        let data = b"abcdef".to_vec();
        let mut carrier = Cursor::new(data);
        let mut view = SubstreamView::new(&mut carrier, 1, 2).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(view.read(&mut buf).unwrap(), 2);
        assert_eq!(view.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_clamps_to_window() {
        let data = b"0123456789".to_vec();
        let mut carrier = Cursor::new(data);
        let mut view = SubstreamView::new(&mut carrier, 3, 3).unwrap();

        view.seek(SeekFrom::End(100)).unwrap();
        let mut buf = Vec::new();
        view.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());

        view.seek(SeekFrom::Start(0)).unwrap();
        let mut buf2 = [0u8; 2];
        view.read_exact(&mut buf2).unwrap();
        assert_eq!(&buf2, b"34");
    }

    #[test]
    fn negative_seek_clamps_to_zero() {
        let data = b"abcdefgh".to_vec();
        let mut carrier = Cursor::new(data);
        let mut view = SubstreamView::new(&mut carrier, 2, 4).unwrap();
        view.seek(SeekFrom::Current(-1000)).unwrap();
        let mut buf = [0u8; 1];
        view.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"c");
    }
}
