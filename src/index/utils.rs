//! Low-level byte reading utilities

use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Read until `buf` is full or the source is exhausted.
///
/// Returns the number of bytes read. Unlike `read_exact`, a short read is
/// not an error; callers decide whether a partial fill is acceptable.
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Total length of a seekable stream, leaving the position where it was.
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> std::io::Result<u64> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok(len)
}
