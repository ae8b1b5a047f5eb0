//! Identifier index (`.fix`) header and entry encoding.
//!
//! # Layout
//! ```text
//! Header (13 bytes):
//! [1 byte]  Format version          (must be 1)
//! [8 bytes] Entry count             (big-endian u64)
//! [4 bytes] Deleted record count    (big-endian u32)
//!
//! Entry (12 bytes, repeated, ascending by identifier):
//! [8 bytes] Identifier              (big-endian u64)
//! [4 bytes] Locator ordinal         (big-endian u32)
//! ```

use std::io::Read;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use log::debug;

use crate::index::types::{
    error::{IndexError, Result},
    models::{
        IdentifierEntry, IdentifierHeader, IDENTIFIER_ENTRY_SIZE, IDENTIFIER_HEADER_SIZE,
        IDENTIFIER_VERSION,
    },
};
use crate::index::utils;

/// Reads and validates the 13-byte identifier index header.
pub fn parse<R: Read + ?Sized>(reader: &mut R) -> Result<IdentifierHeader> {
    let mut raw = [0u8; IDENTIFIER_HEADER_SIZE as usize];
    let read = utils::read_fully(reader, &mut raw)?;
    if read < raw.len() {
        return Err(IndexError::Corrupt(format!(
            "Truncated identifier index header: expected {} bytes, found {}",
            IDENTIFIER_HEADER_SIZE, read
        )));
    }

    let mut fields = &raw[..];
    let version = fields.read_u8()?;
    if version != IDENTIFIER_VERSION {
        return Err(IndexError::UnsupportedVersion {
            found: version,
            expected: IDENTIFIER_VERSION,
        });
    }
    let count = fields.read_u64::<BigEndian>()?;
    let deleted = fields.read_u32::<BigEndian>()?;

    debug!("Identifier index header: version={}, count={}, deleted={}", version, count, deleted);

    Ok(IdentifierHeader {
        version,
        count,
        deleted,
    })
}

/// Serializes a header into its 13-byte on-disk form.
pub fn encode(header: &IdentifierHeader) -> [u8; IDENTIFIER_HEADER_SIZE as usize] {
    let mut raw = [0u8; IDENTIFIER_HEADER_SIZE as usize];
    raw[0] = header.version;
    BigEndian::write_u64(&mut raw[1..9], header.count);
    BigEndian::write_u32(&mut raw[9..13], header.deleted);
    raw
}

/// Encodes one entry into the first twelve bytes of `buf`.
pub fn encode_entry(buf: &mut [u8], entry: &IdentifierEntry) {
    BigEndian::write_u64(&mut buf[0..8], entry.identifier);
    BigEndian::write_u32(&mut buf[8..12], entry.ordinal);
}

/// Decodes one entry from the first twelve bytes of `raw`.
pub fn decode_entry(raw: &[u8]) -> IdentifierEntry {
    debug_assert!(raw.len() >= IDENTIFIER_ENTRY_SIZE as usize);
    IdentifierEntry {
        identifier: BigEndian::read_u64(&raw[0..8]),
        ordinal: BigEndian::read_u32(&raw[8..12]),
    }
}
