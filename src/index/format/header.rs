//! Shared shapefile header parsing and serialization.
//!
//! # Header Structure
//! ```text
//! [0..4]    File code 9994          (big-endian u32)
//! [4..24]   Unused                  (five u32, zero)
//! [24..28]  File length in words    (big-endian u32)
//! [28..32]  Version 1000            (little-endian u32)
//! [32..36]  Shape type              (little-endian u32)
//! [36..68]  min x, min y, max x, max y  (little-endian f64)
//! [68..84]  min z, max z            (little-endian f64)
//! [84..100] min m, max m            (little-endian f64)
//! ```

use std::io::Read;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::index::types::{
    error::{IndexError, Result},
    models::{
        BoundingBox, IndexHeader, LocatorEntry, ShapeType, FILE_CODE, FILE_VERSION, HEADER_SIZE,
    },
};
use crate::index::utils;

/// Reads the header from the start of `reader`.
///
/// Returns `Ok(None)` when the source holds no bytes at all, which is how an
/// index for an empty primary file looks. Any other short read is corruption.
pub fn parse<R: Read + ?Sized>(reader: &mut R) -> Result<Option<IndexHeader>> {
    let mut raw = [0u8; HEADER_SIZE as usize];
    let read = utils::read_fully(reader, &mut raw)?;
    if read == 0 {
        debug!("Index source is empty, treating as zero records");
        return Ok(None);
    }
    if read < raw.len() {
        return Err(IndexError::Corrupt(format!(
            "Truncated header: expected {} bytes, found {}",
            HEADER_SIZE, read
        )));
    }
    parse_bytes(&raw).map(Some)
}

/// Decodes a complete 100-byte header.
pub fn parse_bytes(raw: &[u8; HEADER_SIZE as usize]) -> Result<IndexHeader> {
    let file_code = BigEndian::read_u32(&raw[0..4]);
    if file_code != FILE_CODE {
        return Err(IndexError::Corrupt(format!(
            "Wrong file code: expected {}, found {}",
            FILE_CODE, file_code
        )));
    }

    let file_length_words = BigEndian::read_u32(&raw[24..28]);
    if (file_length_words as u64) * 2 < HEADER_SIZE {
        return Err(IndexError::Corrupt(format!(
            "Declared file length of {} words is shorter than the header",
            file_length_words
        )));
    }

    let version = LittleEndian::read_u32(&raw[28..32]);
    if version != FILE_VERSION {
        return Err(IndexError::Corrupt(format!(
            "Wrong header version: expected {}, found {}",
            FILE_VERSION, version
        )));
    }

    let shape_type = ShapeType::try_from(LittleEndian::read_u32(&raw[32..36]))?;

    let mut bounds = [0f64; 8];
    LittleEndian::read_f64_into(&raw[36..100], &mut bounds);
    let bbox = BoundingBox {
        min_x: bounds[0],
        min_y: bounds[1],
        max_x: bounds[2],
        max_y: bounds[3],
        min_z: bounds[4],
        max_z: bounds[5],
        min_m: bounds[6],
        max_m: bounds[7],
    };

    trace!(
        "Header: length={} words, shape={:?}, bbox={:?}",
        file_length_words, shape_type, bbox
    );

    Ok(IndexHeader {
        file_length_words,
        shape_type,
        bbox,
    })
}

/// Serializes a header into its 100-byte on-disk form.
pub fn encode(header: &IndexHeader) -> [u8; HEADER_SIZE as usize] {
    let mut raw = [0u8; HEADER_SIZE as usize];
    BigEndian::write_u32(&mut raw[0..4], FILE_CODE);
    BigEndian::write_u32(&mut raw[24..28], header.file_length_words);
    LittleEndian::write_u32(&mut raw[28..32], FILE_VERSION);
    LittleEndian::write_u32(&mut raw[32..36], header.shape_type.code());

    let b = &header.bbox;
    let bounds = [
        b.min_x, b.min_y, b.max_x, b.max_y, b.min_z, b.max_z, b.min_m, b.max_m,
    ];
    LittleEndian::write_f64_into(&bounds, &mut raw[36..100]);
    raw
}

/// Encodes a locator entry into the first eight bytes of `buf`.
pub fn encode_entry(buf: &mut [u8], entry: &LocatorEntry) {
    BigEndian::write_u32(&mut buf[0..4], entry.offset);
    BigEndian::write_u32(&mut buf[4..8], entry.length);
}

/// Decodes a locator entry from the first eight bytes of `raw`.
pub fn decode_entry(raw: &[u8]) -> LocatorEntry {
    LocatorEntry {
        offset: BigEndian::read_u32(&raw[0..4]),
        length: BigEndian::read_u32(&raw[4..8]),
    }
}
