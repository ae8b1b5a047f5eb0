//! Record-locator (`.shx`) writer.

use std::io::{Seek, SeekFrom, Write};
use log::{debug, warn};

use super::format::header;
use super::types::error::{IndexError, Result};
use super::types::models::{
    BoundingBox, IndexHeader, LocatorEntry, ShapeType, HEADER_SIZE, LOCATOR_ENTRY_SIZE,
};

/// Sequential writer for a record-locator index.
///
/// Every header and record write goes through a small internal buffer that
/// is drained into the sink before the call returns. The writer never reads
/// back what it wrote: emitting one record per primary record, in primary
/// order, is the caller's job.
pub struct LocatorWriter<W: Write + Seek> {
    sink: Option<W>,
    buffer: Vec<u8>,
    records_written: u64,
}

impl<W: Write + Seek> LocatorWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Some(sink),
            buffer: Vec::with_capacity(HEADER_SIZE as usize),
            records_written: 0,
        }
    }

    /// Writes the 100-byte header at the current position.
    ///
    /// `total_length_words` is the length of the whole locator file in
    /// 16-bit words; see [`IndexHeader::locator_length_words`].
    pub fn write_header(
        &mut self,
        shape_type: ShapeType,
        total_length_words: u32,
        bbox: &BoundingBox,
    ) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(IndexError::Closed)?;
        let header = IndexHeader {
            file_length_words: total_length_words,
            shape_type,
            bbox: *bbox,
        };
        debug!("Writing locator header: {:?}, {} words", shape_type, total_length_words);
        self.buffer.clear();
        self.buffer.extend_from_slice(&header::encode(&header));
        drain(sink, &mut self.buffer)
    }

    /// Appends one entry; `offset` and `length` are in 16-bit words.
    pub fn write_record(&mut self, offset: u32, length: u32) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(IndexError::Closed)?;
        self.buffer.clear();
        self.buffer.resize(LOCATOR_ENTRY_SIZE as usize, 0);
        header::encode_entry(&mut self.buffer, &LocatorEntry { offset, length });
        drain(sink, &mut self.buffer)?;
        self.records_written += 1;
        Ok(())
    }

    /// Repositions the sink at the start of the header, e.g. to rewrite it
    /// once the final length and extent are known.
    pub fn move_to_header_start(&mut self) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(IndexError::Closed)?;
        sink.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Repositions the sink at the first entry.
    pub fn move_to_record_start(&mut self) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(IndexError::Closed)?;
        sink.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(())
    }

    /// Number of `write_record` calls that succeeded.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flushes and releases the sink. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
            debug!("Locator writer closed after {} records", self.records_written);
        }
        Ok(())
    }

    /// Flushes and hands back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        let mut sink = self.sink.take().ok_or(IndexError::Closed)?;
        sink.flush()?;
        Ok(sink)
    }
}

impl<W: Write + Seek> Drop for LocatorWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to flush locator index on drop: {}", e);
        }
    }
}

fn drain<W: Write>(sink: &mut W, buffer: &mut Vec<u8>) -> Result<()> {
    sink.write_all(buffer)?;
    buffer.clear();
    Ok(())
}

/// Writes a complete locator index for `entries` and returns the sink.
///
/// The header's file length is derived from the number of entries.
pub fn write_locator_index<W: Write + Seek>(
    sink: W,
    shape_type: ShapeType,
    bbox: &BoundingBox,
    entries: &[LocatorEntry],
) -> Result<W> {
    let mut writer = LocatorWriter::new(sink);
    let length = IndexHeader::locator_length_words(entries.len() as u64);
    writer.write_header(shape_type, length, bbox)?;
    for entry in entries {
        writer.write_record(entry.offset, entry.length)?;
    }
    writer.into_inner()
}
