//! Identifier index (`.fix`) writer and generator.

use std::io::{Seek, SeekFrom, Write};
use log::{debug, info, warn};

use super::format::identifier as format;
use super::locator::LocatorReader;
use super::types::error::{IndexError, Result};
use super::types::models::{
    IdentifierEntry, IdentifierHeader, IDENTIFIER_ENTRY_SIZE, IDENTIFIER_VERSION,
};

/// Writes an identifier index.
///
/// A placeholder header is written up front; the real counts are written
/// over it when the writer is closed, so the sink must be seekable and
/// positioned at the start of the file.
pub struct IdentifierIndexWriter<W: Write + Seek> {
    sink: Option<W>,
    buffer: [u8; IDENTIFIER_ENTRY_SIZE as usize],
    count: u64,
    deleted: u32,
    last_identifier: Option<u64>,
}

impl<W: Write + Seek> IdentifierIndexWriter<W> {
    pub fn new(mut sink: W) -> Result<Self> {
        let placeholder = IdentifierHeader {
            version: IDENTIFIER_VERSION,
            count: 0,
            deleted: 0,
        };
        sink.write_all(&format::encode(&placeholder))?;
        Ok(Self {
            sink: Some(sink),
            buffer: [0u8; IDENTIFIER_ENTRY_SIZE as usize],
            count: 0,
            deleted: 0,
            last_identifier: None,
        })
    }

    /// Appends an entry. Identifiers must be strictly ascending.
    pub fn write_entry(&mut self, identifier: u64, ordinal: u32) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(IndexError::Closed)?;
        if let Some(previous) = self.last_identifier {
            if identifier <= previous {
                return Err(IndexError::Unsorted { previous, identifier });
            }
        }
        format::encode_entry(&mut self.buffer, &IdentifierEntry { identifier, ordinal });
        sink.write_all(&self.buffer)?;
        self.last_identifier = Some(identifier);
        self.count += 1;
        Ok(())
    }

    /// Counts a primary record that was removed and therefore gets no entry.
    pub fn record_removal(&mut self) -> Result<()> {
        if self.sink.is_none() {
            return Err(IndexError::Closed);
        }
        self.deleted = self.deleted.saturating_add(1);
        Ok(())
    }

    /// Entries written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Removals recorded so far.
    pub fn deleted_count(&self) -> u32 {
        self.deleted
    }

    /// Writes the final header and takes the sink out of the writer.
    fn finish(&mut self) -> Result<Option<W>> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(None);
        };
        let header = IdentifierHeader {
            version: IDENTIFIER_VERSION,
            count: self.count,
            deleted: self.deleted,
        };
        sink.seek(SeekFrom::Start(0))?;
        sink.write_all(&format::encode(&header))?;
        sink.seek(SeekFrom::End(0))?;
        sink.flush()?;
        debug!("Identifier index finished: {} entries, {} deleted", self.count, self.deleted);
        Ok(Some(sink))
    }

    /// Writes the final header and releases the sink. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.finish().map(|_| ())
    }

    /// Writes the final header and hands back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?.ok_or(IndexError::Closed)
    }

    /// Builds a fresh index for the records of `locator`.
    ///
    /// Identifiers are assigned sequentially from 1, so record `i` gets
    /// identifier `i + 1`.
    pub fn generate(locator: &LocatorReader, sink: W) -> Result<W> {
        if locator.is_closed() {
            return Err(IndexError::Closed);
        }
        let records = locator.record_count();
        info!("Generating identifier index for {} records", records);
        let mut writer = Self::new(sink)?;
        for ordinal in 0..records {
            writer.write_entry(ordinal + 1, ordinal as u32)?;
        }
        writer.into_inner()
    }
}

impl<W: Write + Seek> Drop for IdentifierIndexWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("Failed to finish identifier index on drop: {}", e);
        }
    }
}
