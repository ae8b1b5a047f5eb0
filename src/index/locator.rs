//! Record-locator (`.shx`) reader.
//!
//! Every primary record has one 8-byte entry holding its offset and content
//! length in 16-bit words, so any record can be located in O(1).

use std::path::Path;
use log::info;

use super::format::header;
use super::source::{EntryLayout, EntryStore, IndexSource, Strategy};
use super::types::error::{IndexError, Result};
use super::types::models::{IndexHeader, LocatorEntry, HEADER_SIZE, LOCATOR_ENTRY_SIZE};
use super::types::options::ReadOptions;

const LAYOUT: EntryLayout = EntryLayout {
    header_size: HEADER_SIZE,
    entry_size: LOCATOR_ENTRY_SIZE,
};

/// Random-access reader over a record-locator index.
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use shx_index::{write_locator_index, BoundingBox, IndexSource, LocatorEntry, LocatorReader, ReadOptions, ShapeType};
///
/// let entries = [
///     LocatorEntry { offset: 50, length: 10 },
///     LocatorEntry { offset: 64, length: 25 },
/// ];
/// let file = write_locator_index(Cursor::new(Vec::new()), ShapeType::Point, &BoundingBox::default(), &entries).unwrap();
///
/// let mut reader = LocatorReader::open(IndexSource::seekable(file), &ReadOptions::default()).unwrap();
/// assert_eq!(reader.record_count(), 2);
/// assert_eq!(reader.offset_in_bytes(1).unwrap(), 128);
/// assert_eq!(reader.content_length(1).unwrap(), 25);
/// ```
pub struct LocatorReader {
    header: Option<IndexHeader>,
    record_count: u64,
    store: Option<EntryStore>,
    /// Last entry served, so `offset(i)` then `content_length(i)` costs one lookup.
    last: Option<(u64, LocatorEntry)>,
}

impl LocatorReader {
    /// Opens a locator index and validates its header.
    ///
    /// A source without a single byte is a valid, empty index.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The header is truncated or malformed
    /// - The header declares more entries than the source holds
    /// - The underlying source fails to read
    pub fn open(source: IndexSource, options: &ReadOptions) -> Result<Self> {
        let (header, store) =
            EntryStore::open(source, LAYOUT, options.window_entries, |r| header::parse(r))?;

        let record_count = header.as_ref().map_or(0, IndexHeader::record_count);
        let available = store.available_entries();
        if available < record_count {
            return Err(IndexError::CountMismatch {
                item_type: "locator entries",
                expected: record_count,
                found: available,
            });
        }

        info!(
            "Locator index opened: {} records, {} strategy",
            record_count,
            store.strategy()
        );

        Ok(Self {
            header,
            record_count,
            store: Some(store),
            last: None,
        })
    }

    /// Opens the locator index stored at `path`.
    pub fn open_path(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening locator index: {}", path.display());
        Self::open(IndexSource::open_path(path, options)?, options)
    }

    /// The parsed header, or `None` for an empty index.
    pub fn header(&self) -> Option<&IndexHeader> {
        self.header.as_ref()
    }

    /// Number of records described by the index, derived from the header.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// The strategy serving lookups, or `None` once closed.
    pub fn strategy(&self) -> Option<Strategy> {
        self.store.as_ref().map(EntryStore::strategy)
    }

    /// Returns the locator entry for record `index`.
    pub fn entry(&mut self, index: u64) -> Result<LocatorEntry> {
        let store = self.store.as_mut().ok_or(IndexError::Closed)?;
        if let Some((last_index, entry)) = self.last {
            if last_index == index {
                return Ok(entry);
            }
        }
        if index >= self.record_count {
            return Err(IndexError::OutOfRange {
                index,
                count: self.record_count,
            });
        }
        let entry = header::decode_entry(store.entry(index)?);
        self.last = Some((index, entry));
        Ok(entry)
    }

    /// Offset of record `index` in 16-bit words.
    pub fn offset(&mut self, index: u64) -> Result<u32> {
        Ok(self.entry(index)?.offset)
    }

    /// Offset of record `index` in bytes.
    pub fn offset_in_bytes(&mut self, index: u64) -> Result<u64> {
        Ok(self.entry(index)?.offset_in_bytes())
    }

    /// Content length of record `index` in 16-bit words.
    pub fn content_length(&mut self, index: u64) -> Result<u32> {
        Ok(self.entry(index)?.length)
    }

    /// Iterates all entries in record order.
    pub fn entries(&mut self) -> LocatorEntries<'_> {
        LocatorEntries {
            reader: self,
            next: 0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    /// Releases the mapping or file handle. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            info!("Locator index closed");
        }
        self.last = None;
    }
}

/// Iterator over all locator entries.
///
/// Created by [`LocatorReader::entries()`].
pub struct LocatorEntries<'a> {
    reader: &'a mut LocatorReader,
    next: u64,
}

impl Iterator for LocatorEntries<'_> {
    type Item = Result<LocatorEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.reader.record_count() {
            return None;
        }
        let item = self.reader.entry(self.next);
        self.next += 1;
        Some(item)
    }
}
