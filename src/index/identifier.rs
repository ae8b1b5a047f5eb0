//! Identifier index (`.fix`) reader and predictive search.
//!
//! The index maps application identifiers to locator ordinals. Entries are
//! sorted by identifier and, for sequentially assigned identifiers, sit at
//! (or just before) position `identifier - 1`. Lookups exploit that with an
//! interpolation search instead of bisecting.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, trace, warn};

use super::format::identifier as format;
use super::source::{EntryLayout, EntryStore, IndexSource, Strategy};
use super::tracker::RecordTracker;
use super::types::error::{IndexError, Result};
use super::types::models::{
    IdentifierEntry, IdentifierHeader, IDENTIFIER_ENTRY_SIZE, IDENTIFIER_HEADER_SIZE,
};
use super::types::options::ReadOptions;

const LAYOUT: EntryLayout = EntryLayout {
    header_size: IDENTIFIER_HEADER_SIZE,
    entry_size: IDENTIFIER_ENTRY_SIZE,
};

/// Below this many candidate entries a linear scan beats another prediction.
const LINEAR_SCAN_THRESHOLD: i128 = 10;

/// Reader over an identifier index.
///
/// Besides keyed lookups, the reader walks its entries in order. When a
/// [`RecordTracker`] is attached, each step first jumps to the entry that
/// matches the tracker's current record, so the index follows a separate
/// forward-only reader over the primary file.
pub struct IdentifierIndexReader {
    header: IdentifierHeader,
    store: Option<EntryStore>,
    tracker: Option<Box<dyn RecordTracker>>,
    /// Next entry to hand out when iterating without a tracker.
    cursor: u64,
    current: Option<IdentifierEntry>,
    /// Backing file to delete on close because the index is stale.
    remove_on_close: Option<PathBuf>,
}

impl IdentifierIndexReader {
    /// Opens an identifier index.
    ///
    /// # Arguments
    /// * `source` - The opened index file
    /// * `tracker` - Optional record number source for lock-step iteration
    /// * `options` - Window size and related settings
    ///
    /// # Errors
    /// Returns an error if:
    /// - The header is truncated
    /// - The format version is not the supported one
    /// - The header declares more entries than the source holds
    pub fn open(
        source: IndexSource,
        tracker: Option<Box<dyn RecordTracker>>,
        options: &ReadOptions,
    ) -> Result<Self> {
        let (header, store) =
            EntryStore::open(source, LAYOUT, options.window_entries, |r| format::parse(r))?;

        let available = store.available_entries();
        if available < header.count {
            return Err(IndexError::CountMismatch {
                item_type: "identifier entries",
                expected: header.count,
                found: available,
            });
        }

        if header.is_stale() {
            warn!(
                "Identifier index is stale ({} deleted of {} entries) and should be rebuilt",
                header.deleted, header.count
            );
        }

        info!(
            "Identifier index opened: {} entries, {} deleted, {} strategy",
            header.count,
            header.deleted,
            store.strategy()
        );

        Ok(Self {
            header,
            store: Some(store),
            tracker,
            cursor: 0,
            current: None,
            remove_on_close: None,
        })
    }

    /// Opens the identifier index stored at `path`.
    ///
    /// With [`ReadOptions::remove_stale`] set, a stale index file is deleted
    /// when the reader is closed or dropped, so the next session regenerates it.
    pub fn open_path(
        path: impl AsRef<Path>,
        tracker: Option<Box<dyn RecordTracker>>,
        options: &ReadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening identifier index: {}", path.display());
        let mut reader = Self::open(IndexSource::open_path(path, options)?, tracker, options)?;
        if reader.is_stale() && options.remove_stale {
            debug!("Scheduling {} for removal on close", path.display());
            reader.remove_on_close = Some(path.to_path_buf());
        }
        Ok(reader)
    }

    pub fn header(&self) -> &IdentifierHeader {
        &self.header
    }

    /// Number of entries in the index.
    pub fn count(&self) -> u64 {
        self.header.count
    }

    /// Number of records removed since the index was generated.
    pub fn deleted_count(&self) -> u32 {
        self.header.deleted
    }

    /// Advisory: more than half as many deletions as entries.
    pub fn is_stale(&self) -> bool {
        self.header.is_stale()
    }

    /// The strategy serving lookups, or `None` once closed.
    pub fn strategy(&self) -> Option<Strategy> {
        self.store.as_ref().map(EntryStore::strategy)
    }

    /// Returns the entry at position `index`.
    pub fn entry(&mut self, index: u64) -> Result<IdentifierEntry> {
        let count = self.header.count;
        let store = self.store.as_mut().ok_or(IndexError::Closed)?;
        read_entry(store, index, count)
    }

    /// Finds the locator ordinal stored for `identifier`.
    ///
    /// Returns `Ok(None)` when the identifier is not in the index. Searching
    /// does not move the iteration cursor.
    pub fn find_ordinal(&mut self, identifier: u64) -> Result<Option<u64>> {
        let count = self.header.count;
        let store = self.store.as_mut().ok_or(IndexError::Closed)?;
        if count == 0 {
            return Ok(None);
        }
        let predicted = identifier.saturating_sub(1).min(count - 1);
        predictive_search(identifier, count, predicted, |index| {
            read_entry(store, index, count)
        })
    }

    /// Positions the cursor so the next step returns entry `index`.
    ///
    /// `index == count()` moves past the last entry.
    pub fn go_to(&mut self, index: u64) -> Result<()> {
        if self.store.is_none() {
            return Err(IndexError::Closed);
        }
        if index > self.header.count {
            return Err(IndexError::OutOfRange {
                index,
                count: self.header.count,
            });
        }
        self.cursor = index;
        Ok(())
    }

    fn next_position(&self) -> u64 {
        match &self.tracker {
            Some(tracker) => tracker.record_number().saturating_sub(1),
            None => self.cursor,
        }
    }

    /// Whether another step would yield an entry.
    pub fn has_next(&self) -> Result<bool> {
        if self.store.is_none() {
            return Err(IndexError::Closed);
        }
        Ok(self.next_position() < self.header.count)
    }

    /// Steps to the next entry and returns it, or `None` past the end.
    pub fn next_entry(&mut self) -> Result<Option<IdentifierEntry>> {
        let position = self.next_position();
        let count = self.header.count;
        let store = self.store.as_mut().ok_or(IndexError::Closed)?;
        if position >= count {
            return Ok(None);
        }
        let entry = read_entry(store, position, count)?;
        self.cursor = position + 1;
        self.current = Some(entry);
        Ok(Some(entry))
    }

    /// Steps to the next entry and returns its identifier.
    pub fn next_identifier(&mut self) -> Result<Option<u64>> {
        Ok(self.next_entry()?.map(|entry| entry.identifier))
    }

    /// Identifier of the entry returned by the last step.
    pub fn current_identifier(&self) -> Option<u64> {
        self.current.map(|entry| entry.identifier)
    }

    /// Locator ordinal of the entry returned by the last step.
    pub fn current_locator_ordinal(&self) -> Option<u64> {
        self.current.map(|entry| entry.ordinal as u64)
    }

    /// Iterates entries from the current position.
    pub fn iter(&mut self) -> IdentifierEntries<'_> {
        IdentifierEntries { reader: self }
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    /// Releases the mapping or file handle and, for a stale index opened
    /// by path, deletes the file. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            info!("Identifier index closed");
        }
        self.current = None;
        if let Some(path) = self.remove_on_close.take() {
            match fs::remove_file(&path) {
                Ok(()) => info!("Removed stale identifier index {}", path.display()),
                Err(e) => warn!("Could not remove stale identifier index {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for IdentifierIndexReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterator over identifier entries.
///
/// Created by [`IdentifierIndexReader::iter()`].
pub struct IdentifierEntries<'a> {
    reader: &'a mut IdentifierIndexReader,
}

impl Iterator for IdentifierEntries<'_> {
    type Item = Result<IdentifierEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_entry().transpose()
    }
}

fn read_entry(store: &mut EntryStore, index: u64, count: u64) -> Result<IdentifierEntry> {
    if index >= count {
        return Err(IndexError::OutOfRange { index, count });
    }
    Ok(format::decode_entry(store.entry(index)?))
}

/// Interpolation search over `count` ascending entries.
///
/// The candidate range is the open interval `(lo, hi)`. Each round reads
/// the predicted entry, then extrapolates linearly from the identifier
/// found there: with dense identifiers the target sits `target - found`
/// entries away. Predictions that leave the range are pulled back to the
/// midpoint between the current position and the relevant bound.
pub(crate) fn predictive_search<F>(
    target: u64,
    count: u64,
    predicted: u64,
    mut entry_at: F,
) -> Result<Option<u64>>
where
    F: FnMut(u64) -> Result<IdentifierEntry>,
{
    let mut lo: i128 = -1;
    let mut hi: i128 = count as i128;
    let mut position: i128 = predicted.min(count.saturating_sub(1)) as i128;

    loop {
        if lo + 1 >= hi {
            return Ok(None);
        }

        let entry = entry_at(position as u64)?;
        trace!(
            "Search for {}: entry {} holds {} (range {}..{})",
            target, position, entry.identifier, lo, hi
        );
        if entry.identifier == target {
            return Ok(Some(entry.ordinal as u64));
        }

        if hi - lo < LINEAR_SCAN_THRESHOLD {
            return linear_scan(target, (lo + 1) as u64, hi as u64, entry_at);
        }

        let mut next = position + (target as i128 - entry.identifier as i128);
        if next <= lo {
            next = position - (position - lo) / 2;
        }
        if next >= hi {
            next = position + (hi - position) / 2;
        }
        if next == position {
            // Neighbours on the target's side are exhausted: a gap.
            return Ok(None);
        }

        if next < position {
            hi = position;
        } else {
            lo = position;
        }
        position = next;
    }
}

fn linear_scan<F>(target: u64, from: u64, to: u64, mut entry_at: F) -> Result<Option<u64>>
where
    F: FnMut(u64) -> Result<IdentifierEntry>,
{
    for index in from..to {
        let entry = entry_at(index)?;
        if entry.identifier == target {
            return Ok(Some(entry.ordinal as u64));
        }
        if entry.identifier > target {
            break;
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(identifiers: &[u64]) -> Vec<IdentifierEntry> {
        identifiers
            .iter()
            .enumerate()
            .map(|(i, &identifier)| IdentifierEntry { identifier, ordinal: i as u32 })
            .collect()
    }

    fn search(table: &[IdentifierEntry], target: u64, reads: &mut usize) -> Option<u64> {
        let count = table.len() as u64;
        let predicted = target.saturating_sub(1).min(count.saturating_sub(1));
        predictive_search(target, count, predicted, |index| {
            *reads += 1;
            Ok(table[index as usize])
        })
        .unwrap()
    }

    #[test]
    fn test_dense_identifiers_hit_on_first_read() {
        let table = entries(&(1..=100_000).collect::<Vec<_>>());
        let mut reads = 0;
        assert_eq!(search(&table, 73_412, &mut reads), Some(73_411));
        assert_eq!(reads, 1);
    }

    #[test]
    fn test_sparse_gaps_converge_quickly() {
        // Every tenth identifier removed.
        let ids: Vec<u64> = (1..=50_000).filter(|id| id % 10 != 0).collect();
        let table = entries(&ids);
        let mut reads = 0;
        let expected = ids.iter().position(|&id| id == 44_441).unwrap() as u64;
        assert_eq!(search(&table, 44_441, &mut reads), Some(expected));
        assert!(reads < 40, "took {} reads", reads);
    }

    #[test]
    fn test_missing_identifier_in_gap() {
        let table = entries(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 20, 21, 22, 23, 24, 25]);
        let mut reads = 0;
        assert_eq!(search(&table, 15, &mut reads), None);
        assert_eq!(search(&table, 20, &mut reads), Some(12));
    }

    #[test]
    fn test_empty_range() {
        let mut reads = 0;
        assert_eq!(search(&[], 1, &mut reads), None);
        assert_eq!(reads, 0);
    }
}
