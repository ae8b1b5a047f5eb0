//! Record number sources for lock-step iteration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Reports the position of a separate, forward-only reader over the primary file.
pub trait RecordTracker {
    /// One-based number of the record the primary reader returned last.
    fn record_number(&self) -> u64;
}

/// A cloneable record counter shared between a primary reader and an
/// identifier index reader.
///
/// ```
/// use shx_index::{RecordTracker, SharedRecordNumber};
///
/// let counter = SharedRecordNumber::new();
/// let observer = counter.clone();
/// counter.advance();
/// counter.advance();
/// assert_eq!(observer.record_number(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedRecordNumber(Arc<AtomicU64>);

impl SharedRecordNumber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to the next record and returns its number.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn set(&self, record_number: u64) {
        self.0.store(record_number, Ordering::Relaxed);
    }
}

impl RecordTracker for SharedRecordNumber {
    fn record_number(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
