//! Custom error types for the shx-index crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An error originating from I/O operations on the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The index file is structurally invalid (bad header, bad counts, truncated data).
    #[error("Corrupt index: {0}")]
    Corrupt(String),

    /// The identifier index declares a format version this crate cannot read.
    #[error("Unsupported identifier index version: {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// A declared count does not match the data actually present in the file.
    #[error("Count mismatch for {item_type}: expected {expected}, but found {found}")]
    CountMismatch {
        item_type: &'static str,
        expected: u64,
        found: u64,
    },

    /// The reader or writer was used after `close()`.
    #[error("Index has been closed")]
    Closed,

    /// An entry ordinal past the end of the index was requested.
    #[error("Entry {index} is out of range for an index of {count} entries")]
    OutOfRange { index: u64, count: u64 },

    /// Identifiers handed to the writer were not strictly ascending.
    #[error("Identifiers must be strictly ascending: {identifier} follows {previous}")]
    Unsorted { previous: u64, identifier: u64 },
}

impl IndexError {
    /// Returns `true` for every variant that signals a damaged index file.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            IndexError::Corrupt(_)
                | IndexError::UnsupportedVersion { .. }
                | IndexError::CountMismatch { .. }
        )
    }
}

/// A convenience `Result` type alias using the crate's `IndexError` type.
pub type Result<T> = std::result::Result<T, IndexError>;
