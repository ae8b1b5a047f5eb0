//! Core index reader and writer module

pub mod format;
pub mod identifier;
pub mod identifier_writer;
pub mod locator;
pub mod locator_writer;
pub mod source;
pub mod tracker;
pub mod types;
pub mod window;
mod utils;

pub use identifier::{IdentifierEntries, IdentifierIndexReader};
pub use identifier_writer::IdentifierIndexWriter;
pub use locator::{LocatorEntries, LocatorReader};
pub use locator_writer::{write_locator_index, LocatorWriter};
pub use source::{IndexSource, SeekableRead, Strategy};
pub use tracker::{RecordTracker, SharedRecordNumber};
pub use types::error::{IndexError, Result};
pub use types::options::ReadOptions;
