//! # shx-index
//!
//! Random-access indexes for shapefiles:
//! - the record-locator index (`.shx`), giving the offset and length of
//!   every record in the primary `.shp` file, and
//! - the identifier index (`.fix`), mapping feature identifiers to record
//!   ordinals through a predictive search.
//!
//! Reading the primary file itself is left to the caller: look up an
//! ordinal with [`IdentifierIndexReader::find_ordinal`], resolve it with
//! [`LocatorReader::offset_in_bytes`] and [`LocatorReader::content_length`],
//! then read that byte range.
pub mod index;

// Re-export the main types for convenience
pub use index::{
    write_locator_index,
    IdentifierIndexReader,
    IdentifierIndexWriter,
    IndexError,
    IndexSource,
    LocatorReader,
    LocatorWriter,
    ReadOptions,
    RecordTracker,
    Result,
    SharedRecordNumber,
    Strategy,
    types::models::{
        BoundingBox,
        IdentifierEntry,
        IdentifierHeader,
        IndexHeader,
        LocatorEntry,
        ShapeType,
    },
};
