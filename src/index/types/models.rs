//! Core data structures for the locator and identifier index formats.
//!
//! This module defines the fundamental types used throughout the library:
//! - The shared 100-byte shapefile header and its parts
//! - Locator and identifier entries
//! - Format constants (sizes, magic numbers, versions)

use super::error::{IndexError, Result};

/// Size of the shared shapefile header in bytes.
pub const HEADER_SIZE: u64 = 100;
/// Size of one locator entry (`offset` + `length`, both u32) in bytes.
pub const LOCATOR_ENTRY_SIZE: u64 = 8;
/// File code stored big-endian in the first four header bytes.
pub const FILE_CODE: u32 = 9994;
/// Format version stored little-endian at header byte 28.
pub const FILE_VERSION: u32 = 1000;

/// Size of the identifier index header: version (1) + count (8) + deleted (4).
pub const IDENTIFIER_HEADER_SIZE: u64 = 13;
/// Size of one identifier entry: identifier (8) + locator ordinal (4).
pub const IDENTIFIER_ENTRY_SIZE: u64 = 12;
/// The only identifier index version this crate reads or writes.
pub const IDENTIFIER_VERSION: u8 = 1;

/// Geometry type tag stored in the shared header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    #[default]
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// The numeric code written to the header.
    pub fn code(&self) -> u32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }
}

impl TryFrom<u32> for ShapeType {
    type Error = IndexError;
    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Null),
            1 => Ok(Self::Point),
            3 => Ok(Self::PolyLine),
            5 => Ok(Self::Polygon),
            8 => Ok(Self::MultiPoint),
            11 => Ok(Self::PointZ),
            13 => Ok(Self::PolyLineZ),
            15 => Ok(Self::PolygonZ),
            18 => Ok(Self::MultiPointZ),
            21 => Ok(Self::PointM),
            23 => Ok(Self::PolyLineM),
            25 => Ok(Self::PolygonM),
            28 => Ok(Self::MultiPointM),
            31 => Ok(Self::MultiPatch),
            _ => Err(IndexError::Corrupt(format!("Unknown shape type: {}", value))),
        }
    }
}

/// Bounding extent stored in the shared header.
///
/// The x/y range is always meaningful. The z and m ranges are stored for
/// every file but are zero unless the shape type carries them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_m: f64,
    pub max_m: f64,
}

impl BoundingBox {
    /// A two-dimensional extent with zeroed z and m ranges.
    pub fn xy(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            ..Self::default()
        }
    }
}

/// The shared 100-byte header at the start of every locator file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHeader {
    /// Total length of the file in 16-bit words, header included.
    pub file_length_words: u32,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
}

impl IndexHeader {
    /// Total file length in bytes.
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length_words as u64 * 2
    }

    /// Number of locator entries implied by the declared file length.
    ///
    /// Always derived from the header, never stored on its own.
    pub fn record_count(&self) -> u64 {
        self.file_length_bytes().saturating_sub(HEADER_SIZE) / LOCATOR_ENTRY_SIZE
    }

    /// File length in words that a locator file holding `record_count` entries declares.
    pub fn locator_length_words(record_count: u64) -> u32 {
        ((HEADER_SIZE + record_count * LOCATOR_ENTRY_SIZE) / 2) as u32
    }
}

/// One locator entry: where a primary record starts and how long it is.
///
/// Both values are in 16-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorEntry {
    pub offset: u32,
    pub length: u32,
}

impl LocatorEntry {
    /// Byte offset of the record in the primary file.
    pub fn offset_in_bytes(&self) -> u64 {
        self.offset as u64 * 2
    }

    /// Length of the record content in bytes.
    pub fn length_in_bytes(&self) -> u64 {
        self.length as u64 * 2
    }
}

/// The 13-byte header of an identifier index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierHeader {
    pub version: u8,
    /// Number of entries present in the index.
    pub count: u64,
    /// Number of records removed since the index was generated.
    pub deleted: u32,
}

impl IdentifierHeader {
    /// Too many deletions: the index still works but should be rebuilt.
    pub fn is_stale(&self) -> bool {
        self.deleted as u64 > self.count / 2
    }
}

/// One identifier entry mapping an application identifier to a locator ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierEntry {
    pub identifier: u64,
    pub ordinal: u32,
}
