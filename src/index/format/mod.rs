//! On-disk layouts of the two index files.
//!
//! # Module Organization
//!
//! - [`header`]: The shared 100-byte shapefile header and locator entries
//! - [`identifier`]: The identifier index header and entries
//!
//! ```text
//! Locator file (.shx):          Identifier file (.fix):
//! ┌─────────────────┐           ┌─────────────────┐
//! │  Header (100)   │           │  Header (13)    │
//! ├─────────────────┤           ├─────────────────┤
//! │  Entry (8) × n  │           │  Entry (12) × n │
//! └─────────────────┘           └─────────────────┘
//! ```

pub mod header;
pub mod identifier;
