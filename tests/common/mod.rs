#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use shx_index::{
    write_locator_index, BoundingBox, IdentifierIndexWriter, LocatorEntry, ShapeType,
};
use tempfile::TempDir;

pub fn setup_temp_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

pub fn locator_bytes(entries: &[LocatorEntry]) -> Vec<u8> {
    let bbox = BoundingBox::xy(-10.0, -5.0, 10.0, 5.0);
    write_locator_index(Cursor::new(Vec::new()), ShapeType::Polygon, &bbox, entries)
        .expect("write locator index")
        .into_inner()
}

pub fn locator_entries(pairs: &[(u32, u32)]) -> Vec<LocatorEntry> {
    pairs
        .iter()
        .map(|&(offset, length)| LocatorEntry { offset, length })
        .collect()
}

/// Entries laid out back to back the way a primary file writer produces them.
pub fn sequential_entries(count: usize) -> Vec<LocatorEntry> {
    let mut offset = 50;
    (0..count)
        .map(|i| {
            let length = 10 + (i as u32 * 7) % 40;
            let entry = LocatorEntry { offset, length };
            offset += 4 + length;
            entry
        })
        .collect()
}

pub fn identifier_bytes(entries: &[(u64, u32)], removed: u32) -> Vec<u8> {
    let mut writer = IdentifierIndexWriter::new(Cursor::new(Vec::new())).expect("create writer");
    for &(identifier, ordinal) in entries {
        writer.write_entry(identifier, ordinal).expect("write entry");
    }
    for _ in 0..removed {
        writer.record_removal().expect("record removal");
    }
    writer.into_inner().expect("finish writer").into_inner()
}

/// Identifiers 1..=count with every identifier for which `removed` holds left out.
pub fn identifiers_with_gaps(count: u64, removed: impl Fn(u64) -> bool) -> Vec<(u64, u32)> {
    (1..=count)
        .filter(|id| !removed(*id))
        .enumerate()
        .map(|(ordinal, id)| (id, ordinal as u32))
        .collect()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write index file");
    path
}

/// A seekable reader that counts how often it is repositioned.
pub struct CountingSeeker {
    inner: Cursor<Vec<u8>>,
    seeks: Rc<Cell<usize>>,
}

impl CountingSeeker {
    pub fn new(bytes: Vec<u8>) -> (Self, Rc<Cell<usize>>) {
        let seeks = Rc::new(Cell::new(0));
        let seeker = Self {
            inner: Cursor::new(bytes),
            seeks: Rc::clone(&seeks),
        };
        (seeker, seeks)
    }
}

impl Read for CountingSeeker {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for CountingSeeker {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.seeks.set(self.seeks.get() + 1);
        self.inner.seek(pos)
    }
}

/// A reader that cannot be repositioned at all.
pub struct Unseekable(pub Cursor<Vec<u8>>);

impl Read for Unseekable {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Seek for Unseekable {
    fn seek(&mut self, _pos: SeekFrom) -> std::io::Result<u64> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "stream cannot seek",
        ))
    }
}
