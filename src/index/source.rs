//! Index sources and the three entry read strategies.
//!
//! The capability of the underlying handle is decided once, when an
//! [`IndexSource`] is built, and turned into an entry store variant when a
//! reader opens:
//!
//! | Source       | Strategy   | Lookup                                  |
//! |--------------|------------|-----------------------------------------|
//! | `Mapped`     | `Mapped`   | slice of the memory-mapped file         |
//! | `Seekable`   | `Windowed` | buffered window, refilled on a miss     |
//! | `StreamOnly` | `Loaded`   | remainder read into memory at open time |

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use log::{debug, trace};
use memmap2::Mmap;

use super::types::error::{IndexError, Result};
use super::types::options::ReadOptions;
use super::utils;
use super::window::ByteWindow;

/// Anything that can be both read and repositioned.
pub trait SeekableRead: Read + Seek {}

impl<T: Read + Seek> SeekableRead for T {}

/// An opened index file, classified by what it can do.
pub enum IndexSource {
    /// The whole file mapped into memory.
    Mapped(Mmap),
    /// A handle that reports its length and can be repositioned.
    Seekable(Box<dyn SeekableRead>),
    /// A forward-only stream, e.g. a pipe or a network body.
    StreamOnly(Box<dyn Read>),
}

impl fmt::Debug for IndexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSource::Mapped(map) => write!(f, "Mapped({} bytes)", map.len()),
            IndexSource::Seekable(_) => write!(f, "Seekable"),
            IndexSource::StreamOnly(_) => write!(f, "StreamOnly"),
        }
    }
}

impl IndexSource {
    pub fn seekable<R: Read + Seek + 'static>(reader: R) -> Self {
        IndexSource::Seekable(Box::new(reader))
    }

    pub fn stream<R: Read + 'static>(reader: R) -> Self {
        IndexSource::StreamOnly(Box::new(reader))
    }

    /// Classifies `reader` by attempting to measure its length.
    ///
    /// Handles whose seek fails (pipes, sockets wrapped as files) fall back
    /// to stream-only access.
    pub fn probe<R: Read + Seek + 'static>(mut reader: R) -> Self {
        match utils::stream_len(&mut reader) {
            Ok(len) => {
                debug!("Source is seekable ({} bytes)", len);
                IndexSource::seekable(reader)
            }
            Err(e) => {
                debug!("Source is not seekable ({}), reading as a stream", e);
                IndexSource::stream(reader)
            }
        }
    }

    /// Memory-maps `file`.
    pub fn mapped(file: &File) -> Result<Self> {
        // SAFETY: index files are only appended by a single writer before
        // readers open them; the mapping is never written through.
        let map = unsafe { Mmap::map(file)? };
        Ok(IndexSource::Mapped(map))
    }

    /// Picks a source for an already opened file according to `options`.
    ///
    /// Only non-empty regular files are mapped; everything else is probed.
    pub fn from_file(file: File, options: &ReadOptions) -> Result<Self> {
        if options.memory_map {
            let metadata = file.metadata()?;
            if metadata.is_file() && metadata.len() > 0 {
                return Self::mapped(&file);
            }
        }
        Ok(Self::probe(file))
    }

    pub fn open_path(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_file(file, options)
    }
}

/// Which strategy serves lookups for an open reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mapped,
    Windowed,
    Loaded,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strategy::Mapped => write!(f, "mapped"),
            Strategy::Windowed => write!(f, "windowed"),
            Strategy::Loaded => write!(f, "fully-loaded"),
        }
    }
}

/// Position of fixed-size entries inside an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    pub header_size: u64,
    pub entry_size: u64,
}

impl EntryLayout {
    /// Absolute file offset of entry `index`.
    pub fn position(&self, index: u64) -> u64 {
        self.header_size + index * self.entry_size
    }
}

/// Fixed-size entry access behind one interface, whatever the strategy.
pub(crate) struct EntryStore {
    layout: EntryLayout,
    /// Bytes present after the header.
    data_len: u64,
    kind: StoreKind,
}

enum StoreKind {
    Mapped(Mmap),
    Windowed {
        source: Box<dyn SeekableRead>,
        window: ByteWindow,
    },
    /// Everything after the header; entry `i` starts at `i * entry_size`.
    Loaded(Vec<u8>),
}

impl EntryStore {
    /// Parses the header with `parse_header`, then prepares entry access.
    ///
    /// Seekable sources are rewound first so the header is always read from
    /// the first byte of the file.
    pub fn open<H, F>(
        source: IndexSource,
        layout: EntryLayout,
        window_entries: usize,
        parse_header: F,
    ) -> Result<(H, EntryStore)>
    where
        F: FnOnce(&mut dyn Read) -> Result<H>,
    {
        match source {
            IndexSource::Mapped(map) => {
                let mut bytes: &[u8] = &map;
                let header = parse_header(&mut bytes)?;
                let data_len = (map.len() as u64).saturating_sub(layout.header_size);
                Ok((header, EntryStore { layout, data_len, kind: StoreKind::Mapped(map) }))
            }
            IndexSource::Seekable(mut source) => {
                let total = utils::stream_len(&mut source)?;
                source.seek(SeekFrom::Start(0))?;
                let header = parse_header(&mut source)?;
                let capacity = window_entries.max(1) * layout.entry_size as usize;
                let store = EntryStore {
                    layout,
                    data_len: total.saturating_sub(layout.header_size),
                    kind: StoreKind::Windowed {
                        source,
                        window: ByteWindow::with_capacity(capacity),
                    },
                };
                Ok((header, store))
            }
            IndexSource::StreamOnly(mut source) => {
                let header = parse_header(&mut source)?;
                let mut bytes = Vec::new();
                source.read_to_end(&mut bytes)?;
                debug!("Loaded {} bytes of entries into memory", bytes.len());
                let data_len = bytes.len() as u64;
                Ok((header, EntryStore { layout, data_len, kind: StoreKind::Loaded(bytes) }))
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self.kind {
            StoreKind::Mapped(_) => Strategy::Mapped,
            StoreKind::Windowed { .. } => Strategy::Windowed,
            StoreKind::Loaded(_) => Strategy::Loaded,
        }
    }

    /// Number of complete entries physically present after the header.
    pub fn available_entries(&self) -> u64 {
        self.data_len / self.layout.entry_size
    }

    /// Borrows the raw bytes of entry `index`.
    pub fn entry(&mut self, index: u64) -> Result<&[u8]> {
        let size = self.layout.entry_size as usize;
        let position = self.layout.position(index);
        let bytes = match &mut self.kind {
            StoreKind::Mapped(map) => {
                let begin = position as usize;
                map.get(begin..begin + size)
            }
            StoreKind::Windowed { source, window } => {
                if !window.contains(position, size) {
                    trace!("Window miss for entry {} at byte {}", index, position);
                    let capacity = window.capacity();
                    window.refill(source, position, capacity)?;
                }
                window.read_at(position, size)
            }
            StoreKind::Loaded(bytes) => {
                let begin = (index * self.layout.entry_size) as usize;
                bytes.get(begin..begin + size)
            }
        };
        bytes.ok_or_else(|| {
            IndexError::Corrupt(format!("Entry {} lies beyond the end of the index", index))
        })
    }
}
