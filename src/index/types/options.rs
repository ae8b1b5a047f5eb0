//! Open-time configuration shared by both index readers.

/// Window size used when nothing else is configured, in entries.
pub const DEFAULT_WINDOW_ENTRIES: usize = 2000;

/// Settings that decide how an index file is read.
///
/// ```
/// use shx_index::ReadOptions;
///
/// let options = ReadOptions::default()
///     .memory_map(false)
///     .window_entries(512);
/// assert_eq!(options.window_entries, 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Map files opened by path into memory instead of reading through a window.
    pub memory_map: bool,
    /// Number of entries buffered by the windowed strategy.
    pub window_entries: usize,
    /// Delete a stale identifier index opened by path once it is closed.
    pub remove_stale: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            memory_map: true,
            window_entries: DEFAULT_WINDOW_ENTRIES,
            remove_stale: true,
        }
    }
}

impl ReadOptions {
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.memory_map = enabled;
        self
    }

    /// Values below one are raised to one.
    pub fn window_entries(mut self, entries: usize) -> Self {
        self.window_entries = entries.max(1);
        self
    }

    pub fn remove_stale(mut self, enabled: bool) -> Self {
        self.remove_stale = enabled;
        self
    }
}
