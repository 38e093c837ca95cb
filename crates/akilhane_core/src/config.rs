//! Local store configuration.

use std::path::{Path, PathBuf};

/// Default journal file name inside the data directory.
pub const DEFAULT_JOURNAL_FILE: &str = "store.journal";

/// Configuration for opening a file-backed [`crate::LocalStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the journal and the lock file.
    pub data_dir: PathBuf,

    /// Journal file name inside `data_dir`.
    pub journal_file: String,

    /// Journal size in bytes beyond which the store compacts after a write
    /// (0 = never compact automatically).
    pub compact_threshold: u64,

    /// Whether every write is synced to disk before returning.
    pub sync_on_write: bool,

    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".akilhane"),
            journal_file: DEFAULT_JOURNAL_FILE.to_string(),
            compact_threshold: 4 * 1024 * 1024, // 4 MiB
            sync_on_write: true,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration rooted at `data_dir` with default values.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the journal file name.
    #[must_use]
    pub fn journal_file(mut self, name: impl Into<String>) -> Self {
        self.journal_file = name.into();
        self
    }

    /// Sets the automatic compaction threshold in bytes.
    #[must_use]
    pub const fn compact_threshold(mut self, bytes: u64) -> Self {
        self.compact_threshold = bytes;
        self
    }

    /// Sets whether every write is synced to disk.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
