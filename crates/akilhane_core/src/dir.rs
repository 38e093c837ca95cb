//! The data directory and its single-writer lock.
//!
//! A data directory holds the journal next to a `LOCK` file. Opening the
//! directory takes an exclusive advisory lock on that file, so two
//! processes never append to the same journal.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

/// A locked data directory. Dropping it releases the lock.
#[derive(Debug)]
pub struct StoreDir {
    root: PathBuf,
    _lock: File,
}

impl StoreDir {
    /// Locks the data directory at `root`, creating it first when `create`
    /// is set.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidConfig`] if `root` is missing (and `create` is
    /// unset) or is not a directory; [`CoreError::StoreLocked`] if another
    /// process holds the lock.
    pub fn open(root: &Path, create: bool) -> CoreResult<Self> {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(CoreError::InvalidConfig(format!(
                    "{} is not a directory",
                    root.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && create => fs::create_dir_all(root)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::InvalidConfig(format!(
                    "data directory {} does not exist",
                    root.display()
                )))
            }
            Err(e) => return Err(e.into()),
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(root.join(LOCK_FILE))?;
        lock.try_lock_exclusive()
            .map_err(|_| CoreError::StoreLocked)?;

        Ok(Self {
            root: root.to_path_buf(),
            _lock: lock,
        })
    }

    /// Returns the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns the path of `name` inside the directory.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
