//! Persistent backend over a single file.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A backend stored in one file.
///
/// `sync` flushes and calls `File::sync_all`. `replace` writes a sibling
/// `<name>.tmp`, syncs it and renames it over the file.
///
/// ```no_run
/// use akilhane_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("store.journal")).unwrap();
/// backend.append(b"AKVJ").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // `read_all` seeks, which needs the handle mutably.
    file: Mutex<File>,
    size: u64,
}

fn open_rw(path: &Path) -> StorageResult<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

/// Writes `data` at `offset` with `write`. A write that fails partway is
/// cut back to `offset` so no partial record stays in the file.
fn append_at<W>(file: &mut File, offset: u64, data: &[u8], write: W) -> StorageResult<()>
where
    W: FnOnce(&mut File, &[u8]) -> std::io::Result<()>,
{
    file.seek(SeekFrom::Start(offset))?;
    if let Err(e) = write(file, data) {
        warn!(offset, len = data.len(), error = %e, "append failed, dropping partial write");
        file.set_len(offset)?;
        return Err(e.into());
    }
    Ok(())
}

impl FileBackend {
    /// Opens the file at `path`, creating it (and its parent directories)
    /// if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_rw(path)?;
        let size = file.metadata()?.len();
        debug!(path = %path.display(), size, "opened storage file");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            size,
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StorageBackend for FileBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(self.size as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let offset = self.size;
        if !data.is_empty() {
            append_at(self.file.get_mut(), offset, data, |file, data| file.write_all(data))?;
            self.size += data.len() as u64;
        }
        Ok(offset)
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn sync(&mut self) -> StorageResult<()> {
        let file = self.file.get_mut();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        if len > self.size {
            return Err(StorageError::TruncatePastEnd {
                requested: len,
                size: self.size,
            });
        }
        let file = self.file.get_mut();
        file.set_len(len)?;
        file.sync_all()?;
        self.size = len;
        Ok(())
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        let temp_path = self.temp_path();
        {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(data)?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        *self.file.get_mut() = open_rw(&self.path)?;
        self.size = data.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.journal");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.append(b"first").unwrap(), 0);
            assert_eq!(backend.append(b"second").unwrap(), 5);
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size(), 11);
        assert_eq!(backend.read_all().unwrap(), b"firstsecond");
    }

    #[test]
    fn failed_append_leaves_no_partial_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.journal");
        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"first").unwrap();

        let result = append_at(backend.file.get_mut(), 5, b"second", |file, data| {
            file.write_all(&data[..3])?;
            Err(std::io::Error::other("disk full"))
        });
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(backend.size(), 5);

        assert_eq!(backend.append(b"third").unwrap(), 5);
        assert_eq!(backend.read_all().unwrap(), b"firstthird");
        drop(backend);
        assert_eq!(FileBackend::open(&path).unwrap().size(), 10);
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("store.journal");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size(), 0);
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn truncate_cuts_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.journal");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"recordTORN").unwrap();
        backend.truncate(6).unwrap();
        assert!(backend.truncate(60).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"record");
    }

    #[test]
    fn replace_then_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.journal");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"superseded records").unwrap();
            backend.replace(b"live").unwrap();
            assert_eq!(backend.append(b"+").unwrap(), 4);
            backend.sync().unwrap();
        }

        assert_eq!(fs::read(&path).unwrap(), b"live+");
        assert!(!dir.path().join("store.journal.tmp").exists());
    }
}
