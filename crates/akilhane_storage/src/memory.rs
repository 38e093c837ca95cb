//! Volatile backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};

/// A backend that keeps its bytes in a `Vec`.
///
/// Backs in-memory stores, and journal tests that need to damage the bytes
/// between two opens:
///
/// ```rust
/// use akilhane_storage::{InMemoryBackend, StorageBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert_eq!(backend.append(b"AKVJ").unwrap(), 0);
/// let copy = InMemoryBackend::with_data(backend.bytes().to_vec());
/// assert_eq!(copy.size(), 4);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    bytes: Vec<u8>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `bytes`.
    #[must_use]
    pub fn with_data(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the current content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let offset = self.size();
        self.bytes.extend_from_slice(data);
        Ok(offset)
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        let size = self.size();
        if len > size {
            return Err(StorageError::TruncatePastEnd {
                requested: len,
                size,
            });
        }
        self.bytes.truncate(len as usize);
        Ok(())
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        self.bytes = data.to_vec();
        Ok(())
    }
}
