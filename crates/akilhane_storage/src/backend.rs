//! Byte-level storage backend trait.

use crate::error::StorageResult;

/// The byte store underneath a [`crate::JournalStore`].
///
/// A backend holds one growing byte sequence. It never interprets those
/// bytes; the journal owns the record format. Mutating methods take
/// `&mut self`, so a backend is driven by a single writer.
///
/// Implementations: [`crate::InMemoryBackend`], [`crate::FileBackend`].
pub trait StorageBackend: Send + Sync {
    /// Returns the whole content.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Appends `data` and returns the offset it was written at.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Returns the content length in bytes.
    fn size(&self) -> u64;

    /// Makes everything appended so far durable.
    fn sync(&mut self) -> StorageResult<()>;

    /// Cuts the content down to `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::TruncatePastEnd`] if `len` exceeds the
    /// current size.
    fn truncate(&mut self, len: u64) -> StorageResult<()>;

    /// Replaces the whole content with `data`.
    ///
    /// After a crash the backend holds either the old or the new content,
    /// never a mix of both.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;
}
