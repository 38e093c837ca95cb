//! Key/value store trait.

use crate::error::StorageResult;

/// A durable, string-keyed store of opaque byte values.
///
/// This is the substrate the local store persists its collections into.
/// Implementations decide how mutations reach durable storage; callers only
/// see whole values per key.
///
/// # Invariants
///
/// - `get` after a successful `put` returns exactly the bytes written
/// - `remove` returns `true` only if the key existed
/// - `keys` lists every live key exactly once
pub trait KeyValueStore: Send {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Removes `key`. Returns `true` if the key existed.
    fn remove(&mut self, key: &str) -> StorageResult<bool>;

    /// Returns all live keys in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Makes every previous mutation durable.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the number of bytes the store currently occupies on its backend.
    fn size_on_disk(&self) -> StorageResult<u64>;

    /// Rewrites the store so that it contains only live entries.
    ///
    /// The default implementation does nothing, for stores without garbage.
    fn compact(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
