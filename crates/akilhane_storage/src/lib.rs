//! # Akilhane Storage
//!
//! Storage substrate for the Akilhane local store.
//!
//! This crate provides two layers:
//!
//! - **Byte backends** ([`StorageBackend`]): opaque append-only byte stores
//!   that know nothing about keys or records.
//! - **Key/value journal** ([`JournalStore`]): a [`KeyValueStore`] that keeps
//!   an in-memory index and persists every mutation as one checksummed
//!   journal record appended to a byte backend.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use akilhane_storage::{JournalStore, KeyValueStore};
//!
//! let mut store = JournalStore::in_memory();
//! store.put("subjects", b"[]").unwrap();
//! assert_eq!(store.get("subjects").unwrap().as_deref(), Some(&b"[]"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod journal;
mod kv;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use journal::{compute_crc32, JournalRecord, JournalStore, JOURNAL_MAGIC, JOURNAL_VERSION};
pub use kv::KeyValueStore;
pub use memory::InMemoryBackend;
