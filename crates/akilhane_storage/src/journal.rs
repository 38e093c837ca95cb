//! Append-only key/value journal.
//!
//! Every mutation is appended as one self-describing record:
//!
//! ```text
//! | magic "AKVJ" (4) | version u16 | type u8 | payload_len u32 | payload | crc32 u32 |
//! ```
//!
//! The CRC covers header and payload. Opening a journal replays all records
//! into an in-memory index. A record cut short at the tail (a torn write) is
//! truncated away; any other damage is reported as corruption.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;
use crate::memory::InMemoryBackend;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Magic bytes identifying a journal record.
pub const JOURNAL_MAGIC: [u8; 4] = *b"AKVJ";

/// Current journal format version.
pub const JOURNAL_VERSION: u16 = 1;

const HEADER_SIZE: usize = 11;
const CRC_SIZE: usize = 4;

const TYPE_PUT: u8 = 1;
const TYPE_REMOVE: u8 = 2;

/// A single journal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRecord {
    /// Sets `key` to `value`.
    Put {
        /// Record key.
        key: String,
        /// Full value stored under the key.
        value: Vec<u8>,
    },
    /// Removes `key`.
    Remove {
        /// Record key.
        key: String,
    },
}

impl JournalRecord {
    fn type_byte(&self) -> u8 {
        match self {
            Self::Put { .. } => TYPE_PUT,
            Self::Remove { .. } => TYPE_REMOVE,
        }
    }

    fn encode_payload(&self) -> StorageResult<Vec<u8>> {
        match self {
            Self::Put { key, value } => {
                let key_len =
                    u32::try_from(key.len()).map_err(|_| StorageError::EntryTooLarge(key.len()))?;
                let mut buf = Vec::with_capacity(4 + key.len() + value.len());
                buf.extend_from_slice(&key_len.to_le_bytes());
                buf.extend_from_slice(key.as_bytes());
                buf.extend_from_slice(value);
                Ok(buf)
            }
            Self::Remove { key } => Ok(key.as_bytes().to_vec()),
        }
    }

    /// Encodes the record with its envelope (header and CRC).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EntryTooLarge`] if the payload does not fit
    /// the 4-byte length field.
    pub fn encode(&self) -> StorageResult<Vec<u8>> {
        let payload = self.encode_payload()?;
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| StorageError::EntryTooLarge(payload.len()))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        buf.extend_from_slice(&JOURNAL_MAGIC);
        buf.extend_from_slice(&JOURNAL_VERSION.to_le_bytes());
        buf.push(self.type_byte());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&payload);

        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    fn decode_payload(type_byte: u8, payload: &[u8], offset: u64) -> StorageResult<Self> {
        let utf8 = |bytes: &[u8]| {
            String::from_utf8(bytes.to_vec())
                .map_err(|_| StorageError::corrupted(offset, "key is not valid UTF-8"))
        };

        match type_byte {
            TYPE_PUT => {
                if payload.len() < 4 {
                    return Err(StorageError::corrupted(offset, "put payload too short"));
                }
                let key_len =
                    u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
                let key_end = 4usize.saturating_add(key_len);
                if key_end > payload.len() {
                    return Err(StorageError::corrupted(offset, "key extends past payload"));
                }
                Ok(Self::Put {
                    key: utf8(&payload[4..key_end])?,
                    value: payload[key_end..].to_vec(),
                })
            }
            TYPE_REMOVE => Ok(Self::Remove {
                key: utf8(payload)?,
            }),
            other => Err(StorageError::corrupted(
                offset,
                format!("unknown record type {other}"),
            )),
        }
    }
}

/// Result of scanning raw journal bytes.
struct Replay {
    records: Vec<JournalRecord>,
    /// Offset just past the last complete record.
    valid_len: u64,
}

fn replay(bytes: &[u8]) -> StorageResult<Replay> {
    let mut records = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let offset = pos as u64;
        let remaining = &bytes[pos..];

        if remaining.len() < HEADER_SIZE {
            break;
        }
        if remaining[..4] != JOURNAL_MAGIC {
            return Err(StorageError::corrupted(offset, "invalid magic"));
        }
        let version = u16::from_le_bytes([remaining[4], remaining[5]]);
        if version > JOURNAL_VERSION {
            return Err(StorageError::corrupted(
                offset,
                format!("unsupported version {version}"),
            ));
        }
        let type_byte = remaining[6];
        let payload_len =
            u32::from_le_bytes([remaining[7], remaining[8], remaining[9], remaining[10]]) as usize;
        let total_len = HEADER_SIZE + payload_len + CRC_SIZE;

        if remaining.len() < total_len {
            break;
        }

        let payload_end = HEADER_SIZE + payload_len;
        let stored_crc = u32::from_le_bytes([
            remaining[payload_end],
            remaining[payload_end + 1],
            remaining[payload_end + 2],
            remaining[payload_end + 3],
        ]);
        let computed_crc = compute_crc32(&remaining[..payload_end]);
        if stored_crc != computed_crc {
            return Err(StorageError::corrupted(
                offset,
                format!("checksum mismatch: expected {stored_crc:#010x}, got {computed_crc:#010x}"),
            ));
        }

        records.push(JournalRecord::decode_payload(
            type_byte,
            &remaining[HEADER_SIZE..payload_end],
            offset,
        )?);
        pos += total_len;
    }

    Ok(Replay {
        records,
        valid_len: pos as u64,
    })
}

/// A [`KeyValueStore`] persisted as an append-only journal on a byte backend.
///
/// Reads are served from an in-memory index. Each `put`/`remove` appends a
/// single record, so a write costs the size of the one value being replaced
/// rather than the size of the whole store. [`KeyValueStore::compact`]
/// collapses the journal to one record per live key.
///
/// # Example
///
/// ```rust
/// use akilhane_storage::{InMemoryBackend, JournalStore, KeyValueStore};
///
/// let mut store = JournalStore::open(InMemoryBackend::new()).unwrap();
/// store.put("questions", b"[]").unwrap();
/// assert!(store.remove("questions").unwrap());
/// assert!(store.keys().unwrap().is_empty());
/// ```
pub struct JournalStore<B: StorageBackend> {
    backend: B,
    index: BTreeMap<String, Vec<u8>>,
    sync_on_write: bool,
}

impl JournalStore<InMemoryBackend> {
    /// Creates an empty journal over an in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: InMemoryBackend::new(),
            index: BTreeMap::new(),
            sync_on_write: false,
        }
    }
}

impl<B: StorageBackend> JournalStore<B> {
    /// Opens a journal by replaying every record in `backend`.
    ///
    /// A torn record at the tail is truncated away.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupted`] if a complete record fails its
    /// checksum or cannot be decoded.
    pub fn open(mut backend: B) -> StorageResult<Self> {
        let bytes = backend.read_all()?;
        let size = bytes.len() as u64;
        let Replay { records, valid_len } = replay(&bytes)?;

        if valid_len < size {
            warn!(
                valid_len,
                size, "truncating torn record at end of journal"
            );
            backend.truncate(valid_len)?;
        }

        let mut index = BTreeMap::new();
        let record_count = records.len();
        for record in records {
            match record {
                JournalRecord::Put { key, value } => {
                    index.insert(key, value);
                }
                JournalRecord::Remove { key } => {
                    index.remove(&key);
                }
            }
        }
        debug!(records = record_count, keys = index.len(), "journal replayed");

        Ok(Self {
            backend,
            index,
            sync_on_write: true,
        })
    }

    /// Sets whether every write is synced to durable storage before returning.
    #[must_use]
    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Returns the underlying byte backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the journal holds no live keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn append(&mut self, record: &JournalRecord) -> StorageResult<()> {
        let bytes = record.encode()?;
        self.backend.append(&bytes)?;
        if self.sync_on_write {
            self.backend.sync()?;
        }
        Ok(())
    }
}

impl<B: StorageBackend> KeyValueStore for JournalStore<B> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.index.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.append(&JournalRecord::Put {
            key: key.to_string(),
            value: value.to_vec(),
        })?;
        self.index.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        if !self.index.contains_key(key) {
            return Ok(false);
        }
        self.append(&JournalRecord::Remove {
            key: key.to_string(),
        })?;
        self.index.remove(key);
        Ok(true)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.index.keys().cloned().collect())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.backend.sync()
    }

    fn size_on_disk(&self) -> StorageResult<u64> {
        Ok(self.backend.size())
    }

    fn compact(&mut self) -> StorageResult<()> {
        let before = self.backend.size();
        let mut buf = Vec::new();
        for (key, value) in &self.index {
            let record = JournalRecord::Put {
                key: key.clone(),
                value: value.clone(),
            };
            buf.extend_from_slice(&record.encode()?);
        }
        self.backend.replace(&buf)?;
        debug!(before, after = buf.len(), "journal compacted");
        Ok(())
    }
}

/// Computes CRC32 checksum for data (IEEE polynomial).
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
