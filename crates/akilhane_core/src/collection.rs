//! Typed JSON collections over the key/value substrate.
//!
//! Each collection is one JSON array stored under a fixed key. Topic content
//! is partitioned: one array per subject under `topic-explainer:{subject}`.

use crate::error::{CoreError, CoreResult};
use crate::identity::normalize;
use akilhane_storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// Key of the question collection.
pub const QUESTIONS_KEY: &str = "questions";
/// Key of the subject collection.
pub const SUBJECTS_KEY: &str = "subjects";
/// Key of the flashcard collection.
pub const FLASHCARDS_KEY: &str = "flashcards";
/// Prefix of the per-subject topic content partitions.
pub const TOPIC_KEY_PREFIX: &str = "topic-explainer:";
/// Suffix of the key an unreadable payload is moved to.
pub const QUARANTINE_SUFFIX: &str = ".corrupt";

/// Returns the partition key for a subject's topic content.
pub fn topic_key(subject: &str) -> String {
    format!("{TOPIC_KEY_PREFIX}{}", normalize(subject))
}

/// A record stored in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Record kind; also the id prefix.
    const KIND: &'static str;

    /// Returns the record's id.
    fn id(&self) -> &str;

    /// Replaces the record's id.
    fn set_id(&mut self, id: String);
}

/// Parses a stored collection payload.
pub(crate) fn decode<T: Record>(key: &str, bytes: &[u8]) -> CoreResult<Vec<T>> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::Corrupted {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Drops records whose id repeats an earlier one. Returns the number removed.
pub(crate) fn dedup_ids<T: Record>(records: &mut Vec<T>) -> usize {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    records.retain(|r| seen.insert(r.id().to_string()));
    before - records.len()
}

/// Reads a collection without repairing it. A missing key is empty.
pub(crate) fn read<T: Record>(kv: &dyn KeyValueStore, key: &str) -> CoreResult<Vec<T>> {
    match kv.get(key)? {
        Some(bytes) => decode(key, &bytes),
        None => Ok(Vec::new()),
    }
}

/// Reads a collection, rewriting it first if it holds duplicate ids.
pub(crate) fn load<T: Record>(kv: &mut dyn KeyValueStore, key: &str) -> CoreResult<Vec<T>> {
    let mut records = read::<T>(kv, key)?;
    let removed = dedup_ids(&mut records);
    if removed > 0 {
        warn!(key = %key, removed, kept = records.len(), "dropped records with duplicate ids");
        save(kv, key, &records)?;
    }
    Ok(records)
}

/// Reads a collection that is about to be written.
///
/// An unreadable payload is moved to `{key}.corrupt` and the write starts
/// from an empty collection. A later quarantine of the same key overwrites
/// the earlier one.
pub(crate) fn load_or_quarantine<T: Record>(
    kv: &mut dyn KeyValueStore,
    key: &str,
) -> CoreResult<Vec<T>> {
    match load::<T>(kv, key) {
        Err(CoreError::Corrupted { message, .. }) => {
            let quarantine = format!("{key}{QUARANTINE_SUFFIX}");
            if let Some(bytes) = kv.get(key)? {
                kv.put(&quarantine, &bytes)?;
            }
            kv.remove(key)?;
            warn!(key = %key, quarantine = %quarantine, error = %message, "moved unreadable collection aside");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Persists a whole collection under `key`.
pub(crate) fn save<T: Record>(
    kv: &mut dyn KeyValueStore,
    key: &str,
    records: &[T],
) -> CoreResult<()> {
    let bytes = serde_json::to_vec(records)?;
    kv.put(key, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use akilhane_storage::JournalStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        n: u32,
    }

    impl Record for Item {
        const KIND: &'static str = "item";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    fn item(id: &str, n: u32) -> Item {
        Item { id: id.into(), n }
    }

    #[test]
    fn topic_keys_are_normalized() {
        assert_eq!(topic_key("  Matematik "), "topic-explainer:matematik");
        assert_eq!(topic_key("matematik"), topic_key("MATEMATIK"));
    }

    #[test]
    fn missing_key_is_empty() {
        let kv = JournalStore::in_memory();
        assert!(read::<Item>(&kv, "items").unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_corrupted() {
        let mut kv = JournalStore::in_memory();
        kv.put("items", b"{not json").unwrap();

        let err = read::<Item>(&kv, "items").unwrap_err();
        assert!(matches!(err, CoreError::Corrupted { ref key, .. } if key == "items"));
    }

    #[test]
    fn load_keeps_first_duplicate_and_rewrites() {
        let mut kv = JournalStore::in_memory();
        save(&mut kv, "items", &[item("a", 1), item("b", 2), item("a", 3)]).unwrap();

        let loaded = load::<Item>(&mut kv, "items").unwrap();
        assert_eq!(loaded, vec![item("a", 1), item("b", 2)]);

        let stored = read::<Item>(&kv, "items").unwrap();
        assert_eq!(stored, loaded);
    }

    #[test]
    fn unreadable_payload_is_moved_aside_for_writes() {
        let mut kv = JournalStore::in_memory();
        kv.put("items", b"[{\"id\": ").unwrap();

        let loaded = load_or_quarantine::<Item>(&mut kv, "items").unwrap();
        assert!(loaded.is_empty());
        assert_eq!(kv.get("items").unwrap(), None);
        assert_eq!(
            kv.get("items.corrupt").unwrap().as_deref(),
            Some(&b"[{\"id\": "[..])
        );
    }

    #[test]
    fn readable_payload_is_not_quarantined() {
        let mut kv = JournalStore::in_memory();
        save(&mut kv, "items", &[item("a", 1)]).unwrap();

        let loaded = load_or_quarantine::<Item>(&mut kv, "items").unwrap();
        assert_eq!(loaded, vec![item("a", 1)]);
        assert_eq!(kv.get("items.corrupt").unwrap(), None);
    }
}
