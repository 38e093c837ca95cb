//! Topic content operations.
//!
//! Topic content lives in one partition per subject. Ids are unique across
//! all partitions; a record whose id already appeared in an earlier
//! partition (in key order) is dropped when the partitions are read.

use super::{Inner, LocalStore};
use crate::collection::{topic_key, QUARANTINE_SUFFIX, TOPIC_KEY_PREFIX};
use crate::error::CoreResult;
use crate::identity::normalize;
use crate::model::{NewTopicContent, TopicContent, TopicContentPatch};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, warn};

impl Inner {
    pub(super) fn topic_keys(&self) -> CoreResult<Vec<String>> {
        let mut keys = self.kv.keys()?;
        keys.retain(|k| k.starts_with(TOPIC_KEY_PREFIX) && !k.ends_with(QUARANTINE_SUFFIX));
        Ok(keys)
    }

    /// Writes a partition, removing its key once it is empty.
    pub(super) fn save_partition(&mut self, key: &str, records: &[TopicContent]) -> CoreResult<()> {
        if records.is_empty() {
            self.kv.remove(key)?;
            return self.maybe_compact();
        }
        self.save(key, records)
    }

    /// Reads every partition, repairing ids duplicated across partitions.
    pub(super) fn all_topics(&mut self) -> CoreResult<Vec<(String, Vec<TopicContent>)>> {
        self.topic_partitions(false)
    }

    /// Like [`Inner::all_topics`], but moves unreadable partitions aside.
    pub(super) fn all_topics_writable(&mut self) -> CoreResult<Vec<(String, Vec<TopicContent>)>> {
        self.topic_partitions(true)
    }

    fn topic_partitions(&mut self, writable: bool) -> CoreResult<Vec<(String, Vec<TopicContent>)>> {
        let mut seen = HashSet::new();
        let mut partitions = Vec::new();

        for key in self.topic_keys()? {
            let mut records = if writable {
                self.load_writable::<TopicContent>(&key)?
            } else {
                self.load::<TopicContent>(&key)?
            };
            let before = records.len();
            records.retain(|r| seen.insert(r.id.clone()));

            let removed = before - records.len();
            if removed > 0 {
                warn!(key = %key, removed, "dropped topic content with ids used in another partition");
                self.save_partition(&key, &records)?;
            }
            partitions.push((key, records));
        }
        Ok(partitions)
    }

    pub(super) fn add_topic_content(&mut self, new: NewTopicContent) -> CoreResult<TopicContent> {
        let existing: Vec<TopicContent> = self
            .all_topics_writable()?
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect();
        let record = new.into_topic_content(self.fresh_id(&existing)?, Utc::now());

        let key = topic_key(&record.subject);
        let mut partition = self.load_writable::<TopicContent>(&key)?;
        partition.push(record.clone());
        self.save(&key, &partition)?;
        debug!(id = %record.id, key = %key, "topic content added");
        Ok(record)
    }
}

impl LocalStore {
    /// Returns all topic content across every subject partition.
    pub fn topic_contents(&self) -> CoreResult<Vec<TopicContent>> {
        Ok(self
            .inner
            .lock()
            .all_topics()?
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect())
    }

    /// Returns the topic content with `id`.
    pub fn topic_content_by_id(&self, id: &str) -> CoreResult<Option<TopicContent>> {
        Ok(self.topic_contents()?.into_iter().find(|t| t.id == id))
    }

    /// Returns the topic content of one subject, matched ignoring case and
    /// surrounding whitespace.
    pub fn topic_contents_by_subject(&self, subject: &str) -> CoreResult<Vec<TopicContent>> {
        let wanted = normalize(subject);
        let mut records = self.inner.lock().load::<TopicContent>(&topic_key(subject))?;
        records.retain(|t| normalize(&t.subject) == wanted);
        Ok(records)
    }

    /// Returns topic content for `topic` in any subject, ignoring case.
    pub fn topic_contents_by_topic(&self, topic: &str) -> CoreResult<Vec<TopicContent>> {
        let wanted = normalize(topic);
        let mut records = self.topic_contents()?;
        records.retain(|t| normalize(&t.topic) == wanted);
        Ok(records)
    }

    /// Saves generated topic content in its subject's partition.
    pub fn add_topic_content(&self, new: NewTopicContent) -> CoreResult<TopicContent> {
        self.inner.lock().add_topic_content(new)
    }

    /// Merges `patch` into the topic content with `id` and bumps its
    /// `updated_at`. Returns `false` if absent.
    pub fn update_topic_content(&self, id: &str, patch: TopicContentPatch) -> CoreResult<bool> {
        let mut inner = self.inner.lock();

        for (key, mut records) in inner.all_topics_writable()? {
            let Some(pos) = records.iter().position(|t| t.id == id) else {
                continue;
            };

            let mut record = records.remove(pos);
            patch.apply_to(&mut record, Utc::now());
            let new_key = topic_key(&record.subject);

            if new_key == key {
                records.insert(pos, record);
                inner.save(&key, &records)?;
            } else {
                inner.save_partition(&key, &records)?;
                let mut target = inner.load_writable::<TopicContent>(&new_key)?;
                target.push(record);
                inner.save(&new_key, &target)?;
                debug!(id = %id, from = %key, to = %new_key, "topic content moved");
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Deletes the topic content with `id`. Returns `false` if absent.
    pub fn delete_topic_content(&self, id: &str) -> CoreResult<bool> {
        let mut inner = self.inner.lock();

        for (key, mut records) in inner.all_topics_writable()? {
            let before = records.len();
            records.retain(|t| t.id != id);
            if records.len() != before {
                inner.save_partition(&key, &records)?;
                debug!(id = %id, key = %key, "topic content deleted");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::save;

    fn topic(topic: &str, subject: &str) -> NewTopicContent {
        NewTopicContent {
            topic: topic.into(),
            subject: subject.into(),
            content: format!("{topic} explained"),
            step_data: None,
        }
    }

    #[test]
    fn partitions_by_normalized_subject() {
        let store = LocalStore::in_memory();
        let a = store.add_topic_content(topic("Türev", "Matematik")).unwrap();
        let b = store.add_topic_content(topic("İntegral", " matematik ")).unwrap();
        store.add_topic_content(topic("Newton", "Fizik")).unwrap();

        let keys = store.inner.lock().topic_keys().unwrap();
        assert_eq!(keys, vec!["topic-explainer:fizik", "topic-explainer:matematik"]);

        let math = store.topic_contents_by_subject("MATEMATIK").unwrap();
        assert_eq!(math, vec![a, b]);
        assert_eq!(store.topic_contents().unwrap().len(), 3);
    }

    #[test]
    fn lookup_by_topic_ignores_case() {
        let store = LocalStore::in_memory();
        let a = store.add_topic_content(topic("Türev", "Matematik")).unwrap();
        let b = store.add_topic_content(topic("türev ", "Fizik")).unwrap();

        let mut found = store.topic_contents_by_topic("TÜREV").unwrap();
        found.sort_by(|x, y| x.id.cmp(&y.id));
        let mut expected = vec![a.clone(), b];
        expected.sort_by(|x, y| x.id.cmp(&y.id));
        assert_eq!(found, expected);

        assert_eq!(store.topic_content_by_id(&a.id).unwrap(), Some(a));
    }

    #[test]
    fn update_moves_record_between_partitions() {
        let store = LocalStore::in_memory();
        let added = store.add_topic_content(topic("Vektör", "Matematik")).unwrap();

        let patch = TopicContentPatch {
            subject: Some("Fizik".into()),
            ..TopicContentPatch::default()
        };
        assert!(store.update_topic_content(&added.id, patch).unwrap());

        assert!(store.topic_contents_by_subject("Matematik").unwrap().is_empty());
        let moved = store.topic_contents_by_subject("Fizik").unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, added.id);
        assert!(moved[0].updated_at >= added.updated_at);

        let keys = store.inner.lock().topic_keys().unwrap();
        assert_eq!(keys, vec!["topic-explainer:fizik"]);
    }

    #[test]
    fn update_and_delete_missing_topic() {
        let store = LocalStore::in_memory();
        assert!(!store
            .update_topic_content("missing", TopicContentPatch::default())
            .unwrap());
        assert!(!store.delete_topic_content("missing").unwrap());

        let added = store.add_topic_content(topic("Türev", "Matematik")).unwrap();
        assert!(store.delete_topic_content(&added.id).unwrap());
        assert!(store.topic_contents().unwrap().is_empty());
    }

    #[test]
    fn ids_duplicated_across_partitions_are_dropped() {
        let store = LocalStore::in_memory();
        let added = store.add_topic_content(topic("Türev", "Matematik")).unwrap();

        let mut copy = added.clone();
        copy.subject = "Fizik".into();
        {
            let mut inner = store.inner.lock();
            save(&mut *inner.kv, "topic-explainer:fizik", &[copy]).unwrap();
        }

        let all = store.topic_contents().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].subject, "Fizik");
        assert!(store.topic_contents_by_subject("Matematik").unwrap().is_empty());
    }
}
