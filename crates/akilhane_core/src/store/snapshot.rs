//! Whole-store export and import.
//!
//! Import merges by content: a record is added only when no equivalent
//! record (see [`crate::identity`]) is already present, and it gets a fresh
//! local id. Importing the same snapshot twice adds nothing the second time.

use super::{Inner, LocalStore};
use crate::collection::{topic_key, Record, FLASHCARDS_KEY, QUESTIONS_KEY, SUBJECTS_KEY};
use crate::error::CoreResult;
use crate::identity::{ContentIndex, Identity};
use crate::model::{Flashcard, Question, Subject, TopicContent};
use crate::review;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Every record of a store at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Questions.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Subjects.
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Flashcards.
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    /// Topic content of every subject.
    #[serde(default)]
    pub topics: Vec<TopicContent>,
    /// When the snapshot was taken.
    pub exported_at: DateTime<Utc>,
}

/// Records added by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Subjects added.
    pub subjects: usize,
    /// Questions added.
    pub questions: usize,
    /// Flashcards added.
    pub flashcards: usize,
    /// Topic content records added.
    pub topics: usize,
    /// Records skipped because an equivalent exists or they are invalid.
    pub skipped: usize,
}

impl ImportReport {
    /// Returns the number of records added.
    pub fn added(&self) -> usize {
        self.subjects + self.questions + self.flashcards + self.topics
    }
}

impl Inner {
    /// Appends the records of `incoming` without an equivalent in the
    /// collection under `key`. Returns `(added, skipped)`.
    fn merge<T, F>(&mut self, key: &str, incoming: Vec<T>, check: F) -> CoreResult<(usize, usize)>
    where
        T: Record + Identity,
        F: Fn(&T) -> CoreResult<()>,
    {
        let mut records = self.load_writable::<T>(key)?;
        let mut index = ContentIndex::build(&records);
        let (mut added, mut skipped) = (0, 0);

        for mut record in incoming {
            if index.contains(&record) {
                skipped += 1;
                continue;
            }
            if let Err(e) = check(&record) {
                warn!(kind = T::KIND, id = %record.id(), error = %e, "skipping invalid record");
                skipped += 1;
                continue;
            }
            let id = self.fresh_id(&records)?;
            record.set_id(id);
            index.insert(&record);
            records.push(record);
            added += 1;
        }

        if added > 0 {
            self.save(key, &records)?;
        }
        Ok((added, skipped))
    }
}

impl LocalStore {
    /// Returns a snapshot of every collection.
    pub fn export_snapshot(&self) -> CoreResult<StoreSnapshot> {
        let mut inner = self.inner.lock();
        Ok(StoreSnapshot {
            questions: inner.load(QUESTIONS_KEY)?,
            subjects: inner.load(SUBJECTS_KEY)?,
            flashcards: inner.load(FLASHCARDS_KEY)?,
            topics: inner
                .all_topics()?
                .into_iter()
                .flat_map(|(_, records)| records)
                .collect(),
            exported_at: Utc::now(),
        })
    }

    /// Adds the records of `snapshot` that have no equivalent in this store.
    pub fn import_snapshot(&self, snapshot: StoreSnapshot) -> CoreResult<ImportReport> {
        let mut inner = self.inner.lock();
        let mut report = ImportReport::default();

        let (added, skipped) = inner.merge(SUBJECTS_KEY, snapshot.subjects, |_| Ok(()))?;
        report.subjects = added;
        report.skipped += skipped;

        let (added, skipped) = inner.merge(QUESTIONS_KEY, snapshot.questions, Question::validate)?;
        report.questions = added;
        report.skipped += skipped;

        let (added, skipped) = inner.merge(FLASHCARDS_KEY, snapshot.flashcards, |card: &Flashcard| {
            review::validate_confidence(card.confidence).map(drop)
        })?;
        report.flashcards = added;
        report.skipped += skipped;

        // Topic ids must be unique across partitions, so merge against all of them.
        let mut existing: Vec<TopicContent> = inner
            .all_topics_writable()?
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect();
        let mut index = ContentIndex::build(&existing);
        for mut record in snapshot.topics {
            if index.contains(&record) {
                report.skipped += 1;
                continue;
            }
            record.id = inner.fresh_id(&existing)?;
            let key = topic_key(&record.subject);
            let mut partition = inner.load_writable::<TopicContent>(&key)?;
            partition.push(record.clone());
            inner.save(&key, &partition)?;
            index.insert(&record);
            existing.push(record);
            report.topics += 1;
        }

        info!(
            added = report.added(),
            skipped = report.skipped,
            "snapshot imported"
        );
        Ok(report)
    }
}
