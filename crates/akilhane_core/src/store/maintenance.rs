//! Store inspection and repair.

use super::LocalStore;
use crate::collection::{self, FLASHCARDS_KEY, QUESTIONS_KEY, SUBJECTS_KEY};
use crate::error::CoreResult;
use crate::model::{Flashcard, Question, Subject};
use serde::Serialize;
use tracing::info;

/// Record counts and sizes of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    /// Number of questions.
    pub questions: usize,
    /// Number of subjects.
    pub subjects: usize,
    /// Number of flashcards.
    pub flashcards: usize,
    /// Number of topic content records.
    pub topics: usize,
    /// Total size of the stored collection payloads in bytes.
    pub payload_bytes: u64,
    /// Size of the underlying journal in bytes.
    pub disk_bytes: u64,
}

/// Result of an explicit duplicate cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    /// Records removed.
    pub removed: usize,
    /// Records left.
    pub total: usize,
}

/// Result of a question integrity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Questions that passed.
    pub valid: usize,
    /// Questions that failed.
    pub invalid: usize,
    /// One message per failing question.
    pub errors: Vec<String>,
}

fn check_question(question: &Question) -> Result<(), &'static str> {
    let blank = |s: &str| s.trim().is_empty();
    if blank(&question.id)
        || blank(&question.subject)
        || blank(&question.text)
        || blank(&question.explanation)
    {
        return Err("missing required fields");
    }
    if question.options.is_empty() {
        return Err("no options");
    }
    if question.validate().is_err() {
        return Err("no correct option");
    }
    Ok(())
}

impl LocalStore {
    /// Returns record counts and sizes.
    pub fn storage_info(&self) -> CoreResult<StorageInfo> {
        let mut inner = self.inner.lock();
        let questions = inner.load::<Question>(QUESTIONS_KEY)?.len();
        let subjects = inner.load::<Subject>(SUBJECTS_KEY)?.len();
        let flashcards = inner.load::<Flashcard>(FLASHCARDS_KEY)?.len();
        let topics = inner
            .all_topics()?
            .iter()
            .map(|(_, records)| records.len())
            .sum();

        let mut payload_bytes = 0u64;
        for key in inner.kv.keys()? {
            if let Some(value) = inner.kv.get(&key)? {
                payload_bytes += value.len() as u64;
            }
        }

        Ok(StorageInfo {
            questions,
            subjects,
            flashcards,
            topics,
            payload_bytes,
            disk_bytes: inner.kv.size_on_disk()?,
        })
    }

    /// Removes questions whose id repeats an earlier one.
    pub fn cleanup_duplicate_questions(&self) -> CoreResult<DedupReport> {
        let mut inner = self.inner.lock();
        let mut questions = collection::read::<Question>(&*inner.kv, QUESTIONS_KEY)?;
        let removed = collection::dedup_ids(&mut questions);
        if removed > 0 {
            inner.save(QUESTIONS_KEY, &questions)?;
            info!(removed, "removed duplicate questions");
        }
        Ok(DedupReport {
            removed,
            total: questions.len(),
        })
    }

    /// Checks every question for missing fields and unusable options.
    pub fn validate_questions(&self) -> CoreResult<ValidationReport> {
        let mut report = ValidationReport::default();
        for (index, question) in self.questions()?.iter().enumerate() {
            match check_question(question) {
                Ok(()) => report.valid += 1,
                Err(reason) => {
                    report.invalid += 1;
                    report
                        .errors
                        .push(format!("question {index} ({}): {reason}", question.id));
                }
            }
        }
        Ok(report)
    }

    /// Removes every collection, including payloads moved aside as
    /// unreadable.
    pub fn clear(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        for key in inner.kv.keys()? {
            inner.kv.remove(&key)?;
        }
        info!("local store cleared");
        inner.maybe_compact()
    }
}
