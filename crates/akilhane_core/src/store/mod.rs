//! The local store.
//!
//! [`LocalStore`] is the single source of truth for study content on this
//! device. It keeps four collections in a [`KeyValueStore`]:
//!
//! | Key | Contents |
//! |---|---|
//! | `questions` | every [`Question`] |
//! | `subjects` | every [`Subject`] |
//! | `flashcards` | every [`Flashcard`] |
//! | `topic-explainer:{subject}` | [`TopicContent`](crate::TopicContent) of one subject |
//!
//! Every operation takes the store's mutex for its whole read-modify-write,
//! so concurrent callers in one process never lose each other's writes.
//! Mutations persist only the key they touch.

mod flashcards;
mod maintenance;
mod snapshot;
mod topics;

pub use maintenance::{DedupReport, StorageInfo, ValidationReport};
pub use snapshot::{ImportReport, StoreSnapshot};

use crate::collection::{self, Record, QUESTIONS_KEY, SUBJECTS_KEY};
use crate::config::StoreConfig;
use crate::dir::StoreDir;
use crate::error::{CoreError, CoreResult};
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::identity::normalize;
use crate::model::{NewQuestion, NewSubject, Question, QuestionPatch, Subject, SubjectPatch};
use akilhane_storage::{FileBackend, JournalStore, KeyValueStore};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, info, warn};

/// Durable store of questions, subjects, flashcards and topic content.
pub struct LocalStore {
    inner: Mutex<Inner>,
    dir: Option<StoreDir>,
}

struct Inner {
    kv: Box<dyn KeyValueStore>,
    ids: Box<dyn IdGenerator>,
    compact_threshold: u64,
    /// Journal size right after the last compaction.
    compacted_size: u64,
}

impl Inner {
    fn load<T: Record>(&mut self, key: &str) -> CoreResult<Vec<T>> {
        collection::load(&mut *self.kv, key)
    }

    /// Loads a collection that is about to be rewritten.
    fn load_writable<T: Record>(&mut self, key: &str) -> CoreResult<Vec<T>> {
        collection::load_or_quarantine(&mut *self.kv, key)
    }

    fn save<T: Record>(&mut self, key: &str, records: &[T]) -> CoreResult<()> {
        collection::save(&mut *self.kv, key, records)?;
        self.maybe_compact()
    }

    /// Compacts once the journal is past the threshold and at least half
    /// of it is stale.
    fn maybe_compact(&mut self) -> CoreResult<()> {
        if self.compact_threshold == 0 {
            return Ok(());
        }
        let size = self.kv.size_on_disk()?;
        if size > self.compact_threshold && size > self.compacted_size.saturating_mul(2) {
            info!(size, threshold = self.compact_threshold, "compacting store journal");
            self.compact()?;
        }
        Ok(())
    }

    fn compact(&mut self) -> CoreResult<()> {
        self.kv.compact()?;
        self.compacted_size = self.kv.size_on_disk()?;
        Ok(())
    }

    /// Generates an id not used by any of `existing`, retrying once.
    fn fresh_id<T: Record>(&self, existing: &[T]) -> CoreResult<String> {
        let taken = |id: &str| existing.iter().any(|r| r.id() == id);

        let id = self.ids.generate(T::KIND);
        if !taken(&id) {
            return Ok(id);
        }
        warn!(kind = T::KIND, id = %id, "generated id collides, regenerating");

        let retry = self.ids.generate(T::KIND);
        if taken(&retry) {
            return Err(CoreError::IdCollision {
                kind: T::KIND,
                id: retry,
            });
        }
        Ok(retry)
    }

    /// Applies `f` to the record with `id`. Returns `false` if there is none.
    fn modify<T, F>(&mut self, key: &str, id: &str, f: F) -> CoreResult<bool>
    where
        T: Record,
        F: FnOnce(&mut T) -> CoreResult<()>,
    {
        let mut records = self.load_writable::<T>(key)?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        f(record)?;
        self.save(key, &records)?;
        debug!(kind = T::KIND, id = %id, "record updated");
        Ok(true)
    }

    fn remove<T: Record>(&mut self, key: &str, id: &str) -> CoreResult<bool> {
        let mut records = self.load_writable::<T>(key)?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(key, &records)?;
        debug!(kind = T::KIND, id = %id, "record deleted");
        Ok(true)
    }

    fn add_question(&mut self, new: NewQuestion) -> CoreResult<Question> {
        let mut questions = self.load_writable::<Question>(QUESTIONS_KEY)?;
        let question = new.into_question(self.fresh_id(&questions)?);
        question.validate()?;
        questions.push(question.clone());
        self.save(QUESTIONS_KEY, &questions)?;
        debug!(id = %question.id, subject = %question.subject, "question added");
        Ok(question)
    }

    fn add_subject(&mut self, new: NewSubject) -> CoreResult<Subject> {
        let mut subjects = self.load_writable::<Subject>(SUBJECTS_KEY)?;
        let subject = new.into_subject(self.fresh_id(&subjects)?);
        subjects.push(subject.clone());
        self.save(SUBJECTS_KEY, &subjects)?;
        debug!(id = %subject.id, name = %subject.name, "subject added");
        Ok(subject)
    }
}

impl LocalStore {
    /// Creates an empty, non-durable store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(Box::new(JournalStore::in_memory()), 0, None)
    }

    /// Opens (or creates) a file-backed store in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreLocked`] if another process has the store
    /// open, or a storage error if the journal cannot be replayed.
    pub fn open(config: &StoreConfig) -> CoreResult<Self> {
        let dir = StoreDir::open(config.data_dir(), config.create_if_missing)?;
        let backend = FileBackend::open(&dir.file(&config.journal_file))?;
        let journal = JournalStore::open(backend)?.with_sync_on_write(config.sync_on_write);
        info!(path = %dir.path().display(), keys = journal.len(), "local store opened");
        Ok(Self::from_parts(
            Box::new(journal),
            config.compact_threshold,
            Some(dir),
        ))
    }

    /// Creates a store over an arbitrary key/value substrate.
    pub fn with_backend<K: KeyValueStore + 'static>(kv: K) -> Self {
        Self::from_parts(Box::new(kv), 0, None)
    }

    /// Replaces the id generator.
    #[must_use]
    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.inner.get_mut().ids = Box::new(ids);
        self
    }

    fn from_parts(kv: Box<dyn KeyValueStore>, compact_threshold: u64, dir: Option<StoreDir>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                kv,
                ids: Box::new(RandomIdGenerator),
                compact_threshold,
                compacted_size: 0,
            }),
            dir,
        }
    }

    /// Returns the data directory of a file-backed store.
    pub fn data_dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(StoreDir::path)
    }

    // ---- questions ----

    /// Returns every question.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if the stored payload is unreadable.
    pub fn questions(&self) -> CoreResult<Vec<Question>> {
        self.inner.lock().load(QUESTIONS_KEY)
    }

    /// Returns the question with `id`.
    pub fn question_by_id(&self, id: &str) -> CoreResult<Option<Question>> {
        Ok(self.questions()?.into_iter().find(|q| q.id == id))
    }

    /// Returns questions whose subject matches `subject` ignoring case and
    /// surrounding whitespace.
    pub fn questions_by_subject(&self, subject: &str) -> CoreResult<Vec<Question>> {
        let wanted = normalize(subject);
        let mut questions = self.questions()?;
        questions.retain(|q| normalize(&q.subject) == wanted);
        Ok(questions)
    }

    /// Adds a question with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if options are present but none
    /// is correct, or [`CoreError::IdCollision`] if no unique id was found.
    pub fn add_question(&self, new: NewQuestion) -> CoreResult<Question> {
        self.inner.lock().add_question(new)
    }

    /// Merges `patch` into the question with `id`. Returns `false` if absent.
    pub fn update_question(&self, id: &str, patch: QuestionPatch) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Question, _>(QUESTIONS_KEY, id, |question| {
                patch.apply_to(question);
                question.validate()
            })
    }

    /// Deletes the question with `id`. Returns `false` if absent.
    pub fn delete_question(&self, id: &str) -> CoreResult<bool> {
        self.inner.lock().remove::<Question>(QUESTIONS_KEY, id)
    }

    /// Records that the question was pushed to (or pulled from) remote row
    /// `remote_id`.
    pub fn mark_question_synced(
        &self,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Question, _>(QUESTIONS_KEY, id, |question| {
                question.remote_id = Some(remote_id.to_string());
                question.synced_at = Some(at);
                Ok(())
            })
    }

    // ---- subjects ----

    /// Returns every subject.
    pub fn subjects(&self) -> CoreResult<Vec<Subject>> {
        self.inner.lock().load(SUBJECTS_KEY)
    }

    /// Returns the subject with `id`.
    pub fn subject_by_id(&self, id: &str) -> CoreResult<Option<Subject>> {
        Ok(self.subjects()?.into_iter().find(|s| s.id == id))
    }

    /// Returns the first subject whose normalized name equals `name`'s.
    pub fn subject_by_name(&self, name: &str) -> CoreResult<Option<Subject>> {
        let wanted = normalize(name);
        Ok(self
            .subjects()?
            .into_iter()
            .find(|s| normalize(&s.name) == wanted))
    }

    /// Adds a subject with a freshly generated id.
    pub fn add_subject(&self, new: NewSubject) -> CoreResult<Subject> {
        self.inner.lock().add_subject(new)
    }

    /// Merges `patch` into the subject with `id`. Returns `false` if absent.
    pub fn update_subject(&self, id: &str, patch: SubjectPatch) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Subject, _>(SUBJECTS_KEY, id, |subject| {
                patch.apply_to(subject);
                Ok(())
            })
    }

    /// Deletes the subject with `id`. Returns `false` if absent.
    pub fn delete_subject(&self, id: &str) -> CoreResult<bool> {
        self.inner.lock().remove::<Subject>(SUBJECTS_KEY, id)
    }

    /// Records the remote row the subject is linked to.
    pub fn mark_subject_synced(
        &self,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> CoreResult<bool> {
        self.inner
            .lock()
            .modify::<Subject, _>(SUBJECTS_KEY, id, |subject| {
                subject.remote_id = Some(remote_id.to_string());
                subject.synced_at = Some(at);
                Ok(())
            })
    }

    // ---- housekeeping ----

    /// Makes every previous write durable.
    pub fn flush(&self) -> CoreResult<()> {
        self.inner.lock().kv.flush()?;
        Ok(())
    }

    /// Rewrites the journal so it holds only live values.
    pub fn compact(&self) -> CoreResult<()> {
        self.inner.lock().compact()
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("data_dir", &self.data_dir())
            .finish_non_exhaustive()
    }
}
