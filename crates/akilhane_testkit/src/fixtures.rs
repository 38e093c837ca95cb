//! Test fixtures and store helpers.

use akilhane_core::{
    IdGenerator, LocalStore, NewFlashcard, NewQuestion, NewSubject, NewTopicContent,
    QuestionOption, RandomIdGenerator, StoreConfig,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: LocalStore,
    config: Option<StoreConfig>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self {
            store: LocalStore::in_memory(),
            config: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-backed test store in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = StoreConfig::new(temp_dir.path()).sync_on_write(false);
        let store = LocalStore::open(&config).expect("Failed to open file store");

        Self {
            store,
            config: Some(config),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the data directory if file-backed, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Closes and reopens a file-backed store, replaying its journal.
    ///
    /// # Panics
    ///
    /// Panics if the store is in-memory.
    pub fn reopen(self) -> Self {
        let Self {
            store,
            config,
            _temp_dir,
        } = self;
        let config = config.expect("Only file stores can be reopened");
        store.flush().expect("Failed to flush store");
        drop(store);

        let store = LocalStore::open(&config).expect("Failed to reopen file store");
        Self {
            store,
            config: Some(config),
            _temp_dir,
        }
    }
}

impl std::ops::Deref for TestStore {
    type Target = LocalStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&LocalStore) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&LocalStore, &Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store.path().expect("File store should have a path");
    f(&test_store.store, path)
}

/// An id generator that hands out scripted ids first.
///
/// Once the script is exhausted it falls back to random ids.
#[derive(Debug, Default, Clone)]
pub struct ScriptedIds {
    queue: Arc<Mutex<VecDeque<String>>>,
}

impl ScriptedIds {
    /// Creates a generator that returns `ids` in order.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Arc::new(Mutex::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    /// Appends an id to the script.
    pub fn push(&self, id: impl Into<String>) {
        self.queue.lock().push_back(id.into());
    }
}

impl IdGenerator for ScriptedIds {
    fn generate(&self, prefix: &str) -> String {
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| RandomIdGenerator.generate(prefix))
    }
}

/// Builds a valid multiple-choice question.
pub fn new_question(text: &str, subject: &str) -> NewQuestion {
    NewQuestion {
        subject: subject.to_string(),
        topic: "Genel".to_string(),
        kind: "multiple-choice".to_string(),
        difficulty: "Orta".to_string(),
        text: text.to_string(),
        options: vec![
            QuestionOption::new("A", true),
            QuestionOption::new("B", false),
            QuestionOption::new("C", false),
            QuestionOption::new("D", false),
        ],
        explanation: format!("{text} explained"),
        formula: String::new(),
        remote_id: None,
    }
}

/// Builds an active subject.
pub fn new_subject(name: &str) -> NewSubject {
    NewSubject {
        description: format!("{name} dersi"),
        category: "Genel".to_string(),
        difficulty: "Orta".to_string(),
        ..NewSubject::named(name)
    }
}

/// Builds a flashcard.
pub fn new_flashcard(question: &str, subject: &str) -> NewFlashcard {
    NewFlashcard {
        question: question.to_string(),
        answer: format!("{question} answer"),
        explanation: String::new(),
        topic: "Genel".to_string(),
        difficulty: "Orta".to_string(),
        subject: subject.to_string(),
    }
}

/// Builds topic content without step data.
pub fn new_topic(topic: &str, subject: &str) -> NewTopicContent {
    NewTopicContent {
        topic: topic.to_string(),
        subject: subject.to_string(),
        content: format!("{topic} explained"),
        step_data: None,
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store with `subjects`, each holding `per_subject` questions
    /// and flashcards.
    pub fn populated_store(subjects: &[&str], per_subject: usize) -> TestStore {
        let test_store = TestStore::memory();
        for name in subjects {
            test_store
                .add_subject(new_subject(name))
                .expect("Failed to add subject");
            for i in 0..per_subject {
                let text = format!("{name} question {i}");
                test_store
                    .add_question(new_question(&text, name))
                    .expect("Failed to add question");
                test_store
                    .add_flashcard(new_flashcard(&text, name))
                    .expect("Failed to add flashcard");
            }
        }
        test_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_ids_fall_back_to_random() {
        let ids = ScriptedIds::new(["subject_1"]);
        assert_eq!(ids.generate("subject"), "subject_1");
        assert!(ids.generate("subject").starts_with("subject_"));
        assert_ne!(ids.generate("subject"), "subject_1");
    }

    #[test]
    fn populated_store_counts() {
        let store = scenarios::populated_store(&["Fizik", "Kimya"], 3);
        let info = store.storage_info().unwrap();
        assert_eq!(info.subjects, 2);
        assert_eq!(info.questions, 6);
        assert_eq!(info.flashcards, 6);
    }

    #[test]
    fn file_store_reopens() {
        let store = TestStore::file();
        store.add_subject(new_subject("Fizik")).unwrap();
        let store = store.reopen();
        assert_eq!(store.subjects().unwrap().len(), 1);
    }
}
