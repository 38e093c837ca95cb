//! Remote gateway abstraction.
//!
//! A [`RemoteGateway`] exposes list/create/update/delete per remote table.
//! Failures are returned as errors; the sync coordinator decides whether a
//! failure skips one record or aborts a pass.

use crate::error::{SyncError, SyncResult};
use crate::remote::{
    NewRemoteQuestion, NewRemoteSubject, RemoteQuestion, RemoteQuestionPatch, RemoteSubject,
    RemoteSubjectPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

/// Access to the remote `subjects` and `questions` tables.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Lists active subjects owned by `owner`, newest first.
    async fn list_subjects(&self, owner: &str) -> SyncResult<Vec<RemoteSubject>>;

    /// Inserts a subject and returns the stored row.
    async fn create_subject(&self, subject: &NewRemoteSubject) -> SyncResult<RemoteSubject>;

    /// Updates a subject. Returns `None` if no row has `id`.
    async fn update_subject(
        &self,
        id: &str,
        patch: &RemoteSubjectPatch,
    ) -> SyncResult<Option<RemoteSubject>>;

    /// Deletes a subject. Returns `false` if no row has `id`.
    async fn delete_subject(&self, id: &str) -> SyncResult<bool>;

    /// Lists active questions, newest first.
    async fn list_questions(&self) -> SyncResult<Vec<RemoteQuestion>>;

    /// Inserts a question and returns the stored row.
    async fn create_question(&self, question: &NewRemoteQuestion) -> SyncResult<RemoteQuestion>;

    /// Updates a question. Returns `None` if no row has `id`.
    async fn update_question(
        &self,
        id: &str,
        patch: &RemoteQuestionPatch,
    ) -> SyncResult<Option<RemoteQuestion>>;

    /// Deletes a question. Returns `false` if no row has `id`.
    async fn delete_question(&self, id: &str) -> SyncResult<bool>;

    /// Checks that the remote store is reachable.
    async fn ping(&self) -> SyncResult<()>;
}

#[derive(Debug, Default)]
struct MemoryTables {
    subjects: Vec<RemoteSubject>,
    questions: Vec<RemoteQuestion>,
    next_id: u64,
    create_calls: u64,
    failing_creates: HashSet<u64>,
    failing_lists: bool,
}

impl MemoryTables {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("remote-{:04}", self.next_id)
    }

    /// Counts a create call and fails it if it was scheduled to fail.
    fn begin_create(&mut self) -> SyncResult<()> {
        self.create_calls += 1;
        if self.failing_creates.contains(&self.create_calls) {
            return Err(SyncError::remote(
                500,
                format!("injected failure on create #{}", self.create_calls),
            ));
        }
        Ok(())
    }

    fn begin_list(&self) -> SyncResult<()> {
        if self.failing_lists {
            return Err(SyncError::transport_retryable("injected list failure"));
        }
        Ok(())
    }
}

/// An in-process remote store.
///
/// Supports failure injection and artificial latency for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<MemoryTables>,
    latency: Option<Duration>,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the `n`-th create call (1-based, across both tables) fail.
    pub fn fail_create(&self, n: u64) {
        self.tables.lock().failing_creates.insert(n);
    }

    /// Makes every list call fail (or succeed again).
    pub fn fail_lists(&self, fail: bool) {
        self.tables.lock().failing_lists = fail;
    }

    /// Returns the number of create calls so far, failed ones included.
    pub fn create_calls(&self) -> u64 {
        self.tables.lock().create_calls
    }

    /// Returns every subject row, including inactive ones.
    pub fn subjects(&self) -> Vec<RemoteSubject> {
        self.tables.lock().subjects.clone()
    }

    /// Returns every question row, including inactive ones.
    pub fn questions(&self) -> Vec<RemoteQuestion> {
        self.tables.lock().questions.clone()
    }

    /// Inserts a subject row directly, bypassing failure injection.
    pub fn seed_subject(&self, subject: &NewRemoteSubject) -> RemoteSubject {
        let mut tables = self.tables.lock();
        let row = subject_row(tables.next_id(), subject);
        tables.subjects.push(row.clone());
        row
    }

    /// Inserts a question row directly, bypassing failure injection.
    pub fn seed_question(&self, question: &NewRemoteQuestion) -> RemoteQuestion {
        let mut tables = self.tables.lock();
        let row = question_row(tables.next_id(), question);
        tables.questions.push(row.clone());
        row
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn subject_row(id: String, subject: &NewRemoteSubject) -> RemoteSubject {
    let now = Utc::now();
    RemoteSubject {
        id,
        name: subject.name.clone(),
        description: subject.description.clone(),
        category: subject.category.clone(),
        difficulty: subject.difficulty.clone(),
        question_count: subject.question_count,
        is_active: true,
        created_by: Some(subject.created_by.clone()),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn question_row(id: String, question: &NewRemoteQuestion) -> RemoteQuestion {
    RemoteQuestion {
        id,
        subject_id: question.subject_id.clone(),
        subject: question.subject.clone(),
        topic: question.topic.clone(),
        kind: question.kind.clone(),
        difficulty: question.difficulty.clone(),
        text: question.text.clone(),
        options: question.options.clone(),
        correct_answer: question.correct_answer.clone(),
        explanation: question.explanation.clone(),
        formula: question.formula.clone(),
        is_active: true,
        created_at: Some(Utc::now()),
    }
}

fn merge<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn list_subjects(&self, owner: &str) -> SyncResult<Vec<RemoteSubject>> {
        self.delay().await;
        let tables = self.tables.lock();
        tables.begin_list()?;
        Ok(tables
            .subjects
            .iter()
            .rev()
            .filter(|s| s.is_active && s.created_by.as_deref() == Some(owner))
            .cloned()
            .collect())
    }

    async fn create_subject(&self, subject: &NewRemoteSubject) -> SyncResult<RemoteSubject> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.begin_create()?;
        let row = subject_row(tables.next_id(), subject);
        tables.subjects.push(row.clone());
        Ok(row)
    }

    async fn update_subject(
        &self,
        id: &str,
        patch: &RemoteSubjectPatch,
    ) -> SyncResult<Option<RemoteSubject>> {
        self.delay().await;
        let mut tables = self.tables.lock();
        let Some(row) = tables.subjects.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        merge(&mut row.name, &patch.name);
        merge(&mut row.description, &patch.description);
        merge(&mut row.category, &patch.category);
        merge(&mut row.difficulty, &patch.difficulty);
        merge(&mut row.question_count, &patch.question_count);
        merge(&mut row.is_active, &patch.is_active);
        row.updated_at = Some(Utc::now());
        Ok(Some(row.clone()))
    }

    async fn delete_subject(&self, id: &str) -> SyncResult<bool> {
        self.delay().await;
        let mut tables = self.tables.lock();
        let before = tables.subjects.len();
        tables.subjects.retain(|s| s.id != id);
        Ok(tables.subjects.len() != before)
    }

    async fn list_questions(&self) -> SyncResult<Vec<RemoteQuestion>> {
        self.delay().await;
        let tables = self.tables.lock();
        tables.begin_list()?;
        Ok(tables
            .questions
            .iter()
            .rev()
            .filter(|q| q.is_active)
            .cloned()
            .collect())
    }

    async fn create_question(&self, question: &NewRemoteQuestion) -> SyncResult<RemoteQuestion> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.begin_create()?;
        let row = question_row(tables.next_id(), question);
        tables.questions.push(row.clone());
        Ok(row)
    }

    async fn update_question(
        &self,
        id: &str,
        patch: &RemoteQuestionPatch,
    ) -> SyncResult<Option<RemoteQuestion>> {
        self.delay().await;
        let mut tables = self.tables.lock();
        let Some(row) = tables.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        merge(&mut row.subject, &patch.subject);
        merge(&mut row.topic, &patch.topic);
        merge(&mut row.kind, &patch.kind);
        merge(&mut row.difficulty, &patch.difficulty);
        merge(&mut row.text, &patch.text);
        merge(&mut row.options, &patch.options);
        merge(&mut row.correct_answer, &patch.correct_answer);
        merge(&mut row.explanation, &patch.explanation);
        merge(&mut row.formula, &patch.formula);
        merge(&mut row.is_active, &patch.is_active);
        Ok(Some(row.clone()))
    }

    async fn delete_question(&self, id: &str) -> SyncResult<bool> {
        self.delay().await;
        let mut tables = self.tables.lock();
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        Ok(tables.questions.len() != before)
    }

    async fn ping(&self) -> SyncResult<()> {
        self.delay().await;
        self.tables.lock().begin_list()
    }
}
