use super::apply;
use crate::collection::Record;
use crate::identity::{ContentKey, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A subject (course) that questions, flashcards and topic content refer
/// to by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Local identifier.
    pub id: String,
    /// Display name; the dedup key.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: String,
    /// Number of questions the subject advertises.
    #[serde(default)]
    pub question_count: u32,
    /// Whether the subject is shown.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Id of the linked remote row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// When the remote link was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl Record for Subject {
    const KIND: &'static str = "subject";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identity for Subject {
    fn content_key(&self) -> ContentKey {
        ContentKey::subject(&self.name)
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
}

/// Fields of a subject to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Advertised question count.
    pub question_count: u32,
    /// Whether the subject is shown.
    pub is_active: bool,
    /// Remote row this subject comes from.
    pub remote_id: Option<String>,
}

impl Default for NewSubject {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            difficulty: String::new(),
            question_count: 0,
            is_active: true,
            remote_id: None,
        }
    }
}

impl NewSubject {
    /// Creates an active subject with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_subject(self, id: String) -> Subject {
        let synced_at = self.remote_id.as_ref().map(|_| Utc::now());
        Subject {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            question_count: self.question_count,
            is_active: self.is_active,
            remote_id: self.remote_id,
            synced_at,
        }
    }
}

impl Identity for NewSubject {
    fn content_key(&self) -> ContentKey {
        ContentKey::subject(&self.name)
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
}

/// Partial update of a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    /// New name. Renaming does not touch records that refer to the old name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New difficulty.
    pub difficulty: Option<String>,
    /// New question count.
    pub question_count: Option<u32>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl SubjectPatch {
    pub(crate) fn apply_to(self, subject: &mut Subject) {
        apply(&mut subject.name, self.name);
        apply(&mut subject.description, self.description);
        apply(&mut subject.category, self.category);
        apply(&mut subject.difficulty, self.difficulty);
        apply(&mut subject.question_count, self.question_count);
        apply(&mut subject.is_active, self.is_active);
    }
}
