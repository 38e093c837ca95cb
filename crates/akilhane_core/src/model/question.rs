use super::apply;
use crate::collection::Record;
use crate::error::{CoreError, CoreResult};
use crate::identity::{ContentKey, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    /// Option text.
    pub text: String,
    /// Whether this option is a correct answer.
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    /// Creates an option.
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// An exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Local identifier.
    pub id: String,
    /// Subject name (loose reference).
    pub subject: String,
    /// Topic within the subject.
    #[serde(default)]
    pub topic: String,
    /// Question type, e.g. `multiple-choice`, `true-false`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: String,
    /// Question text.
    pub text: String,
    /// Answer options.
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// Explanation of the answer.
    #[serde(default)]
    pub explanation: String,
    /// Optional formula.
    #[serde(default)]
    pub formula: String,
    /// Id of the remote row this question was pushed to or pulled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// When the remote link was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Returns the text of the first correct option, if any.
    pub fn correct_answer(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| o.text.as_str())
    }

    /// Checks the question's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if options are present but none
    /// is marked correct.
    pub fn validate(&self) -> CoreResult<()> {
        validate_options(&self.options)
    }
}

fn validate_options(options: &[QuestionOption]) -> CoreResult<()> {
    if !options.is_empty() && !options.iter().any(|o| o.is_correct) {
        return Err(CoreError::invalid_record(
            Question::KIND,
            "at least one option must be correct",
        ));
    }
    Ok(())
}

impl Record for Question {
    const KIND: &'static str = "question";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identity for Question {
    fn content_key(&self) -> ContentKey {
        ContentKey::entry(&self.text, &self.subject)
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
}

/// Fields of a question to be added; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewQuestion {
    /// Subject name.
    pub subject: String,
    /// Topic within the subject.
    pub topic: String,
    /// Question type.
    pub kind: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Question text.
    pub text: String,
    /// Answer options.
    pub options: Vec<QuestionOption>,
    /// Explanation of the answer.
    pub explanation: String,
    /// Optional formula.
    pub formula: String,
    /// Remote row this question comes from, when pulled from the remote store.
    pub remote_id: Option<String>,
}

impl NewQuestion {
    pub(crate) fn into_question(self, id: String) -> Question {
        let synced_at = self.remote_id.as_ref().map(|_| Utc::now());
        Question {
            id,
            subject: self.subject,
            topic: self.topic,
            kind: self.kind,
            difficulty: self.difficulty,
            text: self.text,
            options: self.options,
            explanation: self.explanation,
            formula: self.formula,
            remote_id: self.remote_id,
            synced_at,
        }
    }
}

impl Identity for NewQuestion {
    fn content_key(&self) -> ContentKey {
        ContentKey::entry(&self.text, &self.subject)
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
}

/// Partial update of a question. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    /// New subject name.
    pub subject: Option<String>,
    /// New topic.
    pub topic: Option<String>,
    /// New question type.
    pub kind: Option<String>,
    /// New difficulty.
    pub difficulty: Option<String>,
    /// New text.
    pub text: Option<String>,
    /// New options.
    pub options: Option<Vec<QuestionOption>>,
    /// New explanation.
    pub explanation: Option<String>,
    /// New formula.
    pub formula: Option<String>,
}

impl QuestionPatch {
    pub(crate) fn apply_to(self, question: &mut Question) {
        apply(&mut question.subject, self.subject);
        apply(&mut question.topic, self.topic);
        apply(&mut question.kind, self.kind);
        apply(&mut question.difficulty, self.difficulty);
        apply(&mut question.text, self.text);
        apply(&mut question.options, self.options);
        apply(&mut question.explanation, self.explanation);
        apply(&mut question.formula, self.formula);
    }
}
