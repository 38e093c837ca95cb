//! Row types of the remote `subjects` and `questions` tables.
//!
//! Rows serialize snake_case, matching the table columns. Nullable text
//! columns decode as empty strings.

use akilhane_core::{ContentKey, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// Accepts the options column either as JSON text or as a JSON value.
fn options_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A row of the remote `subjects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSubject {
    /// Row id.
    pub id: String,
    /// Subject name.
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Category.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Difficulty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
    /// Advertised question count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_count: u32,
    /// Whether the row is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Owner user id.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identity for RemoteSubject {
    fn content_key(&self) -> ContentKey {
        ContentKey::subject(&self.name)
    }

    fn remote_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// A row of the remote `questions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteQuestion {
    /// Row id.
    pub id: String,
    /// Subject foreign key.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_id: String,
    /// Subject name.
    pub subject: String,
    /// Topic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    /// Question type.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Difficulty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
    /// Question text.
    pub text: String,
    /// JSON-encoded option list.
    #[serde(default, deserialize_with = "options_text")]
    pub options: String,
    /// Text of the correct option.
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: String,
    /// Explanation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    /// Formula.
    #[serde(default, deserialize_with = "null_as_default")]
    pub formula: String,
    /// Whether the row is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identity for RemoteQuestion {
    fn content_key(&self) -> ContentKey {
        ContentKey::entry(&self.text, &self.subject)
    }

    fn remote_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Insert payload for the `subjects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteSubject {
    /// Subject name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Difficulty.
    pub difficulty: String,
    /// Advertised question count.
    pub question_count: u32,
    /// Owner user id.
    pub created_by: String,
}

/// Insert payload for the `questions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteQuestion {
    /// Subject foreign key.
    pub subject_id: String,
    /// Subject name.
    pub subject: String,
    /// Topic.
    pub topic: String,
    /// Question type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Difficulty.
    pub difficulty: String,
    /// Question text.
    pub text: String,
    /// JSON-encoded option list.
    pub options: String,
    /// Text of the correct option.
    pub correct_answer: String,
    /// Explanation.
    pub explanation: String,
    /// Formula.
    pub formula: String,
}

/// Partial update of a `subjects` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteSubjectPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New difficulty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// New question count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Partial update of a `questions` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteQuestionPatch {
    /// New subject name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// New topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// New type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// New difficulty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// New text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New JSON-encoded options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// New correct answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// New explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// New formula.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_postgrest_question_row() {
        let json = r#"{
            "id": "7b0c0f5e-1111-4c3a-9d7e-0a1b2c3d4e5f",
            "subject_id": "subject_fizik_1700000000000",
            "subject": "Fizik",
            "topic": null,
            "type": "multiple-choice",
            "difficulty": "Orta",
            "text": "g = ?",
            "options": "[{\"text\":\"9.8\",\"isCorrect\":true}]",
            "correct_answer": "9.8",
            "explanation": null,
            "formula": "",
            "is_active": true,
            "created_at": "2024-05-01T12:00:00+00:00"
        }"#;
        let row: RemoteQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(row.topic, "");
        assert_eq!(row.explanation, "");
        assert_eq!(row.kind, "multiple-choice");
        assert!(row.options.starts_with('['));
        assert!(row.created_at.is_some());
    }

    #[test]
    fn options_column_may_be_json() {
        let json = r#"{"id": "1", "subject": "Fizik", "text": "g = ?",
                       "options": [{"text": "9.8", "isCorrect": true}]}"#;
        let row: RemoteQuestion = serde_json::from_str(json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&row.options).unwrap();
        assert_eq!(parsed[0]["text"], "9.8");
        assert!(row.is_active);
    }

    #[test]
    fn patches_skip_absent_fields() {
        let patch = RemoteQuestionPatch {
            kind: Some("true-false".into()),
            ..RemoteQuestionPatch::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"type":"true-false"}"#
        );
    }

    #[test]
    fn remote_rows_are_identified_by_content_and_id() {
        let row = RemoteSubject {
            id: "r1".into(),
            name: " Fizik".into(),
            description: String::new(),
            category: String::new(),
            difficulty: String::new(),
            question_count: 0,
            is_active: true,
            created_by: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(row.content_key(), ContentKey::subject("fizik"));
        assert_eq!(row.remote_id(), Some("r1"));
    }
}
