use super::apply;
use crate::collection::Record;
use crate::identity::{ContentKey, Identity};
use crate::review::DEFAULT_CONFIDENCE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_confidence() -> u8 {
    DEFAULT_CONFIDENCE
}

/// A flashcard with its spaced-repetition progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Local identifier.
    pub id: String,
    /// Front side.
    pub question: String,
    /// Back side.
    pub answer: String,
    /// Explanation.
    #[serde(default)]
    pub explanation: String,
    /// Topic.
    #[serde(default)]
    pub topic: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: String,
    /// Subject name.
    pub subject: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Number of reviews so far.
    #[serde(default)]
    pub review_count: u32,
    /// Last review confidence (1..=5).
    #[serde(default = "default_confidence")]
    pub confidence: u8,
    /// Last review time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Next scheduled review, derived from the review history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl Flashcard {
    /// Returns true if the card should be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map_or(true, |at| at <= now)
    }
}

impl Record for Flashcard {
    const KIND: &'static str = "flashcard";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identity for Flashcard {
    fn content_key(&self) -> ContentKey {
        ContentKey::entry(&self.question, &self.subject)
    }
}

/// Fields of a flashcard to be added. Progress fields start at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFlashcard {
    /// Front side.
    pub question: String,
    /// Back side.
    pub answer: String,
    /// Explanation.
    pub explanation: String,
    /// Topic.
    pub topic: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Subject name.
    pub subject: String,
}

impl NewFlashcard {
    pub(crate) fn into_flashcard(self, id: String, now: DateTime<Utc>) -> Flashcard {
        Flashcard {
            id,
            question: self.question,
            answer: self.answer,
            explanation: self.explanation,
            topic: self.topic,
            difficulty: self.difficulty,
            subject: self.subject,
            created_at: now,
            review_count: 0,
            confidence: DEFAULT_CONFIDENCE,
            last_reviewed: None,
            next_review: None,
        }
    }
}

impl Identity for NewFlashcard {
    fn content_key(&self) -> ContentKey {
        ContentKey::entry(&self.question, &self.subject)
    }
}

/// Partial update of a flashcard's content.
///
/// Progress is changed only through reviews and resets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardPatch {
    /// New front side.
    pub question: Option<String>,
    /// New back side.
    pub answer: Option<String>,
    /// New explanation.
    pub explanation: Option<String>,
    /// New topic.
    pub topic: Option<String>,
    /// New difficulty.
    pub difficulty: Option<String>,
    /// New subject.
    pub subject: Option<String>,
}

impl FlashcardPatch {
    pub(crate) fn apply_to(self, card: &mut Flashcard) {
        apply(&mut card.question, self.question);
        apply(&mut card.answer, self.answer);
        apply(&mut card.explanation, self.explanation);
        apply(&mut card.topic, self.topic);
        apply(&mut card.difficulty, self.difficulty);
        apply(&mut card.subject, self.subject);
    }
}
