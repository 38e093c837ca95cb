//! Data model for stored study content.
//!
//! Local records serialize camelCase, matching the JSON collections the
//! application has always written. Optional bookkeeping fields are omitted
//! from the JSON when absent.

mod flashcard;
mod question;
mod subject;
mod topic;

pub use flashcard::{Flashcard, FlashcardPatch, NewFlashcard};
pub use question::{NewQuestion, Question, QuestionOption, QuestionPatch};
pub use subject::{NewSubject, Subject, SubjectPatch};
pub use topic::{NewTopicContent, TopicContent, TopicContentPatch, TopicStep};

/// Overwrites `target` when the patch carries a value.
pub(crate) fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
