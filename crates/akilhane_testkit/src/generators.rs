//! Property-based test generators using proptest.
//!
//! Subject names are drawn from a small pool and then re-cased and padded,
//! so generated data exercises the normalized comparisons.

use akilhane_core::{
    FlashcardPatch, LocalStore, NewFlashcard, NewQuestion, NewSubject, NewTopicContent,
    QuestionOption, QuestionPatch, SubjectPatch, TopicContentPatch,
};
use chrono::Utc;
use proptest::prelude::*;

const SUBJECTS: &[&str] = &["Matematik", "Fizik", "Kimya", "Biyoloji", "Tarih"];

/// Strategy for subject names with random casing and padding.
pub fn subject_name_strategy() -> impl Strategy<Value = String> {
    (0..SUBJECTS.len(), 0..3u8, 0..3usize).prop_map(|(i, casing, pad)| {
        let name = match casing {
            0 => SUBJECTS[i].to_string(),
            1 => SUBJECTS[i].to_lowercase(),
            _ => SUBJECTS[i].to_uppercase(),
        };
        format!("{}{name}{}", " ".repeat(pad), " ".repeat(pad % 2))
    })
}

/// Strategy for short question texts.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9 +=?]{1,24}").expect("Invalid regex")
}

/// Strategy for valid answer option lists (empty, or with a correct option).
pub fn options_strategy() -> impl Strategy<Value = Vec<QuestionOption>> {
    prop_oneof![
        Just(Vec::new()),
        (prop::collection::vec("[a-z]{1,8}", 2..5), any::<prop::sample::Index>()).prop_map(
            |(texts, correct)| {
                let correct = correct.index(texts.len());
                texts
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| QuestionOption::new(text, i == correct))
                    .collect()
            }
        ),
    ]
}

/// Strategy for questions that pass validation.
pub fn new_question_strategy() -> impl Strategy<Value = NewQuestion> {
    (subject_name_strategy(), text_strategy(), options_strategy()).prop_map(
        |(subject, text, options)| NewQuestion {
            subject,
            topic: "Genel".to_string(),
            kind: "multiple-choice".to_string(),
            difficulty: "Orta".to_string(),
            text,
            options,
            ..NewQuestion::default()
        },
    )
}

/// Strategy for subjects.
pub fn new_subject_strategy() -> impl Strategy<Value = NewSubject> {
    subject_name_strategy().prop_map(NewSubject::named)
}

/// Strategy for flashcards.
pub fn new_flashcard_strategy() -> impl Strategy<Value = NewFlashcard> {
    (subject_name_strategy(), text_strategy()).prop_map(|(subject, question)| NewFlashcard {
        answer: format!("{question}!"),
        question,
        subject,
        ..NewFlashcard::default()
    })
}

/// Strategy for topic content.
pub fn new_topic_strategy() -> impl Strategy<Value = NewTopicContent> {
    (subject_name_strategy(), text_strategy()).prop_map(|(subject, topic)| NewTopicContent {
        content: format!("{topic} explained"),
        topic,
        subject,
        step_data: None,
    })
}

/// One mutation of a local store.
///
/// Indices select an existing record modulo the collection size.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Add a question.
    AddQuestion(NewQuestion),
    /// Change the text of an existing question.
    UpdateQuestion(usize, String),
    /// Delete an existing question.
    DeleteQuestion(usize),
    /// Add a subject.
    AddSubject(NewSubject),
    /// Rename an existing subject.
    RenameSubject(usize, String),
    /// Delete an existing subject.
    DeleteSubject(usize),
    /// Add a flashcard.
    AddFlashcard(NewFlashcard),
    /// Change the answer of an existing flashcard.
    UpdateFlashcard(usize, String),
    /// Review an existing flashcard.
    ReviewFlashcard(usize, u8),
    /// Delete an existing flashcard.
    DeleteFlashcard(usize),
    /// Add topic content.
    AddTopic(NewTopicContent),
    /// Move existing topic content to another subject.
    MoveTopic(usize, String),
    /// Delete existing topic content.
    DeleteTopic(usize),
}

/// Strategy for store mutations.
pub fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    let questions = prop_oneof![
        3 => new_question_strategy().prop_map(StoreOp::AddQuestion),
        1 => (any::<usize>(), text_strategy()).prop_map(|(i, t)| StoreOp::UpdateQuestion(i, t)),
        1 => any::<usize>().prop_map(StoreOp::DeleteQuestion),
    ];
    let subjects = prop_oneof![
        2 => new_subject_strategy().prop_map(StoreOp::AddSubject),
        1 => (any::<usize>(), subject_name_strategy())
            .prop_map(|(i, n)| StoreOp::RenameSubject(i, n)),
        1 => any::<usize>().prop_map(StoreOp::DeleteSubject),
    ];
    let flashcards = prop_oneof![
        3 => new_flashcard_strategy().prop_map(StoreOp::AddFlashcard),
        1 => (any::<usize>(), text_strategy()).prop_map(|(i, t)| StoreOp::UpdateFlashcard(i, t)),
        1 => (any::<usize>(), 1..=5u8).prop_map(|(i, c)| StoreOp::ReviewFlashcard(i, c)),
        1 => any::<usize>().prop_map(StoreOp::DeleteFlashcard),
    ];
    let topics = prop_oneof![
        2 => new_topic_strategy().prop_map(StoreOp::AddTopic),
        1 => (any::<usize>(), subject_name_strategy()).prop_map(|(i, s)| StoreOp::MoveTopic(i, s)),
        1 => any::<usize>().prop_map(StoreOp::DeleteTopic),
    ];
    prop_oneof![questions, subjects, flashcards, topics]
}

fn pick<T>(records: Vec<T>, index: usize) -> Option<T> {
    if records.is_empty() {
        return None;
    }
    let len = records.len();
    records.into_iter().nth(index % len)
}

/// Applies `op` to `store`, panicking on any store error.
pub fn apply_op(store: &LocalStore, op: StoreOp) {
    match op {
        StoreOp::AddQuestion(new) => {
            store.add_question(new).expect("add question");
        }
        StoreOp::UpdateQuestion(i, text) => {
            if let Some(q) = pick(store.questions().expect("questions"), i) {
                let patch = QuestionPatch {
                    text: Some(text),
                    ..QuestionPatch::default()
                };
                assert!(store.update_question(&q.id, patch).expect("update question"));
            }
        }
        StoreOp::DeleteQuestion(i) => {
            if let Some(q) = pick(store.questions().expect("questions"), i) {
                assert!(store.delete_question(&q.id).expect("delete question"));
            }
        }
        StoreOp::AddSubject(new) => {
            store.add_subject(new).expect("add subject");
        }
        StoreOp::RenameSubject(i, name) => {
            if let Some(s) = pick(store.subjects().expect("subjects"), i) {
                let patch = SubjectPatch {
                    name: Some(name),
                    ..SubjectPatch::default()
                };
                assert!(store.update_subject(&s.id, patch).expect("update subject"));
            }
        }
        StoreOp::DeleteSubject(i) => {
            if let Some(s) = pick(store.subjects().expect("subjects"), i) {
                assert!(store.delete_subject(&s.id).expect("delete subject"));
            }
        }
        StoreOp::AddFlashcard(new) => {
            store.add_flashcard(new).expect("add flashcard");
        }
        StoreOp::UpdateFlashcard(i, answer) => {
            if let Some(f) = pick(store.flashcards().expect("flashcards"), i) {
                let patch = FlashcardPatch {
                    answer: Some(answer),
                    ..FlashcardPatch::default()
                };
                assert!(store.update_flashcard(&f.id, patch).expect("update flashcard"));
            }
        }
        StoreOp::ReviewFlashcard(i, confidence) => {
            if let Some(f) = pick(store.flashcards().expect("flashcards"), i) {
                store
                    .review_flashcard(&f.id, confidence, Utc::now())
                    .expect("review flashcard");
            }
        }
        StoreOp::DeleteFlashcard(i) => {
            if let Some(f) = pick(store.flashcards().expect("flashcards"), i) {
                assert!(store.delete_flashcard(&f.id).expect("delete flashcard"));
            }
        }
        StoreOp::AddTopic(new) => {
            store.add_topic_content(new).expect("add topic");
        }
        StoreOp::MoveTopic(i, subject) => {
            if let Some(t) = pick(store.topic_contents().expect("topics"), i) {
                let patch = TopicContentPatch {
                    subject: Some(subject),
                    ..TopicContentPatch::default()
                };
                assert!(store.update_topic_content(&t.id, patch).expect("update topic"));
            }
        }
        StoreOp::DeleteTopic(i) => {
            if let Some(t) = pick(store.topic_contents().expect("topics"), i) {
                assert!(store.delete_topic_content(&t.id).expect("delete topic"));
            }
        }
    }
}
