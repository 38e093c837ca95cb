//! Conversions between local records and remote rows.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::remote::{NewRemoteQuestion, NewRemoteSubject, RemoteQuestion, RemoteSubject};
use akilhane_core::{NewQuestion, NewSubject, Question, QuestionOption, Subject};
use tracing::warn;

/// Placeholder texts for the wrong options of a question whose stored
/// options could not be parsed.
pub const FALLBACK_OPTIONS: [&str; 3] = ["Seçenek B", "Seçenek C", "Seçenek D"];

/// Derives the `subject_id` the remote schema requires from a subject name:
/// `subject_{name}_{millis}` with every character outside `[a-z0-9]` of the
/// lowercased name replaced by `_`.
pub fn synthetic_subject_id(name: &str, epoch_millis: i64) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("subject_{normalized}_{epoch_millis}")
}

/// Encodes options as the JSON text stored in the `options` column.
pub fn encode_options(options: &[QuestionOption]) -> SyncResult<String> {
    Ok(serde_json::to_string(options)?)
}

/// Decodes the `options` column, substituting four synthetic options built
/// around `correct_answer` when it is not a valid option list.
pub fn decode_options(raw: &str, correct_answer: &str) -> Vec<QuestionOption> {
    match serde_json::from_str::<Vec<QuestionOption>>(raw) {
        Ok(options) => options,
        Err(e) => {
            warn!(error = %e, "malformed options column, using fallback options");
            std::iter::once(QuestionOption::new(correct_answer, true))
                .chain(FALLBACK_OPTIONS.iter().map(|t| QuestionOption::new(*t, false)))
                .collect()
        }
    }
}

fn or_fallback(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Builds the insert payload for a local subject.
pub fn subject_to_remote(subject: &Subject, owner: &str) -> NewRemoteSubject {
    NewRemoteSubject {
        name: subject.name.clone(),
        description: subject.description.clone(),
        category: subject.category.clone(),
        difficulty: subject.difficulty.clone(),
        question_count: subject.question_count,
        created_by: owner.to_string(),
    }
}

/// Builds the insert payload for a local question.
pub fn question_to_remote(
    question: &Question,
    config: &SyncConfig,
    epoch_millis: i64,
) -> SyncResult<NewRemoteQuestion> {
    Ok(NewRemoteQuestion {
        subject_id: synthetic_subject_id(&question.subject, epoch_millis),
        subject: question.subject.clone(),
        topic: or_fallback(&question.topic, &config.fallback_topic),
        kind: or_fallback(&question.kind, &config.fallback_type),
        difficulty: or_fallback(&question.difficulty, &config.fallback_difficulty),
        text: question.text.clone(),
        options: encode_options(&question.options)?,
        correct_answer: question.correct_answer().unwrap_or_default().to_string(),
        explanation: question.explanation.clone(),
        formula: question.formula.clone(),
    })
}

/// Builds a local subject from a remote row, linked to that row.
pub fn subject_from_remote(row: &RemoteSubject) -> NewSubject {
    NewSubject {
        name: row.name.clone(),
        description: row.description.clone(),
        category: row.category.clone(),
        difficulty: row.difficulty.clone(),
        question_count: row.question_count,
        is_active: row.is_active,
        remote_id: Some(row.id.clone()),
    }
}

/// Builds a local question from a remote row, linked to that row.
pub fn question_from_remote(row: &RemoteQuestion) -> NewQuestion {
    NewQuestion {
        subject: row.subject.clone(),
        topic: row.topic.clone(),
        kind: row.kind.clone(),
        difficulty: row.difficulty.clone(),
        text: row.text.clone(),
        options: decode_options(&row.options, &row.correct_answer),
        explanation: row.explanation.clone(),
        formula: row.formula.clone(),
        remote_id: Some(row.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akilhane_core::LocalStore;

    #[test]
    fn synthetic_subject_ids() {
        assert_eq!(
            synthetic_subject_id("Fizik", 1_700_000_000_000),
            "subject_fizik_1700000000000"
        );
        assert_eq!(
            synthetic_subject_id("Veri Yapıları 2", 5),
            "subject_veri_yap_lar__2_5"
        );
    }

    #[test]
    fn malformed_options_fall_back() {
        let options = decode_options("not json", "42");
        let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["42", "Seçenek B", "Seçenek C", "Seçenek D"]);
        assert!(options[0].is_correct);
        assert!(options[1..].iter().all(|o| !o.is_correct));
    }

    #[test]
    fn options_round_trip_through_column_text() {
        let options = vec![QuestionOption::new("9.8", true), QuestionOption::new("10", false)];
        let raw = encode_options(&options).unwrap();
        assert!(raw.contains("\"isCorrect\":true"));
        assert_eq!(decode_options(&raw, "ignored"), options);
    }

    #[test]
    fn pushed_question_gets_fallbacks_and_correct_answer() {
        let store = LocalStore::in_memory();
        let question = store
            .add_question(NewQuestion {
                subject: "Fizik".into(),
                text: "g = ?".into(),
                options: vec![QuestionOption::new("10", false), QuestionOption::new("9.8", true)],
                ..NewQuestion::default()
            })
            .unwrap();

        let row = question_to_remote(&question, &SyncConfig::default(), 7).unwrap();
        assert_eq!(row.subject_id, "subject_fizik_7");
        assert_eq!(row.topic, "Genel");
        assert_eq!(row.kind, "multiple-choice");
        assert_eq!(row.difficulty, "Orta");
        assert_eq!(row.correct_answer, "9.8");
    }

    #[test]
    fn question_without_correct_option_has_empty_answer() {
        let store = LocalStore::in_memory();
        let question = store
            .add_question(NewQuestion {
                subject: "Fizik".into(),
                text: "open ended".into(),
                ..NewQuestion::default()
            })
            .unwrap();
        let row = question_to_remote(&question, &SyncConfig::default(), 7).unwrap();
        assert_eq!(row.correct_answer, "");
        assert_eq!(row.options, "[]");
    }
}
