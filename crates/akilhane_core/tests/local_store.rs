//! Integration tests for the local store over real journals.

use akilhane_core::{
    CoreError, LocalStore, NewFlashcard, NewQuestion, NewSubject, NewTopicContent,
    QuestionOption, StoreConfig,
};
use akilhane_storage::{JournalStore, KeyValueStore};
use tempfile::TempDir;

fn question(text: &str, subject: &str) -> NewQuestion {
    NewQuestion {
        subject: subject.into(),
        topic: "Cebir".into(),
        kind: "multiple-choice".into(),
        difficulty: "Orta".into(),
        text: text.into(),
        options: vec![
            QuestionOption::new("4", true),
            QuestionOption::new("5", false),
        ],
        explanation: "Toplama".into(),
        ..NewQuestion::default()
    }
}

#[test]
fn flashcard_round_trip_by_subject() {
    let store = LocalStore::in_memory();
    let input = NewFlashcard {
        question: "Newton'un ikinci yasası?".into(),
        answer: "F = m·a".into(),
        explanation: "Kuvvet kütle çarpı ivme".into(),
        topic: "Dinamik".into(),
        difficulty: "Orta".into(),
        subject: "Fizik".into(),
    };

    let added = store.add_flashcard(input.clone()).unwrap();
    let found = store.flashcards_by_subject("Fizik").unwrap();

    assert_eq!(found.len(), 1);
    let card = &found[0];
    assert_eq!(card, &added);
    assert!(card.id.starts_with("flashcard_"));
    assert_eq!(card.question, input.question);
    assert_eq!(card.answer, input.answer);
    assert_eq!(card.explanation, input.explanation);
    assert_eq!(card.topic, input.topic);
    assert_eq!(card.difficulty, input.difficulty);
    assert_eq!(card.subject, input.subject);
    assert_eq!(card.review_count, 0);
    assert_eq!(card.confidence, 3);
    assert!(card.last_reviewed.is_none());
    assert!(card.next_review.is_none());
}

#[test]
fn subject_filter_ignores_case_and_whitespace() {
    let store = LocalStore::in_memory();
    store.add_question(question("2 + 2 = ?", "Matematik")).unwrap();
    store.add_question(question("3 + 3 = ?", "matematik ")).unwrap();
    store.add_question(question("g = ?", "Fizik")).unwrap();

    let ids = |subject: &str| {
        let mut ids: Vec<String> = store
            .questions_by_subject(subject)
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        ids.sort();
        ids
    };

    let reference = ids("Matematik");
    assert_eq!(reference.len(), 2);
    assert_eq!(ids("  Matematik "), reference);
    assert_eq!(ids("matematik"), reference);
    assert_eq!(ids("MATEMATIK"), reference);
}

#[test]
fn corrupted_payload_is_reported_not_swallowed() {
    let mut kv = JournalStore::in_memory();
    kv.put("questions", b"[{\"id\": ").unwrap();
    let store = LocalStore::with_backend(kv);

    let err = store.questions().unwrap_err();
    assert!(err.is_corruption());
    assert!(matches!(err, CoreError::Corrupted { ref key, .. } if key == "questions"));

    // Other collections stay readable.
    assert!(store.subjects().unwrap().is_empty());
    // Callers that prefer availability can still fall back to empty.
    assert!(store.questions().unwrap_or_default().is_empty());
}

#[test]
fn duplicate_ids_are_healed_on_read() {
    let mut kv = JournalStore::in_memory();
    let payload = r#"[
        {"id": "subject_1", "name": "Fizik"},
        {"id": "subject_2", "name": "Kimya"},
        {"id": "subject_1", "name": "Biyoloji"}
    ]"#;
    kv.put("subjects", payload.as_bytes()).unwrap();
    let store = LocalStore::with_backend(kv);

    let names: Vec<String> = store.subjects().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Fizik", "Kimya"]);

    let added = store.add_subject(NewSubject::named("Tarih")).unwrap();
    assert_ne!(added.id, "subject_1");
    assert_eq!(store.subjects().unwrap().len(), 3);
}

#[test]
fn file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path());

    let (question_id, topic_id) = {
        let store = LocalStore::open(&config).unwrap();
        store.add_subject(NewSubject::named("Matematik")).unwrap();
        let q = store.add_question(question("2 + 2 = ?", "Matematik")).unwrap();
        let t = store
            .add_topic_content(NewTopicContent {
                topic: "Türev".into(),
                subject: "Matematik".into(),
                content: "Anlık değişim oranı".into(),
                step_data: None,
            })
            .unwrap();
        store.flush().unwrap();
        (q.id, t.id)
    };

    let store = LocalStore::open(&config).unwrap();
    assert_eq!(store.subjects().unwrap().len(), 1);
    assert!(store.question_by_id(&question_id).unwrap().is_some());
    assert!(store.topic_content_by_id(&topic_id).unwrap().is_some());
    assert_eq!(store.data_dir(), Some(dir.path()));
}

#[test]
fn second_open_of_same_directory_is_locked() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path());

    let _first = LocalStore::open(&config).unwrap();
    assert!(matches!(
        LocalStore::open(&config),
        Err(CoreError::StoreLocked)
    ));
}

#[test]
fn automatic_compaction_bounds_journal_growth() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path())
        .compact_threshold(16 * 1024)
        .sync_on_write(false);
    let store = LocalStore::open(&config).unwrap();

    let subject = store.add_subject(NewSubject::named("Fizik")).unwrap();
    for i in 0..500u32 {
        let patch = akilhane_core::SubjectPatch {
            question_count: Some(i),
            description: Some("x".repeat(64)),
            ..Default::default()
        };
        assert!(store.update_subject(&subject.id, patch).unwrap());
    }

    let info = store.storage_info().unwrap();
    assert!(info.disk_bytes <= 16 * 1024 + 1024, "journal grew to {}", info.disk_bytes);
    assert_eq!(
        store.subject_by_id(&subject.id).unwrap().unwrap().question_count,
        499
    );
}

#[test]
fn large_live_set_is_not_rewritten_on_every_write() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path())
        .compact_threshold(4096)
        .sync_on_write(false);
    let store = LocalStore::open(&config).unwrap();
    let subject = store.add_subject(NewSubject::named("Fizik")).unwrap();

    let mut sizes = Vec::new();
    for i in 0..6u8 {
        let patch = akilhane_core::SubjectPatch {
            description: Some(char::from(b'a' + i).to_string().repeat(8 * 1024)),
            ..Default::default()
        };
        assert!(store.update_subject(&subject.id, patch).unwrap());
        sizes.push(store.storage_info().unwrap().disk_bytes);
    }

    let smallest = *sizes.iter().min().unwrap();
    let largest = *sizes.iter().max().unwrap();
    assert!(largest > smallest, "journal rewritten on every write: {sizes:?}");
    assert!(largest <= 3 * smallest, "journal grew to {largest}: {sizes:?}");
}

#[test]
fn writes_recover_from_a_corrupted_collection() {
    let mut kv = JournalStore::in_memory();
    kv.put("questions", b"[{\"id\": ").unwrap();
    let store = LocalStore::with_backend(kv);

    assert!(store.questions().unwrap_err().is_corruption());

    let added = store.add_question(question("2 + 2 = ?", "Matematik")).unwrap();
    assert_eq!(store.questions().unwrap(), vec![added]);
    // The unreadable bytes are kept aside, not counted as records.
    assert_eq!(store.storage_info().unwrap().questions, 1);
}

#[test]
fn writes_recover_from_a_corrupted_topic_partition() {
    let mut kv = JournalStore::in_memory();
    kv.put("topic-explainer:fizik", b"not json").unwrap();
    let store = LocalStore::with_backend(kv);

    assert!(store.topic_contents().is_err());

    let added = store
        .add_topic_content(NewTopicContent {
            topic: "Kuvvet".into(),
            subject: "Fizik".into(),
            content: "F = m a".into(),
            step_data: None,
        })
        .unwrap();
    assert_eq!(store.topic_contents().unwrap(), vec![added]);

    store.clear().unwrap();
    assert_eq!(store.storage_info().unwrap().payload_bytes, 0);
}
