//! End-to-end sync passes against the in-process gateway.

use akilhane_core::LocalStore;
use akilhane_sync_engine::{
    MemoryGateway, NewRemoteQuestion, NewRemoteSubject, StaticIdentity, SyncConfig, SyncCounts,
    SyncCoordinator, SyncState,
};
use akilhane_testkit::{new_question, new_subject};
use std::sync::Arc;
use std::time::Duration;

const USER: &str = "user-1";

type Coordinator = SyncCoordinator<MemoryGateway, StaticIdentity>;

fn coordinator_with(gateway: MemoryGateway, identity: StaticIdentity) -> Coordinator {
    SyncCoordinator::new(
        Arc::new(LocalStore::in_memory()),
        Arc::new(gateway),
        Arc::new(identity),
        SyncConfig::new("https://example.supabase.co", "anon"),
    )
}

fn coordinator() -> Coordinator {
    coordinator_with(MemoryGateway::new(), StaticIdentity::signed_in(USER))
}

fn remote_subject(name: &str, owner: &str) -> NewRemoteSubject {
    NewRemoteSubject {
        name: name.to_string(),
        description: String::new(),
        category: "Fen".to_string(),
        difficulty: "Orta".to_string(),
        question_count: 0,
        created_by: owner.to_string(),
    }
}

fn remote_question(text: &str, subject: &str, options: &str, correct: &str) -> NewRemoteQuestion {
    NewRemoteQuestion {
        subject_id: format!("subject_{}_1", subject.to_lowercase()),
        subject: subject.to_string(),
        topic: "Genel".to_string(),
        kind: "multiple-choice".to_string(),
        difficulty: "Orta".to_string(),
        text: text.to_string(),
        options: options.to_string(),
        correct_answer: correct.to_string(),
        explanation: String::new(),
        formula: String::new(),
    }
}

#[tokio::test]
async fn single_local_subject_is_pushed() {
    let sync = coordinator();
    sync.store().add_subject(new_subject("Fizik")).unwrap();

    let outcome = sync.sync_local_to_cloud().await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.counts, SyncCounts::new(1, 0));
    let remote = sync.gateway().subjects();
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].name, "Fizik");
    assert_eq!(remote[0].created_by.as_deref(), Some(USER));
    assert_eq!(sync.state(), SyncState::Done);
}

#[tokio::test]
async fn pushed_records_are_linked_to_their_rows() {
    let sync = coordinator();
    let subject = sync.store().add_subject(new_subject("Fizik")).unwrap();
    let question = sync
        .store()
        .add_question(new_question("Işık hızı nedir?", "Fizik"))
        .unwrap();

    let outcome = sync.sync_local_to_cloud().await;
    assert_eq!(outcome.counts, SyncCounts::new(1, 1));

    let subject = sync.store().subject_by_id(&subject.id).unwrap().unwrap();
    assert_eq!(subject.remote_id.as_deref(), Some(sync.gateway().subjects()[0].id.as_str()));
    assert!(subject.synced_at.is_some());

    let question = sync.store().question_by_id(&question.id).unwrap().unwrap();
    let row = &sync.gateway().questions()[0];
    assert_eq!(question.remote_id.as_deref(), Some(row.id.as_str()));
    assert_eq!(row.correct_answer, "A");
    assert!(row.subject_id.starts_with("subject_fizik_"));
}

#[tokio::test]
async fn second_push_creates_nothing() {
    let sync = coordinator();
    sync.store().add_subject(new_subject("Fizik")).unwrap();
    sync.store().add_subject(new_subject("Kimya")).unwrap();
    sync.store()
        .add_question(new_question("Su formülü?", "Kimya"))
        .unwrap();

    let first = sync.sync_local_to_cloud().await;
    assert_eq!(first.counts, SyncCounts::new(2, 1));
    let calls = sync.gateway().create_calls();

    let second = sync.sync_local_to_cloud().await;
    assert!(second.success);
    assert_eq!(second.counts, SyncCounts::default());
    assert_eq!(sync.gateway().create_calls(), calls);
}

#[tokio::test]
async fn equivalent_subject_on_both_sides_stays_single() {
    let sync = coordinator();
    sync.store().add_subject(new_subject("Fizik")).unwrap();
    sync.gateway().seed_subject(&remote_subject("  fizik ", USER));

    let outcome = sync.full_sync().await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.counts, SyncCounts::default());
    assert_eq!(sync.store().subjects().unwrap().len(), 1);
    assert_eq!(sync.gateway().subjects().len(), 1);
}

#[tokio::test]
async fn failed_create_is_skipped() {
    let sync = coordinator();
    for name in ["Fizik", "Kimya", "Biyoloji", "Tarih", "Coğrafya"] {
        sync.store().add_subject(new_subject(name)).unwrap();
    }
    sync.gateway().fail_create(3);

    let outcome = sync.sync_local_to_cloud().await;

    assert!(outcome.success);
    assert_eq!(outcome.counts.subjects, 4);
    assert_eq!(sync.gateway().create_calls(), 5);
    let remote: Vec<String> = sync.gateway().subjects().into_iter().map(|s| s.name).collect();
    assert!(!remote.contains(&"Biyoloji".to_string()));

    let unlinked: Vec<String> = sync
        .store()
        .subjects()
        .unwrap()
        .into_iter()
        .filter(|s| s.remote_id.is_none())
        .map(|s| s.name)
        .collect();
    assert_eq!(unlinked, vec!["Biyoloji".to_string()]);

    // the next pass picks up only the one that failed
    let retry = sync.sync_local_to_cloud().await;
    assert_eq!(retry.counts.subjects, 1);
    assert_eq!(sync.gateway().subjects().len(), 5);
}

#[tokio::test]
async fn signed_out_passes_do_nothing() {
    let sync = coordinator_with(MemoryGateway::new(), StaticIdentity::signed_out());
    sync.store().add_subject(new_subject("Fizik")).unwrap();
    sync.gateway().seed_subject(&remote_subject("Kimya", USER));

    for outcome in [
        sync.sync_local_to_cloud().await,
        sync.sync_cloud_to_local().await,
        sync.full_sync().await,
    ] {
        assert!(!outcome.success);
        assert_eq!(outcome.counts, SyncCounts::default());
    }
    assert_eq!(sync.state(), SyncState::Unauthenticated);
    assert_eq!(sync.gateway().create_calls(), 0);
    assert_eq!(sync.store().subjects().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_pass_is_rejected() {
    let sync = coordinator_with(
        MemoryGateway::new().with_latency(Duration::from_millis(20)),
        StaticIdentity::signed_in(USER),
    );
    sync.store().add_subject(new_subject("Fizik")).unwrap();

    let (first, second) = tokio::join!(sync.full_sync(), sync.sync_local_to_cloud());

    assert!(first.success, "{}", first.message);
    assert!(!second.success);
    assert_eq!(second.message, "sync already in progress");
    assert_eq!(sync.gateway().subjects().len(), 1);
    assert!(!sync.is_syncing());

    // the flag is released once the first pass ends
    assert!(sync.sync_local_to_cloud().await.success);
}

#[tokio::test]
async fn pull_adds_missing_records_with_links() {
    let sync = coordinator();
    let subject = sync.gateway().seed_subject(&remote_subject("Matematik", USER));
    sync.gateway().seed_subject(&remote_subject("Başkasının", "user-2"));
    let question = sync.gateway().seed_question(&remote_question(
        "2 + 2 = ?",
        "Matematik",
        r#"[{"text":"4","isCorrect":true},{"text":"5","isCorrect":false}]"#,
        "4",
    ));

    let outcome = sync.sync_cloud_to_local().await;

    assert!(outcome.success);
    assert_eq!(outcome.counts, SyncCounts::new(1, 1));
    let subjects = sync.store().subjects().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].remote_id.as_deref(), Some(subject.id.as_str()));

    let questions = sync.store().questions_by_subject("matematik").unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].remote_id.as_deref(), Some(question.id.as_str()));
    assert_eq!(questions[0].correct_answer(), Some("4"));

    let again = sync.sync_cloud_to_local().await;
    assert_eq!(again.counts, SyncCounts::default());
}

#[tokio::test]
async fn malformed_remote_options_fall_back() {
    let sync = coordinator();
    sync.gateway()
        .seed_question(&remote_question("Pi kaçtır?", "Matematik", "{broken", "3.14"));

    let outcome = sync.sync_cloud_to_local().await;
    assert_eq!(outcome.counts.questions, 1);

    let question = &sync.store().questions().unwrap()[0];
    let texts: Vec<&str> = question.options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["3.14", "Seçenek B", "Seçenek C", "Seçenek D"]);
    assert_eq!(question.correct_answer(), Some("3.14"));
}

#[tokio::test]
async fn invalid_remote_question_is_skipped() {
    let sync = coordinator();
    sync.gateway().seed_question(&remote_question(
        "No answer",
        "Fizik",
        r#"[{"text":"a","isCorrect":false}]"#,
        "",
    ));
    sync.gateway()
        .seed_question(&remote_question("Valid", "Fizik", r#"[{"text":"a","isCorrect":true}]"#, "a"));

    let outcome = sync.sync_cloud_to_local().await;

    assert!(outcome.success);
    assert_eq!(outcome.counts.questions, 1);
    assert_eq!(sync.store().questions().unwrap()[0].text, "Valid");
}

#[tokio::test]
async fn full_sync_does_not_pull_back_pushed_records() {
    let sync = coordinator();
    sync.store().add_subject(new_subject("Fizik")).unwrap();
    sync.store()
        .add_question(new_question("Newton'un ikinci yasası?", "Fizik"))
        .unwrap();
    sync.gateway().seed_subject(&remote_subject("Kimya", USER));

    let outcome = sync.full_sync().await;

    assert!(outcome.success, "{}", outcome.message);
    // pushed Fizik and its question, pulled Kimya
    assert_eq!(outcome.counts, SyncCounts::new(2, 1));
    assert_eq!(sync.store().subjects().unwrap().len(), 2);
    assert_eq!(sync.store().questions().unwrap().len(), 1);
    assert_eq!(sync.gateway().subjects().len(), 2);
    assert_eq!(sync.gateway().questions().len(), 1);
}

#[tokio::test]
async fn status_reports_both_sides() {
    let sync = coordinator();
    let status = sync.sync_status().await;
    assert!(status.is_logged_in);
    assert!(!status.needs_sync);

    sync.gateway().seed_subject(&remote_subject("Fizik", USER));
    let status = sync.sync_status().await;
    assert!(status.has_cloud_data);
    assert!(!status.has_local_data);
    assert!(status.needs_sync);
    assert_eq!(status.cloud_counts, SyncCounts::new(1, 0));

    sync.gateway().fail_lists(true);
    let status = sync.sync_status().await;
    assert!(!status.is_logged_in);
    assert!(!status.needs_sync);
    assert_eq!(status.cloud_counts, SyncCounts::default());
}

#[tokio::test]
async fn status_when_signed_out() {
    let sync = coordinator_with(MemoryGateway::new(), StaticIdentity::signed_out());
    sync.store().add_question(new_question("q", "Fizik")).unwrap();

    let status = sync.sync_status().await;
    assert!(!status.is_logged_in);
    assert!(status.has_local_data);
    assert!(!status.needs_sync);
    assert_eq!(status.local_counts, SyncCounts::new(0, 1));
}

#[tokio::test]
async fn connection_check_reports_failures() {
    let sync = coordinator();
    assert!(sync.test_connection().await.success);

    sync.gateway().fail_lists(true);
    let check = sync.test_connection().await;
    assert!(!check.success);
    assert!(check.message.contains("injected list failure"));
}
