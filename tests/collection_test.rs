//! Adding and deleting cards through a study.

mod common;

use std::sync::Arc;

use wordcards::{CardDraft, Error, Filters, JsonStore, MemoryStore, Phase, Quality, SessionError, StorageError};

use common::{collection, study_over, today, FlakyStore};

#[tokio::test]
async fn duplicate_fronts_are_skipped() {
    let store = Arc::new(MemoryStore::from_collection(collection(&[("a", "dog", "pies", 1, 0)])));
    let mut study = study_over(store.clone());

    let report = study
        .add_cards(vec![CardDraft::new("Dog", "pies"), CardDraft::new("cat", "kot")])
        .await
        .unwrap();

    assert_eq!(report.inserted.len(), 1);
    assert_eq!(report.duplicate_count, 1);

    let saved = store.snapshot();
    let cat = saved.cards.iter().find(|c| c.front == "cat").unwrap();
    let progress = saved.progress.iter().find(|p| p.card_id == cat.id).unwrap();
    assert_eq!(report.inserted[0], cat.id);
    assert_eq!(progress.interval_days, 1);
    assert_eq!(progress.next_due_date, today());
    assert!(!progress.mastered);
}

#[tokio::test]
async fn only_duplicates_is_not_an_error() {
    let store = Arc::new(MemoryStore::from_collection(collection(&[("a", "dog", "pies", 1, 0)])));
    let mut study = study_over(store.clone());

    let report = study.add_cards(vec![CardDraft::new(" DOG ", "psy")]).await.unwrap();

    assert!(report.inserted.is_empty());
    assert_eq!(report.duplicate_count, 1);
    assert_eq!(store.snapshot().cards.len(), 1);
}

#[tokio::test]
async fn blank_side_rejects_the_whole_batch() {
    let store = Arc::new(MemoryStore::new());
    let mut study = study_over(store.clone());

    let err = study
        .add_cards(vec![CardDraft::new("cat", "kot"), CardDraft::new("dog", "  ")])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(store.snapshot().cards.is_empty());
}

#[tokio::test]
async fn adding_cards_marks_the_session_stale() {
    let store = Arc::new(MemoryStore::new());
    let mut study = study_over(store);
    study.load().await.unwrap();
    assert_eq!(study.session().phase(), Phase::Empty);

    study
        .add_cards(vec![CardDraft::new("cat", "kot").with_category("Animals")])
        .await
        .unwrap();
    assert!(study.session().is_stale());

    study.load().await.unwrap();
    assert_eq!(study.session().phase(), Phase::Presenting);
    assert_eq!(study.categories().await.unwrap(), vec!["Animals".to_string()]);
}

#[tokio::test]
async fn delete_removes_card_from_store_and_session() {
    let store = Arc::new(MemoryStore::from_collection(collection(&[
        ("a", "dog", "pies", 1, 0),
        ("b", "cat", "kot", 1, 0),
    ])));
    let mut study = study_over(store.clone());
    study.load().await.unwrap();

    study.delete_card("a").await.unwrap();

    assert_eq!(study.session().len(), 1);
    assert_eq!(study.session().current().unwrap().card.id, "b");
    let saved = store.snapshot();
    assert!(saved.cards.iter().all(|c| c.id != "a"));
    assert!(saved.progress.iter().all(|p| p.card_id != "a"));
}

#[tokio::test]
async fn half_finished_delete_is_reported() {
    let store = Arc::new(FlakyStore::with_collection(collection(&[("a", "dog", "pies", 1, 0)])));
    let mut study = study_over(store.clone());
    study.load().await.unwrap();

    FlakyStore::set(&store.fail_delete_card, true);
    let err = study.delete_card("a").await.unwrap_err();

    match err {
        Error::PartialDelete { card_id, source } => {
            assert_eq!(card_id, "a");
            assert!(matches!(source, StorageError::Write(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let saved = store.inner.snapshot();
    assert!(saved.progress.is_empty());
    assert_eq!(saved.cards.len(), 1);
    assert_eq!(study.session().phase(), Phase::Empty);
}

#[tokio::test]
async fn failed_first_delete_step_changes_nothing() {
    let store = Arc::new(FlakyStore::with_collection(collection(&[("a", "dog", "pies", 1, 0)])));
    let mut study = study_over(store.clone());
    study.load().await.unwrap();

    FlakyStore::set(&store.fail_delete_progress, true);
    let err = study.delete_card("a").await.unwrap_err();

    assert!(matches!(err, Error::Storage(StorageError::Write(_))));
    assert_eq!(study.session().len(), 1);
    assert_eq!(store.inner.snapshot().progress.len(), 1);
}

#[test]
fn no_delete_while_a_grade_is_pending() {
    // The service finishes grades before returning, so drive the session's
    // own grading half directly.
    let mut session = wordcards::ReviewSession::new(wordcards::InteractionMode::Flip);
    let items = vec![wordcards::ReviewItem {
        card: common::card("a", "dog", "pies", None),
        progress: common::progress("a", 1, 0),
    }];
    session.finish_loading(session.id(), items).unwrap();
    session.reveal().unwrap();
    let _ticket = session
        .begin_grade(Quality::Pass, &wordcards::Scheduler::default(), today())
        .unwrap();

    assert_eq!(session.remove_card("a"), Err(SessionError::GradeInFlight));
}

#[tokio::test]
async fn json_store_round_trip_through_a_study() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonStore::new(dir.path().to_path_buf()).unwrap());
    let mut study = study_over(store);

    study
        .add_cards(vec![
            CardDraft::new("dog", "pies").with_category("Animals"),
            CardDraft::new("run", "biegać").with_category("Verbs"),
        ])
        .await
        .unwrap();
    study.load().await.unwrap();
    study.reveal().unwrap();
    study.grade(Quality::Easy).await.unwrap();

    // A fresh handle on the same directory sees the grade.
    let reopened = Arc::new(JsonStore::new(dir.path().to_path_buf()).unwrap());
    let other = study_over(reopened);
    let all = other.browse(&Filters::all_cards()).await.unwrap();
    assert_eq!(all.len(), 2);
    let dog = all.iter().find(|i| i.card.front == "dog").unwrap();
    assert_eq!(dog.progress.interval_days, 7);

    let due = other.browse(&Filters::default()).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].card.front, "run");

    let verbs = other
        .browse(&Filters::all_cards().with_category(" verbs"))
        .await
        .unwrap();
    assert_eq!(verbs.len(), 1);
}
