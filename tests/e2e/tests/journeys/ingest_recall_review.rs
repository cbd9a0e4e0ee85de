//! End-to-end ingest -> recall -> review round trips against the public
//! `vestige-core` API, using a virtual clock so review-interval assertions
//! don't depend on wall-clock time.

use chrono::Utc;
use vestige_core::{IngestInput, RecallInput, Rating, SearchMode, Storage, VestigeEngine, VirtualClock};

fn engine() -> VestigeEngine<VirtualClock> {
    VestigeEngine::new(Storage::in_memory().unwrap(), VirtualClock::new(Utc::now()))
}

#[test]
fn ingest_then_recall_by_keyword() {
    let engine = engine();
    engine
        .ingest(IngestInput {
            content: "The mitochondria is the powerhouse of the cell".to_string(),
            node_type: "fact".to_string(),
            tags: vec!["biology".to_string()],
            ..Default::default()
        })
        .expect("ingest should succeed");

    let results = engine
        .recall(
            RecallInput {
                query: "mitochondria".to_string(),
                limit: 5,
                search_mode: SearchMode::Keyword,
                ..Default::default()
            },
            None,
        )
        .expect("recall should succeed");

    assert_eq!(results.len(), 1);
    assert!(results[0].node.content.contains("mitochondria"));
}

#[test]
fn first_review_of_new_card_matches_fsrs6_defaults() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "Rust ownership rules prevent data races".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(node.reps, 0);

    let reviewed = engine.review(&node.id, Rating::Good).unwrap();

    assert_eq!(reviewed.reps, 1);
    assert_eq!(reviewed.lapses, 0);
    assert!(reviewed.stability >= 0.1);
    assert!(reviewed.difficulty >= 1.0 && reviewed.difficulty <= 10.0);
    assert!(reviewed.next_review.unwrap() > Utc::now() - chrono::Duration::seconds(5));
}

#[test]
fn lapse_increments_counter_and_drops_stability() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "A fact that will be forgotten".to_string(),
            ..Default::default()
        })
        .unwrap();

    let after_good = engine.review(&node.id, Rating::Good).unwrap();
    let stability_before_lapse = after_good.stability;

    let after_lapse = engine.review(&node.id, Rating::Again).unwrap();

    assert_eq!(after_lapse.reps, 2);
    assert_eq!(after_lapse.lapses, 1);
    assert!(after_lapse.stability <= stability_before_lapse);
}

#[test]
fn review_of_unknown_node_is_not_found() {
    let engine = engine();
    let result = engine.review("does-not-exist", Rating::Good);
    assert!(result.is_err());
}

#[test]
fn recall_updates_last_accessed_and_reviews_accumulate_reps() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "Testing effect strengthens memory on each recall".to_string(),
            ..Default::default()
        })
        .unwrap();

    for _ in 0..3 {
        engine.review(&node.id, Rating::Good).unwrap();
    }

    let final_node = engine.storage().get_node(&node.id).unwrap().unwrap();
    assert_eq!(final_node.reps, 3);
}
