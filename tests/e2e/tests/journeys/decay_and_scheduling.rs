//! Time-driven decay and review scheduling, exercised with a `VirtualClock`
//! so a simulated 60-day gap doesn't require sleeping.

use chrono::{Duration, Utc};
use vestige_core::{IngestInput, Rating, Storage, VestigeEngine, VirtualClock};

fn engine() -> VestigeEngine<VirtualClock> {
    VestigeEngine::new(Storage::in_memory().unwrap(), VirtualClock::new(Utc::now()))
}

#[test]
fn retrievability_decreases_monotonically_over_elapsed_time() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "Something learned once and never revisited".to_string(),
            ..Default::default()
        })
        .unwrap();
    let reviewed = engine.review(&node.id, Rating::Good).unwrap();

    let clock = engine.clock();
    let r0 = engine.storage().retrievability(&reviewed, clock.now());

    clock.advance(Duration::days(30));
    let r30 = engine.storage().retrievability(&reviewed, clock.now());

    clock.advance(Duration::days(30));
    let r60 = engine.storage().retrievability(&reviewed, clock.now());

    assert!(r30 < r0);
    assert!(r60 < r30);
}

#[test]
fn apply_decay_reports_nodes_due_for_review() {
    let engine = engine();
    for i in 0..3 {
        engine
            .ingest(IngestInput {
                content: format!("fact {}", i),
                ..Default::default()
            })
            .unwrap();
    }

    let result = engine.apply_decay().unwrap();
    assert_eq!(result.nodes_processed, 3);
    assert_eq!(result.newly_due, 3);
}

#[test]
fn importance_recency_is_non_increasing_across_ticks_without_retrieval() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "A memory nobody comes back for".to_string(),
            ..Default::default()
        })
        .unwrap();
    engine.review(&node.id, Rating::Good).unwrap();

    let clock = engine.clock();
    let before = engine.importance().apply_decay(clock);
    let recency_before = before
        .iter()
        .find(|(id, _)| id == &node.id)
        .map(|(_, score)| score.recency)
        .unwrap();

    clock.advance(Duration::days(7));
    let after = engine.importance().apply_decay(clock);
    let recency_after = after
        .iter()
        .find(|(id, _)| id == &node.id)
        .map(|(_, score)| score.recency)
        .unwrap();

    assert!(recency_after <= recency_before);
}

#[test]
fn well_learned_card_survives_a_lapse_with_reduced_but_positive_stability() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "A fact reviewed many times before lapsing".to_string(),
            ..Default::default()
        })
        .unwrap();

    let clock = engine.clock();
    let mut current = engine.review(&node.id, Rating::Good).unwrap();
    for _ in 0..5 {
        clock.advance(Duration::days(5));
        current = engine.review(&node.id, Rating::Good).unwrap();
    }
    let stability_before_lapse = current.stability;
    assert!(stability_before_lapse > 1.0);

    clock.advance(Duration::days(25));
    let lapsed = engine.review(&node.id, Rating::Again).unwrap();

    assert_eq!(lapsed.lapses, 1);
    assert!(lapsed.stability >= 0.01);
    assert!(lapsed.stability < stability_before_lapse);
}
