//! Bi-temporal validity windows and the supersede chain that lets a fact be
//! corrected without destroying its history.

use chrono::{Duration, Utc};
use vestige_core::{EdgeType, IngestInput, RecallInput, SearchMode, Storage, VestigeEngine, VirtualClock};

fn engine() -> VestigeEngine<VirtualClock> {
    VestigeEngine::new(Storage::in_memory().unwrap(), VirtualClock::new(Utc::now()))
}

#[test]
fn expired_node_is_excluded_when_recalling_at_a_fixed_point_in_time() {
    let engine = engine();
    let now = engine.clock().now();

    engine
        .ingest(IngestInput {
            content: "A fact only true last quarter".to_string(),
            valid_from: Some(now - Duration::days(60)),
            valid_until: Some(now - Duration::days(30)),
            ..Default::default()
        })
        .unwrap();

    let results = engine
        .recall(
            RecallInput {
                query: "fact".to_string(),
                search_mode: SearchMode::Keyword,
                valid_at: Some(now),
                ..Default::default()
            },
            None,
        )
        .unwrap();

    assert!(results.is_empty());
}

#[test]
fn node_with_no_validity_window_is_always_valid() {
    let engine = engine();
    let node = engine
        .ingest(IngestInput {
            content: "A fact with no expiry".to_string(),
            ..Default::default()
        })
        .unwrap();

    assert!(node.is_valid_at(Utc::now()));
    assert!(node.is_valid_at(Utc::now() + Duration::days(3650)));
}

#[test]
fn supersede_marks_old_node_contradicted_and_links_the_new_one() {
    let storage = Storage::in_memory().unwrap();
    let now = Utc::now();

    let original = storage
        .ingest(
            IngestInput {
                content: "Paris is capital of France".to_string(),
                ..Default::default()
            },
            now,
        )
        .unwrap();

    let corrected = storage
        .ingest(
            IngestInput {
                content: "Paris is capital city of France".to_string(),
                supersedes: Some(original.id.clone()),
                ..Default::default()
            },
            now,
        )
        .unwrap();

    let reloaded_original = storage.get_node(&original.id).unwrap().unwrap();
    assert!(reloaded_original.is_contradicted);
    assert!(reloaded_original.contradiction_ids.contains(&corrected.id));

    let edges = storage.get_edges_for_node(&corrected.id).unwrap();
    assert!(edges
        .iter()
        .any(|e| e.edge_type == EdgeType::Supersedes && e.target_id == original.id));
}
