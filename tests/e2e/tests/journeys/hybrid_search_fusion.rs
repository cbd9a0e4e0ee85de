//! Reciprocal rank fusion across keyword and vector result orderings, and
//! the same fusion exercised end-to-end through `VestigeEngine::recall`.

use chrono::Utc;
use vestige_core::{
    IngestInput, MockEmbedder, RecallInput, SearchMode, Storage, VestigeEngine, VirtualClock,
    reciprocal_rank_fusion,
};

#[test]
fn node_appearing_at_rank_two_in_both_lists_wins() {
    // Keyword ranking: [A, B, C]; vector ranking: [C, B, A].
    let keyword = vec![
        ("a".to_string(), 0.9),
        ("b".to_string(), 0.8),
        ("c".to_string(), 0.7),
    ];
    let vector = vec![
        ("c".to_string(), 0.9),
        ("b".to_string(), 0.8),
        ("a".to_string(), 0.7),
    ];

    let fused = reciprocal_rank_fusion(&keyword, &vector, 60.0, 0.5, 0.5);

    assert_eq!(fused[0].0, "b");

    let a_score = fused.iter().find(|(k, _)| k == "a").unwrap().1;
    let c_score = fused.iter().find(|(k, _)| k == "c").unwrap().1;
    assert!((a_score - c_score).abs() < 1e-6);
}

#[test]
fn item_absent_from_one_list_still_contributes_its_single_score() {
    let keyword = vec![("only-keyword".to_string(), 1.0)];
    let vector: Vec<(String, f32)> = vec![];

    let fused = reciprocal_rank_fusion(&keyword, &vector, 60.0, 0.5, 0.5);

    assert_eq!(fused.len(), 1);
    assert_eq!(fused[0].0, "only-keyword");
}

fn engine_with_embedder() -> VestigeEngine<VirtualClock> {
    VestigeEngine::new(Storage::in_memory().unwrap(), VirtualClock::new(Utc::now()))
        .with_embedder(MockEmbedder::new())
}

#[test]
fn recall_fuses_keyword_and_semantic_hits_via_rrf() {
    let engine = engine_with_embedder();
    let node = engine
        .ingest(IngestInput {
            content: "Rust ownership rules prevent data races".to_string(),
            ..Default::default()
        })
        .unwrap();

    let results = engine
        .recall(
            RecallInput {
                query: "ownership data races".to_string(),
                limit: 5,
                search_mode: SearchMode::Hybrid,
                ..Default::default()
            },
            None,
        )
        .unwrap();

    assert!(results.iter().any(|r| r.node.id == node.id));
}

#[test]
fn every_returned_node_has_last_accessed_and_access_count_bumped_by_recall() {
    let engine = engine_with_embedder();
    let node = engine
        .ingest(IngestInput {
            content: "The mitochondria is the powerhouse of the cell".to_string(),
            ..Default::default()
        })
        .unwrap();
    let before_access_count = node.access_count;

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
        .unwrap();
    assert_eq!(results.len(), 1);

    let after = engine.storage().get_node(&node.id).unwrap().unwrap();
    assert_eq!(after.access_count, before_access_count + 1);
    assert!(after.last_accessed > node.last_accessed);

    let importance = engine.importance().get_or_create(&node.id, 0.3, engine.clock());
    assert!(importance.usage > 0.1);
}
