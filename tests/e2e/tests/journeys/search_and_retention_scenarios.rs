//! Scenario-style journeys built on the shared test harness: seeded
//! databases in varied review/temporal states, recalled and inspected
//! through the public `Storage`/`TestDataFactory` surface.

use chrono::Utc;
use vestige_e2e_tests::harness::TestDatabaseManager;
use vestige_e2e_tests::mocks::TestDataFactory;

#[test]
fn seeded_retention_states_have_distinct_review_histories() {
    let mut db = TestDatabaseManager::new_temp();
    let ids = db.seed_with_retention_states();
    assert_eq!(ids.len(), 3);

    let new_node = db.storage.get_node(&ids[0]).unwrap().unwrap();
    assert_eq!(new_node.reps, 0);

    let learned = db.storage.get_node(&ids[1]).unwrap().unwrap();
    assert_eq!(learned.reps, 3);
    assert_eq!(learned.lapses, 0);

    let struggling = db.storage.get_node(&ids[2]).unwrap().unwrap();
    assert_eq!(struggling.reps, 3);
    assert_eq!(struggling.lapses, 2);
}

#[test]
fn search_scenario_partitions_content_by_category() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_search_scenario(&db.storage);

    assert_eq!(scenario.metadata.get("programming_count").unwrap(), "3");
    assert_eq!(scenario.metadata.get("science_count").unwrap(), "3");
    assert_eq!(scenario.metadata.get("recipe_count").unwrap(), "2");
    assert_eq!(scenario.node_ids.len(), 8);

    let stats = db.storage.get_stats(Utc::now()).unwrap();
    assert_eq!(stats.total_nodes, 8);
}

#[test]
fn temporal_scenario_round_trips_every_validity_window() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_temporal_scenario(&db.storage);

    let current = db
        .storage
        .get_node(scenario.metadata.get("current").unwrap())
        .unwrap()
        .unwrap();
    assert!(current.is_valid_at(Utc::now()));

    let expired = db
        .storage
        .get_node(scenario.metadata.get("expired").unwrap())
        .unwrap()
        .unwrap();
    assert!(!expired.is_valid_at(Utc::now()));

    let always_valid = db
        .storage
        .get_node(scenario.metadata.get("always_valid").unwrap())
        .unwrap()
        .unwrap();
    assert!(always_valid.valid_from.is_none());
    assert!(always_valid.valid_until.is_none());
}

#[test]
fn clearing_a_seeded_database_removes_every_node() {
    let mut db = TestDatabaseManager::new_temp();
    db.seed_diverse(4);
    assert_eq!(db.node_count(), 20);

    db.clear();
    assert!(db.is_empty());
}
