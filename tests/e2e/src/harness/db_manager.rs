//! Test Database Manager
//!
//! Provides isolated database instances for journey tests: temporary
//! databases that clean up on drop, pre-seeded with nodes in various
//! learning/temporal states.

use chrono::Utc;
use std::path::PathBuf;
use tempfile::TempDir;
use vestige_core::{IngestInput, Rating, Storage};

/// Manager for test databases.
///
/// Creates an isolated `Storage` per test to prevent interference between
/// tests running in parallel. The backing temp directory is deleted when
/// the manager is dropped.
pub struct TestDatabaseManager {
    pub storage: Storage,
    _temp_dir: Option<TempDir>,
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("test_vestige.db");
        let storage = Storage::new(Some(db_path.clone())).expect("failed to create test storage");

        Self {
            storage,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path. Not deleted on drop.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("failed to create test storage");
        Self {
            storage,
            _temp_dir: None,
            db_path: path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn node_count(&self) -> i64 {
        self.storage
            .get_stats(Utc::now())
            .map(|s| s.total_nodes)
            .unwrap_or(0)
    }

    /// Seed the database with a specified number of plain fact nodes.
    pub fn seed_nodes(&mut self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let input = IngestInput {
                content: format!("Test memory content {}", i),
                tags: vec![format!("test-{}", i % 5)],
                ..Default::default()
            };
            if let Ok(node) = self.storage.ingest(input, Utc::now()) {
                ids.push(node.id);
            }
        }
        ids
    }

    /// Seed with diverse node types.
    pub fn seed_diverse(&mut self, count_per_type: usize) -> Vec<String> {
        let types = ["fact", "concept", "procedure", "event", "code"];
        let mut ids = Vec::with_capacity(count_per_type * types.len());

        for node_type in types {
            for i in 0..count_per_type {
                let input = IngestInput {
                    content: format!("Test {} content {}", node_type, i),
                    node_type: node_type.to_string(),
                    tags: vec![node_type.to_string()],
                    ..Default::default()
                };
                if let Ok(node) = self.storage.ingest(input, Utc::now()) {
                    ids.push(node.id);
                }
            }
        }
        ids
    }

    /// Seed nodes in new / well-learned / struggling review states.
    pub fn seed_with_retention_states(&mut self) -> Vec<String> {
        let mut ids = Vec::new();
        let now = Utc::now();

        let input = IngestInput {
            content: "New memory - never reviewed".to_string(),
            tags: vec!["new".to_string()],
            ..Default::default()
        };
        if let Ok(node) = self.storage.ingest(input, now) {
            ids.push(node.id);
        }

        let input = IngestInput {
            content: "Well-learned memory - reviewed multiple times".to_string(),
            tags: vec!["learned".to_string()],
            ..Default::default()
        };
        if let Ok(node) = self.storage.ingest(input, now) {
            let _ = self.storage.mark_reviewed(&node.id, Rating::Good, now);
            let _ = self.storage.mark_reviewed(&node.id, Rating::Good, now);
            let _ = self.storage.mark_reviewed(&node.id, Rating::Easy, now);
            ids.push(node.id);
        }

        let input = IngestInput {
            content: "Struggling memory - has lapses".to_string(),
            tags: vec!["struggling".to_string()],
            ..Default::default()
        };
        if let Ok(node) = self.storage.ingest(input, now) {
            let _ = self.storage.mark_reviewed(&node.id, Rating::Again, now);
            let _ = self.storage.mark_reviewed(&node.id, Rating::Hard, now);
            let _ = self.storage.mark_reviewed(&node.id, Rating::Again, now);
            ids.push(node.id);
        }

        ids
    }

    /// Seed with emotional memories of increasing sentiment magnitude.
    pub fn seed_emotional(&mut self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let magnitude = (i as f64) / (count as f64);
            let input = IngestInput {
                content: format!("Emotional memory with magnitude {:.2}", magnitude),
                node_type: "event".to_string(),
                tags: vec!["emotional".to_string()],
                sentiment_score: if i % 2 == 0 { 0.8 } else { -0.8 },
                sentiment_magnitude: magnitude,
                ..Default::default()
            };
            if let Ok(node) = self.storage.ingest(input, Utc::now()) {
                ids.push(node.id);
            }
        }
        ids
    }

    /// Clear all data by deleting every node.
    pub fn clear(&mut self) {
        if let Ok(nodes) = self.storage.list_nodes(10_000, 0) {
            for node in nodes {
                let _ = self.storage.delete_node(&node.id);
            }
        }
    }

    /// Recreate the database from scratch (useful for migration tests).
    pub fn recreate(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
        self.storage = Storage::new(Some(self.db_path.clone())).expect("failed to recreate storage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn seed_nodes_counts_match() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_nodes(10);
        assert_eq!(ids.len(), 10);
        assert_eq!(db.node_count(), 10);
    }

    #[test]
    fn seed_diverse_counts_match() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_diverse(3);
        assert_eq!(ids.len(), 15);
        assert_eq!(db.node_count(), 15);
    }

    #[test]
    fn clear_empties_database() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_nodes(5);
        assert_eq!(db.node_count(), 5);
        db.clear();
        assert!(db.is_empty());
    }
}
