//! Test Data Factory
//!
//! Utilities for generating realistic test data: single memories, batches,
//! and pre-built scenarios (decay, scheduling, search, temporal validity)
//! used across the journey tests.

use chrono::{DateTime, Duration, Utc};
use vestige_core::{IngestInput, KnowledgeNode, Rating, Storage};

pub struct TestDataFactory;

/// Configuration for batch memory generation.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub count: usize,
    pub node_type: Option<String>,
    pub content_prefix: String,
    pub tags: Vec<String>,
    pub with_sentiment: bool,
    pub with_temporal: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            node_type: None,
            content_prefix: "Test memory".to_string(),
            tags: vec![],
            with_sentiment: false,
            with_temporal: false,
        }
    }
}

/// A named group of related test data, with metadata keyed by role
/// ("new", "learning", "expired", etc.) for test assertions.
#[derive(Debug)]
pub struct TestScenario {
    pub node_ids: Vec<String>,
    pub description: String,
    pub metadata: std::collections::HashMap<String, String>,
}

impl TestDataFactory {
    pub fn create_memory(storage: &Storage, content: &str) -> Option<KnowledgeNode> {
        let input = IngestInput {
            content: content.to_string(),
            ..Default::default()
        };
        storage.ingest(input, Utc::now()).ok()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_memory_full(
        storage: &Storage,
        content: &str,
        node_type: &str,
        source: Option<&str>,
        tags: Vec<&str>,
        sentiment_score: f64,
        sentiment_magnitude: f64,
    ) -> Option<KnowledgeNode> {
        let input = IngestInput {
            content: content.to_string(),
            node_type: node_type.to_string(),
            source: source.map(String::from),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            sentiment_score,
            sentiment_magnitude,
            ..Default::default()
        };
        storage.ingest(input, Utc::now()).ok()
    }

    pub fn create_temporal_memory(
        storage: &Storage,
        content: &str,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Option<KnowledgeNode> {
        let input = IngestInput {
            content: content.to_string(),
            valid_from,
            valid_until,
            ..Default::default()
        };
        storage.ingest(input, Utc::now()).ok()
    }

    pub fn create_emotional_memory(
        storage: &Storage,
        content: &str,
        sentiment: f64,
        magnitude: f64,
    ) -> Option<KnowledgeNode> {
        let input = IngestInput {
            content: content.to_string(),
            node_type: "event".to_string(),
            sentiment_score: sentiment,
            sentiment_magnitude: magnitude,
            ..Default::default()
        };
        storage.ingest(input, Utc::now()).ok()
    }

    pub fn create_batch(storage: &Storage, count: usize) -> Vec<String> {
        Self::create_batch_with_config(storage, BatchConfig { count, ..Default::default() })
    }

    pub fn create_batch_with_config(storage: &Storage, config: BatchConfig) -> Vec<String> {
        let node_types = ["fact", "concept", "procedure", "event", "code"];
        let mut ids = Vec::with_capacity(config.count);
        let now = Utc::now();

        for i in 0..config.count {
            let node_type = config
                .node_type
                .clone()
                .unwrap_or_else(|| node_types[i % node_types.len()].to_string());

            let sentiment_score = if config.with_sentiment {
                ((i as f64) / (config.count as f64) * 2.0) - 1.0
            } else {
                0.0
            };
            let sentiment_magnitude = if config.with_sentiment {
                (i as f64) / (config.count as f64)
            } else {
                0.0
            };

            let (valid_from, valid_until) = if config.with_temporal {
                if i % 3 == 0 {
                    (Some(now - Duration::days(30)), Some(now + Duration::days(30)))
                } else if i % 3 == 1 {
                    (Some(now - Duration::days(60)), Some(now - Duration::days(30)))
                } else {
                    (None, None)
                }
            } else {
                (None, None)
            };

            let input = IngestInput {
                content: format!("{} {}", config.content_prefix, i),
                node_type,
                tags: config.tags.clone(),
                sentiment_score,
                sentiment_magnitude,
                valid_from,
                valid_until,
                ..Default::default()
            };

            if let Ok(node) = storage.ingest(input, now) {
                ids.push(node.id);
            }
        }

        ids
    }

    pub fn create_decay_scenario(storage: &Storage) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = std::collections::HashMap::new();

        if let Some(node) = Self::create_memory_full(
            storage,
            "Well-learned fact about photosynthesis",
            "fact",
            Some("biology textbook"),
            vec!["biology", "science"],
            0.3,
            0.5,
        ) {
            metadata.insert("high_stability".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_memory(storage, "Random fact I just learned") {
            metadata.insert("low_stability".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_emotional_memory(storage, "Important life event", 0.9, 0.95) {
            metadata.insert("emotional".to_string(), node.id.clone());
            ids.push(node.id);
        }

        TestScenario {
            node_ids: ids,
            description: "Decay testing scenario with varied stability".to_string(),
            metadata,
        }
    }

    pub fn create_scheduling_scenario(storage: &Storage) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = std::collections::HashMap::new();
        let now = Utc::now();

        if let Some(node) = Self::create_memory(storage, "Brand new memory") {
            metadata.insert("new".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_memory(storage, "Learning memory") {
            let _ = storage.mark_reviewed(&node.id, Rating::Good, now);
            metadata.insert("learning".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_memory(storage, "Well-reviewed memory") {
            for _ in 0..5 {
                let _ = storage.mark_reviewed(&node.id, Rating::Good, now);
            }
            metadata.insert("review".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_memory(storage, "Struggling memory") {
            let _ = storage.mark_reviewed(&node.id, Rating::Good, now);
            let _ = storage.mark_reviewed(&node.id, Rating::Again, now);
            metadata.insert("relearning".to_string(), node.id.clone());
            ids.push(node.id);
        }

        TestScenario {
            node_ids: ids,
            description: "Scheduling scenario with cards in different learning states".to_string(),
            metadata,
        }
    }

    pub fn create_search_scenario(storage: &Storage) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = std::collections::HashMap::new();

        for content in [
            "Rust programming language uses ownership for memory safety",
            "Python is great for data science and machine learning",
            "JavaScript runs in web browsers and Node.js",
        ] {
            if let Some(node) = Self::create_memory_full(
                storage,
                content,
                "fact",
                Some("programming docs"),
                vec!["programming", "code"],
                0.0,
                0.0,
            ) {
                ids.push(node.id);
            }
        }
        metadata.insert("programming_count".to_string(), "3".to_string());

        for content in [
            "Mitochondria is the powerhouse of the cell",
            "DNA contains genetic information",
            "Gravity is the force of attraction between masses",
        ] {
            if let Some(node) =
                Self::create_memory_full(storage, content, "fact", Some("science textbook"), vec!["science"], 0.0, 0.0)
            {
                ids.push(node.id);
            }
        }
        metadata.insert("science_count".to_string(), "3".to_string());

        for content in [
            "To make pasta, boil water and add salt",
            "Chocolate cake requires cocoa powder and eggs",
        ] {
            if let Some(node) = Self::create_memory_full(
                storage,
                content,
                "procedure",
                Some("cookbook"),
                vec!["cooking", "recipes"],
                0.0,
                0.0,
            ) {
                ids.push(node.id);
            }
        }
        metadata.insert("recipe_count".to_string(), "2".to_string());

        TestScenario {
            node_ids: ids,
            description: "Search scenario with categorized content".to_string(),
            metadata,
        }
    }

    pub fn create_temporal_scenario(storage: &Storage) -> TestScenario {
        let now = Utc::now();
        let mut ids = Vec::new();
        let mut metadata = std::collections::HashMap::new();

        if let Some(node) = Self::create_temporal_memory(
            storage,
            "Currently valid memory",
            Some(now - Duration::days(10)),
            Some(now + Duration::days(10)),
        ) {
            metadata.insert("current".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_temporal_memory(
            storage,
            "Expired memory",
            Some(now - Duration::days(60)),
            Some(now - Duration::days(30)),
        ) {
            metadata.insert("expired".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_temporal_memory(
            storage,
            "Future memory",
            Some(now + Duration::days(30)),
            Some(now + Duration::days(60)),
        ) {
            metadata.insert("future".to_string(), node.id.clone());
            ids.push(node.id);
        }

        if let Some(node) = Self::create_temporal_memory(storage, "Always valid memory", None, None) {
            metadata.insert("always_valid".to_string(), node.id.clone());
            ids.push(node.id);
        }

        TestScenario {
            node_ids: ids,
            description: "Temporal scenario with different validity periods".to_string(),
            metadata,
        }
    }

    pub fn random_node_type(seed: usize) -> &'static str {
        const TYPES: [&str; 9] = [
            "fact", "concept", "procedure", "event", "relationship", "quote", "code", "question", "insight",
        ];
        TYPES[seed % TYPES.len()]
    }

    pub fn lorem_content(words: usize, seed: usize) -> String {
        const WORDS: [&str; 20] = [
            "the", "memory", "learning", "knowledge", "algorithm", "data", "system", "process", "function",
            "method", "class", "object", "variable", "constant", "type", "structure", "pattern", "design",
            "architecture", "code",
        ];
        (0..words)
            .map(|i| WORDS[(seed + i * 7) % WORDS.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn generate_tags(count: usize, seed: usize) -> Vec<String> {
        const TAGS: [&str; 10] = [
            "important", "review", "todo", "concept", "fact", "code", "note", "idea", "question", "reference",
        ];
        (0..count).map(|i| TAGS[(seed + i) % TAGS.len()].to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_storage() -> Storage {
        let dir = tempdir().unwrap();
        Storage::new(Some(dir.path().join("test.db"))).unwrap()
    }

    #[test]
    fn create_memory_sets_content() {
        let storage = create_test_storage();
        let node = TestDataFactory::create_memory(&storage, "test content");
        assert_eq!(node.unwrap().content, "test content");
    }

    #[test]
    fn create_batch_matches_requested_count() {
        let storage = create_test_storage();
        let ids = TestDataFactory::create_batch(&storage, 10);
        assert_eq!(ids.len(), 10);
        let stats = storage.get_stats(Utc::now()).unwrap();
        assert_eq!(stats.total_nodes, 10);
    }

    #[test]
    fn decay_scenario_tags_every_role() {
        let storage = create_test_storage();
        let scenario = TestDataFactory::create_decay_scenario(&storage);
        assert!(!scenario.node_ids.is_empty());
        assert!(scenario.metadata.contains_key("high_stability"));
        assert!(scenario.metadata.contains_key("low_stability"));
        assert!(scenario.metadata.contains_key("emotional"));
    }

    #[test]
    fn scheduling_scenario_tags_every_role() {
        let storage = create_test_storage();
        let scenario = TestDataFactory::create_scheduling_scenario(&storage);
        assert!(scenario.metadata.contains_key("new"));
        assert!(scenario.metadata.contains_key("learning"));
        assert!(scenario.metadata.contains_key("review"));
    }

    #[test]
    fn lorem_content_has_requested_word_count() {
        let content = TestDataFactory::lorem_content(10, 42);
        assert_eq!(content.split_whitespace().count(), 10);
    }

    #[test]
    fn generate_tags_has_requested_count() {
        let tags = TestDataFactory::generate_tags(5, 0);
        assert_eq!(tags.len(), 5);
        assert!(tags.iter().all(|t| !t.is_empty()));
    }
}
