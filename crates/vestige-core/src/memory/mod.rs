//! Memory module - core types and data structures
//!
//! Implements the memory model with:
//! - Knowledge nodes with FSRS-6 scheduling state
//! - A knowledge graph of typed edges between nodes
//! - Bi-temporal validity
//! - Semantic embedding metadata

mod node;
mod temporal;

pub use node::{IngestInput, KnowledgeNode, NodeType, RecallInput, SearchMode};
pub use temporal::{TemporalRange, TemporalValidity};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// KNOWLEDGE GRAPH EDGES
// ============================================================================

/// Type of relationship between knowledge nodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Semantically related (similar meaning/topic)
    Semantic,
    /// Temporal relationship (happened before/after)
    Temporal,
    /// Causal relationship (A caused B)
    Causal,
    /// Derived knowledge (B is derived from A)
    Derived,
    /// Contradiction (A and B conflict)
    Contradiction,
    /// Refinement (B is a more specific version of A)
    Refinement,
    /// Part-of relationship (A is part of B)
    PartOf,
    /// B supersedes A: A is no longer the current version of this knowledge
    Supersedes,
    /// User-defined relationship
    Custom,
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeType::Semantic => write!(f, "semantic"),
            EdgeType::Temporal => write!(f, "temporal"),
            EdgeType::Causal => write!(f, "causal"),
            EdgeType::Derived => write!(f, "derived"),
            EdgeType::Contradiction => write!(f, "contradiction"),
            EdgeType::Refinement => write!(f, "refinement"),
            EdgeType::PartOf => write!(f, "part_of"),
            EdgeType::Supersedes => write!(f, "supersedes"),
            EdgeType::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "semantic" => Ok(EdgeType::Semantic),
            "temporal" => Ok(EdgeType::Temporal),
            "causal" => Ok(EdgeType::Causal),
            "derived" => Ok(EdgeType::Derived),
            "contradiction" => Ok(EdgeType::Contradiction),
            "refinement" => Ok(EdgeType::Refinement),
            "part_of" | "partof" => Ok(EdgeType::PartOf),
            "supersedes" => Ok(EdgeType::Supersedes),
            "custom" => Ok(EdgeType::Custom),
            _ => Err(format!("Unknown edge type: {}", s)),
        }
    }
}

/// A directed edge in the knowledge graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub edge_type: EdgeType,
    pub weight: f32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub confidence: f32,
    pub metadata: Option<String>,
}

impl KnowledgeEdge {
    pub fn new(source_id: String, target_id: String, edge_type: EdgeType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_id,
            target_id,
            edge_type,
            weight: 1.0,
            valid_from: Some(chrono::Utc::now()),
            valid_until: None,
            created_at: chrono::Utc::now(),
            created_by: None,
            confidence: 1.0,
            metadata: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid_until.is_none()
    }

    pub fn was_valid_at(&self, time: DateTime<Utc>) -> bool {
        let after_start = self.valid_from.is_none_or(|from| time >= from);
        let before_end = self.valid_until.is_none_or(|until| time < until);
        after_start && before_end
    }
}

// ============================================================================
// MEMORY STATISTICS
// ============================================================================

/// Statistics about the memory store
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_nodes: i64,
    pub nodes_due_for_review: i64,
    /// Average derived retention strength across all nodes
    pub average_retention: f64,
    pub oldest_memory: Option<DateTime<Utc>>,
    pub newest_memory: Option<DateTime<Utc>>,
    pub nodes_with_embeddings: i64,
    pub embedding_model: Option<String>,
}

// ============================================================================
// DECAY TICK RESULT
// ============================================================================

/// Result of running a decay tick over the store: recomputes which nodes
/// have crossed their review threshold, without mutating stability (FSRS
/// stability only changes on an explicit review).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DecayTickResult {
    /// Number of nodes examined
    pub nodes_processed: i64,
    /// Nodes now due for review that weren't before
    pub newly_due: i64,
    /// Nodes whose importance decayed below the neglect threshold
    pub neglected: i64,
    /// Processing duration in milliseconds
    pub duration_ms: i64,
}

// ============================================================================
// SEARCH RESULTS
// ============================================================================

/// Enhanced search result with relevance scores
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub node: KnowledgeNode,
    pub keyword_score: Option<f32>,
    pub semantic_score: Option<f32>,
    pub combined_score: f32,
    pub match_type: MatchType,
}

/// How a search result was matched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    Keyword,
    Semantic,
    Both,
}

/// Semantic similarity search result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub node: KnowledgeNode,
    pub similarity: f32,
}

// ============================================================================
// EMBEDDING RESULT
// ============================================================================

/// Result of an embedding generation batch
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingResult {
    pub successful: i64,
    pub failed: i64,
    pub skipped: i64,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_type_roundtrips_through_string() {
        for edge_type in [
            EdgeType::Semantic,
            EdgeType::Temporal,
            EdgeType::Causal,
            EdgeType::Derived,
            EdgeType::Contradiction,
            EdgeType::Refinement,
            EdgeType::PartOf,
            EdgeType::Supersedes,
            EdgeType::Custom,
        ] {
            let s = edge_type.to_string();
            assert_eq!(s.parse::<EdgeType>().unwrap(), edge_type);
        }
    }

    #[test]
    fn new_edge_is_valid() {
        let edge = KnowledgeEdge::new("a".into(), "b".into(), EdgeType::Supersedes);
        assert!(edge.is_valid());
        assert!(edge.was_valid_at(Utc::now()));
    }
}
