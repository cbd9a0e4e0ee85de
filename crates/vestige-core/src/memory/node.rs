//! Memory node - the fundamental unit of stored knowledge
//!
//! Each node represents a discrete piece of knowledge with:
//! - Content and metadata
//! - FSRS-6 scheduling state
//! - Derived retention strength (computed from stability at read time)
//! - Temporal validity (bi-temporal)
//! - Entity references and contradiction tracking
//! - Embedding metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fsrs::LearningState;

// ============================================================================
// NODE TYPES
// ============================================================================

/// Closed set of knowledge node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A discrete fact or piece of information
    #[default]
    Fact,
    /// A concept or abstract idea
    Concept,
    /// A procedure or how-to knowledge
    Procedure,
    /// An event or experience
    Event,
    /// A relationship between entities
    Relationship,
    /// A quote or verbatim text
    Quote,
    /// Code or technical snippet
    Code,
    /// A question to be answered
    Question,
    /// User insight or reflection
    Insight,
    /// A recurring pattern noticed across other memories
    Pattern,
    /// A decision that was made, with its rationale
    Decision,
    /// Manually curated reference knowledge
    Manual,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Fact => "fact",
            NodeType::Concept => "concept",
            NodeType::Procedure => "procedure",
            NodeType::Event => "event",
            NodeType::Relationship => "relationship",
            NodeType::Quote => "quote",
            NodeType::Code => "code",
            NodeType::Question => "question",
            NodeType::Insight => "insight",
            NodeType::Pattern => "pattern",
            NodeType::Decision => "decision",
            NodeType::Manual => "manual",
        }
    }

    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fact" => NodeType::Fact,
            "concept" => NodeType::Concept,
            "procedure" => NodeType::Procedure,
            "event" => NodeType::Event,
            "relationship" => NodeType::Relationship,
            "quote" => NodeType::Quote,
            "code" => NodeType::Code,
            "question" => NodeType::Question,
            "insight" => NodeType::Insight,
            "pattern" => NodeType::Pattern,
            "decision" => NodeType::Decision,
            "manual" => NodeType::Manual,
            _ => NodeType::Fact,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// KNOWLEDGE NODE
// ============================================================================

/// A single memory in the store.
///
/// Combines FSRS-6 scheduling state with bi-temporal validity and
/// contradiction tracking. `storage_strength`/`retrieval_strength` are
/// deliberately absent: retention is derived from `stability` plus elapsed
/// time at read time rather than persisted (see the orchestrator's
/// `retention_strength` helper).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The actual content/knowledge
    pub content: String,
    /// Short human-readable summary, used in result lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Type of knowledge (fact, concept, procedure, etc.)
    pub node_type: String,
    /// When the node was created
    pub created_at: DateTime<Utc>,
    /// When the node was last modified
    pub updated_at: DateTime<Utc>,
    /// When the node was last accessed/reviewed
    pub last_accessed: DateTime<Utc>,

    // ========== FSRS-6 scheduling state ==========
    pub state: LearningState,
    /// Memory stability (days until ~90% forgetting probability)
    pub stability: f64,
    /// Inherent difficulty (1.0 = easy, 10.0 = hard)
    pub difficulty: f64,
    /// Number of successful reviews
    pub reps: i32,
    /// Number of lapses (forgotten after learning)
    pub lapses: i32,
    /// Days scheduled until the next review, as of the last review
    pub scheduled_days: f64,
    /// Timestamp of the most recent review, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    /// Next scheduled review date
    pub next_review: Option<DateTime<Utc>>,

    // ========== Emotional signal ==========
    /// Sentiment polarity (-1.0 to 1.0)
    pub sentiment_score: f64,
    /// Sentiment intensity (0.0 to 1.0) - boosts stability growth
    pub sentiment_magnitude: f64,

    // ========== Confidence & contradiction ==========
    /// Confidence that this content is accurate (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Whether another node has been recorded as contradicting this one
    #[serde(default)]
    pub is_contradicted: bool,
    /// IDs of nodes that contradict this one
    #[serde(default)]
    pub contradiction_ids: Vec<String>,
    /// Chain of node IDs this node supersedes, oldest first
    #[serde(default)]
    pub source_chain: Vec<String>,

    // ========== Provenance ==========
    /// Source of the knowledge (URL, file, conversation, etc.)
    pub source: Option<String>,
    /// Originating platform or tool (e.g. "claude-desktop", "cli")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_platform: Option<String>,
    /// Tags for categorization
    pub tags: Vec<String>,

    // ========== Entity references ==========
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,

    // ========== Bi-temporal validity ==========
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    // ========== Usage / testing-effect tracking ==========
    /// Utility score = times_useful / access_count (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utility_score: Option<f64>,
    /// Number of times this memory was retrieved in search
    #[serde(default)]
    pub access_count: i32,
    /// Number of times this memory was subsequently marked useful
    #[serde(default)]
    pub times_useful: i32,

    // ========== Embedding metadata ==========
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_embedding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Default for KnowledgeNode {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            content: String::new(),
            summary: None,
            node_type: "fact".to_string(),
            created_at: now,
            updated_at: now,
            last_accessed: now,
            state: LearningState::New,
            stability: 0.0,
            difficulty: 0.0,
            reps: 0,
            lapses: 0,
            scheduled_days: 0.0,
            last_review: None,
            next_review: None,
            sentiment_score: 0.0,
            sentiment_magnitude: 0.0,
            confidence: 1.0,
            is_contradicted: false,
            contradiction_ids: vec![],
            source_chain: vec![],
            source: None,
            source_platform: None,
            tags: vec![],
            people: vec![],
            concepts: vec![],
            events: vec![],
            valid_from: None,
            valid_until: None,
            utility_score: None,
            access_count: 0,
            times_useful: 0,
            has_embedding: None,
            embedding_model: None,
        }
    }
}

impl KnowledgeNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        let after_start = self.valid_from.map(|t| time >= t).unwrap_or(true);
        let before_end = self.valid_until.map(|t| time <= t).unwrap_or(true);
        after_start && before_end
    }

    pub fn is_currently_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_due(&self) -> bool {
        self.next_review.map(|t| t <= Utc::now()).unwrap_or(true)
    }

    pub fn get_node_type(&self) -> NodeType {
        NodeType::parse_name(&self.node_type)
    }

    /// Ratio of useful retrievals to total retrievals, `None` until the node
    /// has been retrieved at least once.
    pub fn derived_utility(&self) -> Option<f64> {
        if self.access_count == 0 {
            None
        } else {
            Some(self.times_useful as f64 / self.access_count as f64)
        }
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for creating a new memory. `deny_unknown_fields` rejects field
/// injection from untrusted tool callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IngestInput {
    pub content: String,
    #[serde(default = "default_node_type")]
    pub node_type: String,
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_platform: Option<String>,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub sentiment_magnitude: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    /// ID of a node this ingest supersedes, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
}

fn default_node_type() -> String {
    "fact".to_string()
}

impl Default for IngestInput {
    fn default() -> Self {
        Self {
            content: String::new(),
            node_type: default_node_type(),
            source: None,
            source_platform: None,
            sentiment_score: 0.0,
            sentiment_magnitude: 0.0,
            tags: vec![],
            people: vec![],
            concepts: vec![],
            events: vec![],
            valid_from: None,
            valid_until: None,
            supersedes: None,
        }
    }
}

/// Search mode for recall queries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Keyword search only (FTS5/BM25)
    Keyword,
    /// Semantic search only (embeddings)
    Semantic,
    /// Hybrid search with RRF fusion (default)
    #[default]
    Hybrid,
}

/// Input for recalling memories. `deny_unknown_fields` rejects field
/// injection from untrusted tool callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecallInput {
    pub query: String,
    pub limit: i32,
    #[serde(default)]
    pub min_retention: f64,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for RecallInput {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: 10,
            min_retention: 0.0,
            search_mode: SearchMode::Hybrid,
            valid_at: None,
            node_type: None,
            tags: vec![],
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
