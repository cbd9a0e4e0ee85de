//! # Vestige Core
//!
//! Memory lifecycle engine for AI agents: every fact an agent learns is
//! ingested as a `KnowledgeNode`, scored by an FSRS-6 spaced-repetition
//! scheduler, weighted by a multi-factor importance tracker, and recalled
//! through a hybrid (keyword + semantic) search pipeline.
//!
//! - **FSRS-6**: 21-parameter spaced repetition scheduler, with a sentiment
//!   boost term layered on top of the stock algorithm.
//! - **Derived retrievability**: no stored "strength" field ever goes stale —
//!   retention is recomputed from `stability` and elapsed time at read time.
//! - **Importance tracking**: base score, usage frequency, recency, and graph
//!   connectivity blended into a single ranking weight, independent of FSRS
//!   retention.
//! - **Hybrid search**: FTS5/BM25 keyword search (with a LIKE fallback) fused
//!   with HNSW vector search via reciprocal rank fusion, then reranked.
//! - **Bi-temporal validity**: nodes carry `valid_from`/`valid_until` and a
//!   `supersedes` chain so facts can be corrected without being destroyed.
//! - **Virtualizable time**: every time-sensitive component takes `&dyn
//!   Clock`, so decay and scheduling are deterministic under test.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vestige_core::{Storage, IngestInput, Rating};
//! use chrono::Utc;
//!
//! let storage = Storage::new(None)?;
//!
//! let input = IngestInput {
//!     content: "The mitochondria is the powerhouse of the cell".to_string(),
//!     ..Default::default()
//! };
//! let node = storage.ingest(input, Utc::now())?;
//!
//! let updated = storage.mark_reviewed(&node.id, Rating::Good, Utc::now())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed
//! - `vector-search` (default): HNSW vector search with USearch
//! - `full`: all features

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod engine;
pub mod fsrs;
pub mod importance;
pub mod memory;
pub mod storage;

#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub mod embeddings;

pub mod search;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Memory types
pub use memory::{
    DecayTickResult, EdgeType, EmbeddingResult, IngestInput, KnowledgeEdge, KnowledgeNode,
    MatchType, MemoryStats, NodeType, RecallInput, SearchMode, SearchResult, SimilarityResult,
    TemporalRange, TemporalValidity,
};

// FSRS-6 algorithm
pub use fsrs::{
    DEFAULT_DECAY, DEFAULT_DESIRED_RETENTION, DEFAULT_PARAMETERS, FSRSParameters, FSRSScheduler,
    FSRSState, FsrsWeights, LearningState, PARAM_COUNT, PreviewResults, Rating, ReviewResult,
    forgetting_factor, fuzz_interval, initial_difficulty, initial_stability, next_difficulty,
    next_interval, retrievability, sentiment_boost, short_term_stability, stability_after_lapse,
    stability_after_recall,
};

// Clock (virtualizable time)
pub use clock::{Clock, ClockJump, SystemClock, VirtualClock};

// Memory lifecycle orchestrator
pub use engine::{CancellationToken, EngineError, VestigeEngine};
pub use engine::Result as EngineResult;

// Importance tracking
pub use importance::{ImportanceScore, ImportanceTracker, UsageEvent, USAGE_HISTORY_CAPACITY};

// Storage layer
pub use storage::{Result, Storage, StorageError};

// Embeddings (when feature enabled)
#[cfg(feature = "embeddings")]
pub use embeddings::{
    BATCH_SIZE, EMBEDDING_DIMENSIONS, Embedder, Embedding, EmbeddingError, EmbeddingService,
    LocalEmbedder, MAX_TEXT_LENGTH, MOCK_DIMENSIONS, MockEmbedder, RAW_DIMENSIONS,
    cosine_similarity, dot_product, euclidean_distance, matryoshka_truncate,
};

// Search: keyword/hybrid/reranking primitives are always available
pub use search::{
    DEFAULT_RERANK_COUNT, DEFAULT_RETRIEVAL_COUNT, HybridSearchConfig, HybridSearcher,
    KeywordFilter, RerankCandidate, Reranker, RerankerConfig, RerankerError, RerankedResult,
    like_fallback_pattern, linear_combination, rank_to_score, reciprocal_rank_fusion,
    sanitize_fts5_query,
};

// Vector search (HNSW via USearch) requires the `vector-search` feature
#[cfg(feature = "vector-search")]
pub use search::{VectorIndex, VectorIndexConfig, VectorIndexStats, VectorSearchError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (6 = 21 parameters)
pub const FSRS_VERSION: u8 = 6;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-ai/nomic-embed-text-v1.5";

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CancellationToken, Clock, DecayTickResult, EdgeType, EngineError, FSRSScheduler,
        FSRSState, ImportanceScore, ImportanceTracker, IngestInput, KnowledgeEdge, KnowledgeNode,
        MemoryStats, NodeType, Rating, RecallInput, Result, SearchMode, SearchResult, Storage,
        StorageError, SystemClock, VestigeEngine, VirtualClock,
    };

    #[cfg(feature = "embeddings")]
    pub use crate::{Embedder, Embedding, EmbeddingService, LocalEmbedder, MockEmbedder};

    #[cfg(feature = "vector-search")]
    pub use crate::{HybridSearcher, Reranker, VectorIndex};
}
