//! Search: keyword (FTS5/BM25), semantic (HNSW via USearch), hybrid fusion
//! (RRF), and a pure-math reranking pipeline.

mod hybrid;
mod keyword;
mod reranker;
#[cfg(feature = "vector-search")]
mod vector;

pub use hybrid::{HybridSearchConfig, HybridSearcher, linear_combination, reciprocal_rank_fusion};
pub use keyword::{FilterClause, KeywordFilter, like_fallback_pattern, rank_to_score, sanitize_fts5_query};
pub use reranker::{
    DEFAULT_RERANK_COUNT, DEFAULT_RETRIEVAL_COUNT, RerankCandidate, Reranker, RerankerConfig,
    RerankerError, RerankedResult,
};

#[cfg(feature = "vector-search")]
pub use vector::{
    DEFAULT_CONNECTIVITY, DEFAULT_DIMENSIONS, DEFAULT_EXPANSION_ADD, DEFAULT_EXPANSION_SEARCH,
    VectorIndex, VectorIndexConfig, VectorIndexStats, VectorSearchError,
};
