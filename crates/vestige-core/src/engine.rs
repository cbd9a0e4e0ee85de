//! Memory Lifecycle Orchestrator
//!
//! `VestigeEngine` is a thin composition layer over [`Storage`], the FSRS-6
//! [`FSRSScheduler`] it owns, an [`ImportanceTracker`], a [`HybridSearcher`],
//! and a [`Reranker`]. It is the only place that calls a [`Clock`] to resolve
//! "now" and the only place that decides how keyword and semantic candidates
//! get fused and reordered before they reach a caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::fsrs::Rating;
use crate::importance::ImportanceTracker;
use crate::memory::{IngestInput, KnowledgeNode, MatchType, RecallInput, SearchMode, SearchResult};
use crate::search::{HybridSearcher, KeywordFilter, RerankCandidate, Reranker, RerankerConfig};
use crate::storage::{Storage, StorageError};

#[cfg(feature = "embeddings")]
use crate::embeddings::EmbeddingError;

/// A small cooperative cancellation flag, checked between search phases.
///
/// `vestige-core` has no async runtime dependency, so this is a bare
/// `Arc<AtomicBool>` rather than a `tokio_util::sync::CancellationToken` -
/// cheap enough that callers can create one per request.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[cfg(feature = "embeddings")]
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("search cancelled")]
    Cancelled,

    #[error("reranking failed: {0}")]
    Rerank(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Composes storage, scheduling, importance tracking, and search into the
/// five operations a caller actually needs: ingest, review, recall, decay,
/// and stats.
pub struct VestigeEngine<C: Clock> {
    storage: Storage,
    clock: C,
    importance: ImportanceTracker,
    hybrid: HybridSearcher,
    reranker: Reranker,
    #[cfg(feature = "embeddings")]
    embedder: Option<Box<dyn crate::embeddings::Embedder>>,
}

impl<C: Clock> VestigeEngine<C> {
    pub fn new(storage: Storage, clock: C) -> Self {
        Self {
            storage,
            clock,
            importance: ImportanceTracker::new(),
            hybrid: HybridSearcher::new(),
            reranker: Reranker::new(RerankerConfig::default()),
            #[cfg(feature = "embeddings")]
            embedder: None,
        }
    }

    #[cfg(feature = "embeddings")]
    pub fn with_embedder(mut self, embedder: impl crate::embeddings::Embedder + 'static) -> Self {
        self.embedder = Some(Box::new(embedder));
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn importance(&self) -> &ImportanceTracker {
        &self.importance
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Ingests a new memory, indexes its embedding if an embedder is
    /// configured, and seeds its importance score from the ingest input's
    /// sentiment magnitude (a strong emotional signal at encoding time is a
    /// reasonable prior for importance before any usage has accrued).
    pub fn ingest(&self, input: IngestInput) -> Result<KnowledgeNode> {
        let sentiment_magnitude = input.sentiment_magnitude;
        let node = self.storage.ingest(input, self.now())?;

        #[cfg(feature = "embeddings")]
        if let Some(embedder) = &self.embedder {
            #[cfg(feature = "vector-search")]
            if let Ok(vector) = embedder.embed(&node.content) {
                let _ = self.storage.index_embedding(&node.id, &vector);
            }
            #[cfg(not(feature = "vector-search"))]
            let _ = embedder;
        }

        let base = 0.3 + sentiment_magnitude.clamp(0.0, 1.0) * 0.4;
        self.importance.get_or_create(&node.id, base, &self.clock);

        Ok(node)
    }

    /// Records a spaced-repetition review and feeds the outcome back into
    /// the importance tracker (anything rated above `Again` counts as a
    /// helpful retrieval for importance purposes).
    pub fn review(&self, id: &str, rating: Rating) -> Result<KnowledgeNode> {
        let node = self.storage.mark_reviewed(id, rating, self.now())?;
        let was_helpful = !matches!(rating, Rating::Again);
        self.importance.on_retrieved(id, was_helpful, &self.clock);
        self.storage.record_access(id, self.now(), Some(was_helpful))?;
        Ok(node)
    }

    /// Recomputes which nodes have crossed their review threshold and lets
    /// neglected importance scores decay. Does not mutate FSRS stability -
    /// that only changes on an explicit `review`.
    pub fn apply_decay(&self) -> Result<crate::memory::DecayTickResult> {
        let start = self.now();
        let (nodes_processed, newly_due) = self.storage.decay_tick(start)?;
        let neglected = self.importance.apply_decay(&self.clock);
        let duration_ms = (self.now() - start).num_milliseconds().max(0);

        Ok(crate::memory::DecayTickResult {
            nodes_processed,
            newly_due,
            neglected: neglected.len() as i64,
            duration_ms,
        })
    }

    /// Recalls memories matching `input`, fusing keyword and semantic
    /// candidates (when both are available) and running them through the
    /// reranking pipeline. Returns a keyword-only result set, marked via
    /// each result's `match_type`, when no embedder is configured or the
    /// request asks for `SearchMode::Keyword` explicitly.
    pub fn recall(&self, input: RecallInput, cancel: Option<&CancellationToken>) -> Result<Vec<SearchResult>> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(EngineError::Cancelled);
        }

        let now = self.now();
        let limit = input.limit.max(1) as usize;
        let fetch_limit = self.hybrid.effective_source_limit(limit) as i32;

        let filter = KeywordFilter {
            node_type: input.node_type.clone(),
            tags: input.tags.clone(),
            ..Default::default()
        };

        let keyword_results = if matches!(input.search_mode, SearchMode::Keyword | SearchMode::Hybrid) {
            self.storage.keyword_search(&input.query, &filter, fetch_limit)?
        } else {
            Vec::new()
        };

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(EngineError::Cancelled);
        }

        #[cfg(all(feature = "embeddings", feature = "vector-search"))]
        let semantic_results = if matches!(input.search_mode, SearchMode::Semantic | SearchMode::Hybrid) {
            match &self.embedder {
                Some(embedder) => {
                    let vector = embedder.embed(&input.query)?;
                    self.storage.semantic_search(&vector, fetch_limit as usize)?
                }
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };
        #[cfg(not(all(feature = "embeddings", feature = "vector-search")))]
        let semantic_results: Vec<(KnowledgeNode, f32)> = Vec::new();

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(EngineError::Cancelled);
        }

        let merged = self.fuse_candidates(keyword_results, semantic_results);

        let query_lower = input.query.to_lowercase();
        let candidates: Vec<RerankCandidate<SearchResult>> = merged
            .into_iter()
            .filter(|r| input.valid_at.is_none_or(|t| r.node.is_valid_at(t)))
            .filter(|r| self.storage.retrievability(&r.node, now) >= input.min_retention)
            .map(|r| {
                let retention = self.storage.retrievability(&r.node, now) as f32;
                let importance = self.importance.get_or_create(&r.node.id, 0.3, &self.clock).final_score as f32;
                let keyword_hit = r.node.content.to_lowercase().contains(&query_lower);
                let source = match r.match_type {
                    MatchType::Keyword => "keyword",
                    MatchType::Semantic => "semantic",
                    MatchType::Both => "hybrid",
                }
                .to_string();

                RerankCandidate {
                    text: r.node.content.clone(),
                    base_score: r.combined_score,
                    created_at: r.node.created_at,
                    retention,
                    importance,
                    source,
                    embedding: None,
                    keyword_hit,
                    item: r,
                }
            })
            .collect();

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(EngineError::Cancelled);
        }

        let query_for_rerank = if input.query.is_empty() { " " } else { &input.query };
        let reranked = self
            .reranker
            .rerank(query_for_rerank, candidates, now)
            .map_err(|e| EngineError::Rerank(e.to_string()))?;

        let results: Vec<SearchResult> = reranked.into_iter().take(limit).map(|r| r.item).collect();

        // Testing Effect: every returned item strengthens itself. Best-effort -
        // a failure here must not fail the search that already succeeded.
        for result in &results {
            let _ = self.storage.record_access(&result.node.id, now, Some(true));
            self.importance.on_retrieved(&result.node.id, true, &self.clock);
        }

        Ok(results)
    }

    /// Fuses keyword and semantic candidates via the hybrid searcher's RRF
    /// weighting, reattaching each surviving id's node and per-modality
    /// scores so the reranker still sees both inputs to `combined_score`.
    fn fuse_candidates(
        &self,
        keyword: Vec<(KnowledgeNode, f32)>,
        semantic: Vec<(KnowledgeNode, f32)>,
    ) -> Vec<SearchResult> {
        use std::collections::HashMap;

        let mut nodes: HashMap<String, KnowledgeNode> = HashMap::new();
        let mut keyword_scores: HashMap<String, f32> = HashMap::new();
        let mut semantic_scores: HashMap<String, f32> = HashMap::new();

        let keyword_ranked: Vec<(String, f32)> = keyword
            .into_iter()
            .map(|(node, score)| {
                let id = node.id.clone();
                keyword_scores.insert(id.clone(), score);
                nodes.entry(id.clone()).or_insert(node);
                (id, score)
            })
            .collect();

        let semantic_ranked: Vec<(String, f32)> = semantic
            .into_iter()
            .map(|(node, score)| {
                let id = node.id.clone();
                semantic_scores.insert(id.clone(), score);
                nodes.entry(id.clone()).or_insert(node);
                (id, score)
            })
            .collect();

        self.hybrid
            .fuse_rrf(&keyword_ranked, &semantic_ranked)
            .into_iter()
            .filter_map(|(id, combined_score)| {
                let node = nodes.remove(&id)?;
                let keyword_score = keyword_scores.get(&id).copied();
                let semantic_score = semantic_scores.get(&id).copied();
                let match_type = match (keyword_score, semantic_score) {
                    (Some(_), Some(_)) => MatchType::Both,
                    (Some(_), None) => MatchType::Keyword,
                    (None, Some(_)) | (None, None) => MatchType::Semantic,
                };
                Some(SearchResult {
                    node,
                    keyword_score,
                    semantic_score,
                    combined_score,
                    match_type,
                })
            })
            .collect()
    }
}
