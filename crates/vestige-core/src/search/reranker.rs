//! Result reranking
//!
//! A pure-math pipeline of toggleable stages applied in a fixed order:
//! recency decay, retention boost, importance weighting, MMR diversity,
//! source interleaving, keyword boost, and a time-window filter. No model
//! inference — every stage operates on scores, timestamps, and embeddings
//! already attached to each candidate.

use chrono::{DateTime, Utc};

/// Default number of candidates to retrieve before reranking
pub const DEFAULT_RETRIEVAL_COUNT: usize = 50;

/// Default number of results after reranking
pub const DEFAULT_RERANK_COUNT: usize = 10;

// ============================================================================
// TYPES
// ============================================================================

/// Reranker error types
#[derive(Debug, Clone)]
pub enum RerankerError {
    RerankFailed(String),
    InvalidInput(String),
}

impl std::fmt::Display for RerankerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RerankerError::RerankFailed(e) => write!(f, "Reranking failed: {}", e),
            RerankerError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for RerankerError {}

/// A reranked result with its final score.
#[derive(Debug, Clone)]
pub struct RerankedResult<T> {
    pub item: T,
    pub score: f32,
    pub original_rank: usize,
}

/// A single candidate entering the reranking pipeline, carrying everything
/// each stage might need so stages stay independent of the search backend.
#[derive(Debug, Clone)]
pub struct RerankCandidate<T> {
    pub item: T,
    pub text: String,
    /// Relevance score from the upstream retriever (keyword/semantic/RRF).
    pub base_score: f32,
    pub created_at: DateTime<Utc>,
    /// FSRS-derived retrievability at query time, `[0, 1]`.
    pub retention: f32,
    /// Importance tracker's final score, `[0, 1]`.
    pub importance: f32,
    /// Source collection this candidate came from (used for interleaving).
    pub source: String,
    /// Embedding vector, required only for MMR diversity.
    pub embedding: Option<Vec<f32>>,
    /// Whether the query's literal keywords occur in `text`.
    pub keyword_hit: bool,
}

// ============================================================================
// CONFIG
// ============================================================================

/// Toggles and parameters for each pipeline stage, applied in declaration
/// order: recency, retention, importance, diversity, interleaving, keyword.
#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub candidate_count: usize,
    pub result_count: usize,
    pub min_score: Option<f32>,

    pub recency_decay: bool,
    /// Half-life, in days, for the recency decay stage.
    pub recency_half_life_days: f64,

    pub retention_boost: bool,
    /// Ceiling on the retention boost's multiplicative effect: a candidate
    /// at full retention is boosted by at most this fraction.
    pub retention_max_boost: f32,

    pub importance_weighting: bool,

    pub mmr_diversity: bool,
    /// Trade-off between relevance and diversity; 1.0 = pure relevance.
    pub mmr_lambda: f32,

    pub source_interleaving: bool,

    pub keyword_boost: bool,
    pub keyword_boost_factor: f32,

    /// Only results created within this window survive, if set.
    pub time_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            candidate_count: DEFAULT_RETRIEVAL_COUNT,
            result_count: DEFAULT_RERANK_COUNT,
            min_score: None,
            recency_decay: true,
            recency_half_life_days: 30.0,
            retention_boost: true,
            retention_max_boost: 0.5,
            importance_weighting: true,
            mmr_diversity: false,
            mmr_lambda: 0.7,
            source_interleaving: false,
            keyword_boost: true,
            keyword_boost_factor: 1.15,
            time_window: None,
        }
    }
}

// ============================================================================
// RERANKER
// ============================================================================

/// Applies the configured stage pipeline to a candidate list.
#[derive(Debug, Clone, Default)]
pub struct Reranker {
    config: RerankerConfig,
}

impl Reranker {
    pub fn new(config: RerankerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Runs all enabled stages and returns up to `result_count` results,
    /// sorted by final score descending.
    pub fn rerank<T: Clone>(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate<T>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RerankedResult<T>>, RerankerError> {
        if query.is_empty() {
            return Err(RerankerError::InvalidInput("Query cannot be empty".to_string()));
        }
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let mut scored: Vec<(RerankCandidate<T>, f32, usize)> = candidates
            .into_iter()
            .enumerate()
            .map(|(rank, c)| {
                let score = c.base_score;
                (c, score, rank)
            })
            .collect();

        if self.config.recency_decay {
            for (candidate, score, _) in &mut scored {
                let elapsed_days = (now - candidate.created_at).num_seconds().max(0) as f64 / 86_400.0;
                let factor = 2.0f64.powf(-elapsed_days / self.config.recency_half_life_days);
                *score *= (0.7 + 0.3 * factor) as f32;
            }
        }

        if self.config.retention_boost {
            let max_boost = self.config.retention_max_boost;
            for (candidate, score, _) in &mut scored {
                *score *= 1.0 + candidate.retention * max_boost;
            }
        }

        if self.config.importance_weighting {
            for (candidate, score, _) in &mut scored {
                *score *= 0.5 + 0.5 * candidate.importance;
            }
        }

        if self.config.keyword_boost {
            for (candidate, score, _) in &mut scored {
                if candidate.keyword_hit {
                    *score *= self.config.keyword_boost_factor;
                }
            }
        }

        if let Some((start, end)) = self.config.time_window {
            scored.retain(|(candidate, _, _)| candidate.created_at >= start && candidate.created_at <= end);
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut ranked = if self.config.mmr_diversity {
            self.apply_mmr(scored)
        } else {
            scored
        };

        if self.config.source_interleaving {
            ranked = interleave_by_source(ranked);
        }

        let mut results: Vec<RerankedResult<T>> = ranked
            .into_iter()
            .map(|(c, score, original_rank)| RerankedResult {
                item: c.item,
                score,
                original_rank,
            })
            .collect();

        if let Some(min_score) = self.config.min_score {
            results.retain(|r| r.score >= min_score);
        }

        results.truncate(self.config.result_count);
        Ok(results)
    }

    /// Maximal Marginal Relevance: greedily picks the next candidate that
    /// balances relevance against dissimilarity to what's already chosen.
    /// Candidates without an embedding are treated as maximally dissimilar
    /// (never penalized) so the stage degrades gracefully.
    fn apply_mmr<T: Clone>(
        &self,
        mut remaining: Vec<(RerankCandidate<T>, f32, usize)>,
    ) -> Vec<(RerankCandidate<T>, f32, usize)> {
        let mut selected: Vec<(RerankCandidate<T>, f32, usize)> = Vec::with_capacity(remaining.len());
        let lambda = self.config.mmr_lambda;

        while !remaining.is_empty() {
            let mut best_idx = 0;
            let mut best_mmr = f32::MIN;

            for (idx, (candidate, score, _)) in remaining.iter().enumerate() {
                let max_sim = selected
                    .iter()
                    .filter_map(|(chosen, _, _)| {
                        match (&candidate.embedding, &chosen.embedding) {
                            (Some(a), Some(b)) => Some(crate::embeddings::cosine_similarity(a, b)),
                            _ => None,
                        }
                    })
                    .fold(0.0_f32, f32::max);

                let mmr_score = lambda * score - (1.0 - lambda) * max_sim;
                if mmr_score > best_mmr {
                    best_mmr = mmr_score;
                    best_idx = idx;
                }
            }

            selected.push(remaining.remove(best_idx));
        }

        selected
    }
}

/// Round-robins already-ranked candidates by source so no single collection
/// dominates the top of the list, preserving each item's relative order
/// within its own source.
fn interleave_by_source<T>(
    ranked: Vec<(RerankCandidate<T>, f32, usize)>,
) -> Vec<(RerankCandidate<T>, f32, usize)> {
    use std::collections::HashMap;

    let mut buckets: HashMap<String, Vec<(RerankCandidate<T>, f32, usize)>> = HashMap::new();
    let mut source_order: Vec<String> = Vec::new();
    for entry in ranked {
        let key = entry.0.source.clone();
        if !buckets.contains_key(&key) {
            source_order.push(key.clone());
        }
        buckets.entry(key).or_default().push(entry);
    }

    let mut interleaved = Vec::new();
    let mut exhausted = false;
    while !exhausted {
        exhausted = true;
        for key in &source_order {
            if let Some(bucket) = buckets.get_mut(key) {
                if !bucket.is_empty() {
                    interleaved.push(bucket.remove(0));
                    exhausted = false;
                }
            }
        }
    }

    interleaved
}
