//! Multi-factor importance tracking.
//!
//! Importance is distinct from FSRS retention: retention says how likely a
//! memory is to be recalled right now, importance says how much weight it
//! should get in search ranking and neglect detection. Combines a
//! user/ingest-supplied base score with usage frequency, recency, and graph
//! connectivity.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Ring buffer capacity for per-node usage history.
pub const USAGE_HISTORY_CAPACITY: usize = 1000;

const WEIGHT_BASE: f64 = 0.20;
const WEIGHT_USAGE: f64 = 0.40;
const WEIGHT_RECENCY: f64 = 0.25;
const WEIGHT_CONNECTION: f64 = 0.15;

const MIN_SCORE: f64 = 0.01;
const MAX_SCORE: f64 = 1.0;

/// Half-life, in days, used by the recency factor's exponential decay.
const RECENCY_HALF_LIFE_DAYS: f64 = 14.0;

/// Default seed value for a freshly created node's usage factor.
const DEFAULT_USAGE: f64 = 0.1;

/// Multiplier applied to `usage` on a helpful retrieval.
const USAGE_BOOST: f64 = 1.15;
/// Multiplier applied to `usage` on an unhelpful retrieval.
const USAGE_PENALTY: f64 = 0.95;
const MIN_USAGE: f64 = 0.01;
const MAX_USAGE: f64 = 1.0;

/// Days of inactivity tolerated before usage starts decaying.
const USAGE_DECAY_GRACE_DAYS: f64 = 7.0;
/// Per-day multiplier applied to `usage` once the grace period has elapsed.
const USAGE_DECAY_RATE: f64 = 0.95;

/// A single retrieval or feedback event for a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageEvent {
    pub at: DateTime<Utc>,
    pub was_helpful: bool,
}

/// The four factors behind a node's importance, plus the blended result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportanceScore {
    pub base: f64,
    pub usage: f64,
    pub recency: f64,
    pub connection: f64,
    pub final_score: f64,
}

impl ImportanceScore {
    fn recompute(base: f64, usage: f64, recency: f64, connection: f64) -> Self {
        let final_score = (WEIGHT_BASE * base
            + WEIGHT_USAGE * usage
            + WEIGHT_RECENCY * recency
            + WEIGHT_CONNECTION * connection)
            .clamp(MIN_SCORE, MAX_SCORE);
        Self {
            base,
            usage,
            recency,
            connection,
            final_score,
        }
    }
}

impl Default for ImportanceScore {
    fn default() -> Self {
        Self::recompute(0.5, DEFAULT_USAGE, 1.0, 0.0)
    }
}

#[derive(Debug, Clone)]
struct NodeImportance {
    base: f64,
    connection: f64,
    /// Persisted usage factor, multiplicatively updated on each retrieval
    /// (`on_retrieved`) and decayed once `apply_decay` sees it past its
    /// grace period. Not recomputed from `history` - that buffer is kept
    /// only for observability.
    usage: f64,
    created_at: DateTime<Utc>,
    history: VecDeque<UsageEvent>,
    last_event_at: Option<DateTime<Utc>>,
}

impl NodeImportance {
    fn new(base: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            base,
            connection: 0.0,
            usage: DEFAULT_USAGE,
            created_at,
            history: VecDeque::new(),
            last_event_at: None,
        }
    }

    /// Usage as of `now`: the persisted value, decayed by `decay_rate ^
    /// days_past_grace` once `USAGE_DECAY_GRACE_DAYS` have elapsed since the
    /// last retrieval (or since creation, if never retrieved).
    fn usage_factor(&self, now: DateTime<Utc>) -> f64 {
        let last_activity = self.last_event_at.unwrap_or(self.created_at);
        let elapsed_days = (now - last_activity).num_seconds().max(0) as f64 / 86_400.0;
        let days_past_grace = (elapsed_days - USAGE_DECAY_GRACE_DAYS).max(0.0);
        (self.usage * USAGE_DECAY_RATE.powf(days_past_grace)).clamp(MIN_USAGE, MAX_USAGE)
    }

    fn recency_factor(&self, now: DateTime<Utc>) -> f64 {
        let last = self.last_event_at.unwrap_or(self.created_at);
        let elapsed_days = (now - last).num_seconds().max(0) as f64 / 86_400.0;
        0.5f64.powf(elapsed_days / RECENCY_HALF_LIFE_DAYS)
    }

    fn score(&self, now: DateTime<Utc>) -> ImportanceScore {
        ImportanceScore::recompute(
            self.base,
            self.usage_factor(now),
            self.recency_factor(now),
            self.connection,
        )
    }

    /// Multiplicatively updates the persisted `usage` value and resets the
    /// recency clock, then appends to the observability ring buffer.
    fn record_event(&mut self, event: UsageEvent) {
        let multiplier = if event.was_helpful { USAGE_BOOST } else { USAGE_PENALTY };
        self.usage = (self.usage * multiplier).clamp(MIN_USAGE, MAX_USAGE);

        if self.history.len() >= USAGE_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.last_event_at = Some(event.at);
        self.history.push_back(event);
    }
}

/// Tracks importance for every known node. Thread-safe; intended to be held
/// behind an `Arc` alongside the store.
pub struct ImportanceTracker {
    nodes: RwLock<HashMap<String, NodeImportance>>,
}

impl Default for ImportanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportanceTracker {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the current score for `node_id`, creating a fresh entry with
    /// `default_base` if none exists yet.
    pub fn get_or_create(&self, node_id: &str, default_base: f64, clock: &dyn Clock) -> ImportanceScore {
        let now = clock.now();
        let mut nodes = self.nodes.write().expect("importance lock poisoned");
        let entry = nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeImportance::new(default_base.clamp(0.0, 1.0), now));
        entry.score(now)
    }

    /// Records a retrieval and whether it turned out to be helpful (the
    /// testing effect: every successful retrieval nudges importance up).
    pub fn on_retrieved(&self, node_id: &str, was_helpful: bool, clock: &dyn Clock) -> ImportanceScore {
        let now = clock.now();
        let mut nodes = self.nodes.write().expect("importance lock poisoned");
        let entry = nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeImportance::new(0.5, now));
        entry.record_event(UsageEvent { at: now, was_helpful });
        entry.score(now)
    }

    /// Recomputes every tracked node's recency and usage factors against
    /// `clock`, without any other side effect. Both are always derived from
    /// persisted state (`usage`, `last_event_at`/`created_at`), never stored
    /// pre-decayed, so repeated ticks with no retrieval in between are safe.
    pub fn apply_decay(&self, clock: &dyn Clock) -> Vec<(String, ImportanceScore)> {
        let nodes = self.nodes.read().expect("importance lock poisoned");
        let now = clock.now();
        nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.score(now)))
            .collect()
    }

    /// Overrides the base (ingest-time) importance for a node.
    pub fn set_base(&self, node_id: &str, base: f64, clock: &dyn Clock) {
        let now = clock.now();
        let mut nodes = self.nodes.write().expect("importance lock poisoned");
        nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeImportance::new(base.clamp(0.0, 1.0), now))
            .base = base.clamp(0.0, 1.0);
    }

    /// Sets the graph-connectivity factor, typically edge count normalized
    /// by the orchestrator against the rest of the graph.
    pub fn set_connection(&self, node_id: &str, connection: f64, clock: &dyn Clock) {
        let now = clock.now();
        let mut nodes = self.nodes.write().expect("importance lock poisoned");
        nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeImportance::new(0.5, now))
            .connection = connection.clamp(0.0, 1.0);
    }

    /// Transforms each `(id, relevance)` pair's score as `score · (0.5 + 0.5
    /// · final_score)` and resorts descending - the blend the reranker's
    /// importance-weighting stage also applies directly to candidates that
    /// already carry a precomputed importance score.
    pub fn weight_results(&self, results: &[(String, f32)], clock: &dyn Clock) -> Vec<(String, f32)> {
        let now = clock.now();
        let nodes = self.nodes.read().expect("importance lock poisoned");
        let mut weighted: Vec<(String, f32)> = results
            .iter()
            .map(|(id, relevance)| {
                let importance = nodes
                    .get(id)
                    .map(|n| n.score(now).final_score)
                    .unwrap_or(0.5);
                (id.clone(), relevance * (0.5 + 0.5 * importance as f32))
            })
            .collect();
        weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        weighted
    }

    /// The `k` highest-importance node IDs.
    pub fn top_k(&self, k: usize, clock: &dyn Clock) -> Vec<(String, ImportanceScore)> {
        let mut scored = self.apply_decay(clock);
        scored.sort_by(|a, b| b.1.final_score.total_cmp(&a.1.final_score));
        scored.truncate(k);
        scored
    }

    /// Nodes whose final score has fallen below `threshold` and have not
    /// been retrieved recently — candidates for archival or review prompts.
    pub fn neglected(&self, threshold: f64, clock: &dyn Clock) -> Vec<(String, ImportanceScore)> {
        self.apply_decay(clock)
            .into_iter()
            .filter(|(_, score)| score.final_score < threshold)
            .collect()
    }

    /// Nodes ranked by a blend of low recency and high base importance,
    /// suggesting they are due for a refresh even without FSRS scheduling.
    pub fn for_review(&self, limit: usize, clock: &dyn Clock) -> Vec<(String, ImportanceScore)> {
        let mut scored = self.apply_decay(clock);
        scored.sort_by(|a, b| {
            let a_key = a.1.base - a.1.recency;
            let b_key = b.1.base - b.1.recency;
            b_key.total_cmp(&a_key)
        });
        scored.truncate(limit);
        scored
    }
}
