//! Per-card FSRS scheduling: applies the algorithm equations to a
//! [`FsrsState`] and produces the next state plus a human-readable preview of
//! what each possible rating would do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    self, DEFAULT_DECAY, DEFAULT_DESIRED_RETENTION, FsrsWeights, LearningState, Rating,
    initial_difficulty, initial_stability, next_difficulty, retrievability, short_term_stability,
    stability_after_lapse, stability_after_recall,
};

/// Tunable parameters for a scheduler instance. Distinct from the raw FSRS
/// weight vector so callers can also vary retention target and sentiment
/// sensitivity independently of the forgetting-curve weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FSRSParameters {
    pub weights: FsrsWeights,
    pub desired_retention: f64,
    pub decay: f64,
    /// Sentiment-stability coupling constant (see `algorithm::sentiment_boost`).
    pub sentiment_k: f64,
}

impl Default for FSRSParameters {
    fn default() -> Self {
        Self {
            weights: FsrsWeights::default(),
            desired_retention: DEFAULT_DESIRED_RETENTION,
            decay: DEFAULT_DECAY,
            sentiment_k: 0.15,
        }
    }
}

/// The scheduling-relevant fields of a memory node, independent of its
/// content. Mirrors what FSRS needs to know to grade the next review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FSRSState {
    pub state: LearningState,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: u32,
    pub lapses: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub scheduled_days: f64,
}

impl Default for FSRSState {
    fn default() -> Self {
        Self {
            state: LearningState::New,
            stability: 0.0,
            difficulty: 0.0,
            reps: 0,
            lapses: 0,
            last_review: None,
            scheduled_days: 0.0,
        }
    }
}

/// Outcome of grading one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub state: FSRSState,
    pub retrievability_before_review: f64,
    pub interval_days: f64,
    pub next_review: DateTime<Utc>,
}

/// What each of the four ratings would do to the card, without committing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResults {
    pub again: ReviewResult,
    pub hard: ReviewResult,
    pub good: ReviewResult,
    pub easy: ReviewResult,
}

/// Stateless scheduler: owns the parameter set, takes `FSRSState` by value.
#[derive(Debug, Clone)]
pub struct FSRSScheduler {
    params: FSRSParameters,
}

impl Default for FSRSScheduler {
    fn default() -> Self {
        Self::new(FSRSParameters::default())
    }
}

impl FSRSScheduler {
    pub fn new(params: FSRSParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &FSRSParameters {
        &self.params
    }

    /// Elapsed days between the last review and `now`. Zero for a new card.
    fn elapsed_days(&self, state: &FSRSState, now: DateTime<Utc>) -> f64 {
        match state.last_review {
            Some(last) => (now - last).num_seconds().max(0) as f64 / 86_400.0,
            None => 0.0,
        }
    }

    /// Retrievability of `state` at `now`, given no review yet.
    pub fn current_retrievability(&self, state: &FSRSState, now: DateTime<Utc>) -> f64 {
        if state.stability <= 0.0 {
            return 0.0;
        }
        let elapsed = self.elapsed_days(state, now);
        retrievability(elapsed, state.stability, self.params.decay)
    }

    /// Grades a review and returns the resulting state plus scheduling info.
    /// `sentiment_magnitude` in `[0,1]`, 0 when the content carries no
    /// emotional signal.
    pub fn review(
        &self,
        state: &FSRSState,
        rating: Rating,
        now: DateTime<Utc>,
        sentiment_magnitude: f64,
    ) -> ReviewResult {
        let weights = &self.params.weights;
        let r_before = self.current_retrievability(state, now);
        let same_day = state
            .last_review
            .map(|last| (now - last).num_hours() < 24)
            .unwrap_or(false);

        let (next_difficulty_val, next_stability) = if state.reps == 0 && state.last_review.is_none() {
            (
                initial_difficulty(weights, rating),
                initial_stability(weights, rating),
            )
        } else if same_day {
            (
                next_difficulty(weights, state.difficulty, rating),
                short_term_stability(weights, state.stability, rating),
            )
        } else if rating.is_lapse() {
            (
                next_difficulty(weights, state.difficulty, rating),
                stability_after_lapse(weights, state.difficulty, state.stability, r_before),
            )
        } else {
            (
                next_difficulty(weights, state.difficulty, rating),
                stability_after_recall(weights, state.difficulty, state.stability, r_before, rating),
            )
        };

        let boosted_stability =
            algorithm::sentiment_boost(next_stability, sentiment_magnitude, self.params.sentiment_k);

        let next_learning_state = match (state.state, rating) {
            (_, Rating::Again) => LearningState::Relearning,
            (LearningState::New, _) => LearningState::Learning,
            (LearningState::Learning, Rating::Hard) => LearningState::Learning,
            (LearningState::Relearning, Rating::Hard) => LearningState::Relearning,
            _ => LearningState::Review,
        };

        let interval_days = if next_learning_state == LearningState::Review {
            algorithm::next_interval(boosted_stability, self.params.desired_retention, self.params.decay)
                .max(1.0)
        } else {
            // Learning/relearning cards get a short fixed re-check rather than
            // the full forgetting-curve interval.
            if rating.is_lapse() { 1.0 / 24.0 } else { 1.0 }
        };

        let new_state = FSRSState {
            state: next_learning_state,
            stability: boosted_stability,
            difficulty: next_difficulty_val,
            reps: state.reps + 1,
            lapses: state.lapses + if rating.is_lapse() { 1 } else { 0 },
            last_review: Some(now),
            scheduled_days: interval_days,
        };

        let next_review = now + chrono::Duration::seconds((interval_days * 86_400.0) as i64);

        ReviewResult {
            state: new_state,
            retrievability_before_review: r_before,
            interval_days,
            next_review,
        }
    }

    /// Computes all four possible outcomes without mutating anything, used
    /// to show a user what each rating button would do.
    pub fn preview(&self, state: &FSRSState, now: DateTime<Utc>, sentiment_magnitude: f64) -> PreviewResults {
        PreviewResults {
            again: self.review(state, Rating::Again, now, sentiment_magnitude),
            hard: self.review(state, Rating::Hard, now, sentiment_magnitude),
            good: self.review(state, Rating::Good, now, sentiment_magnitude),
            easy: self.review(state, Rating::Easy, now, sentiment_magnitude),
        }
    }
}
