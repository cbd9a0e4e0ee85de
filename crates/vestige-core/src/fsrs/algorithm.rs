//! FSRS-6 forgetting curve and stability update equations.
//!
//! Implements the free spaced repetition scheduler, version 6: a power-law
//! forgetting curve parameterized by 21 weights, with difficulty mean
//! reversion and separate stability-update equations for successful recall
//! and lapse. Sentiment is folded in as a stability multiplier on top of the
//! stock equations (see [`sentiment_boost`]).

use serde::{Deserialize, Serialize};

/// Number of weights in the FSRS-6 parameter vector.
pub const PARAM_COUNT: usize = 21;

/// Default FSRS-6 parameters, as published by the `open-spaced-repetition`
/// project's reference implementation.
pub const DEFAULT_PARAMETERS: [f64; PARAM_COUNT] = [
    0.2172, 1.1771, 3.2602, 16.1507, 7.0114, 0.57, 2.0966, 0.0069, 1.5261, 0.112, 1.0178, 1.849,
    0.1133, 0.3127, 2.2934, 0.2191, 3.0004, 0.7536, 0.3332, 0.1437, 0.1542,
];

/// Default target probability of recall used to compute the next interval.
pub const DEFAULT_DESIRED_RETENTION: f64 = 0.9;

/// `w[20]`, the forgetting-curve decay exponent.
pub const DEFAULT_DECAY: f64 = 0.1542;

const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 10.0;
const MIN_STABILITY: f64 = 0.1;

/// A user's recall rating for a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_lapse(self) -> bool {
        matches!(self, Rating::Again)
    }
}

/// The four FSRS learning states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

/// The FSRS-6 weight vector, boxed behind a named type so call sites read
/// `&FsrsWeights` instead of `&[f64; 21]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsrsWeights(pub [f64; PARAM_COUNT]);

impl Default for FsrsWeights {
    fn default() -> Self {
        FsrsWeights(DEFAULT_PARAMETERS)
    }
}

impl FsrsWeights {
    fn w(&self, i: usize) -> f64 {
        self.0[i]
    }
}

fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

fn clamp_stability(s: f64) -> f64 {
    s.max(MIN_STABILITY)
}

/// `F` in the retrievability equation, derived from the decay exponent so
/// that `R(t=S) == 0.9` holds exactly.
pub fn forgetting_factor(decay: f64) -> f64 {
    0.9f64.powf(-1.0 / decay) - 1.0
}

/// Probability of recall after `elapsed_days` given `stability`, using decay
/// exponent `w[20]`.
pub fn retrievability(elapsed_days: f64, stability: f64, decay: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let elapsed_days = elapsed_days.max(0.0);
    let factor = forgetting_factor(decay);
    (1.0 + factor * elapsed_days / stability).powf(-decay)
}

/// Initial stability for a brand-new card, indexed by first rating.
pub fn initial_stability(weights: &FsrsWeights, rating: Rating) -> f64 {
    clamp_stability(weights.w(rating.as_i32() as usize - 1))
}

/// Initial difficulty for a brand-new card, from first rating.
pub fn initial_difficulty(weights: &FsrsWeights, rating: Rating) -> f64 {
    let d0 = weights.w(4) - (rating.as_i32() as f64 - 3.0) * weights.w(5);
    clamp_difficulty(d0)
}

/// Difficulty after a review, mean-reverting toward the easiest difficulty.
pub fn next_difficulty(weights: &FsrsWeights, difficulty: f64, rating: Rating) -> f64 {
    let delta_d = -weights.w(6) * (rating.as_i32() as f64 - 3.0);
    let d_prime = difficulty + delta_d * ((10.0 - difficulty) / 9.0);
    let d_easy = initial_difficulty(weights, Rating::Easy);
    let reverted = weights.w(7) * d_easy + (1.0 - weights.w(7)) * d_prime;
    clamp_difficulty(reverted)
}

/// Stability after a successful recall (rating Hard/Good/Easy).
pub fn stability_after_recall(
    weights: &FsrsWeights,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    rating: Rating,
) -> f64 {
    let hard_penalty = if rating == Rating::Hard { weights.w(15) } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { weights.w(16) } else { 1.0 };

    let growth = (weights.w(8)).exp()
        * (11.0 - difficulty)
        * stability.powf(-weights.w(9))
        * (((1.0 - retrievability) * weights.w(10)).exp() - 1.0)
        * hard_penalty
        * easy_bonus
        + 1.0;

    clamp_stability(stability * growth)
}

/// Stability after a lapse (rating Again).
pub fn stability_after_lapse(
    weights: &FsrsWeights,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
) -> f64 {
    let next = weights.w(11)
        * difficulty.powf(-weights.w(12))
        * ((stability + 1.0).powf(weights.w(13)) - 1.0)
        * ((1.0 - retrievability) * weights.w(14)).exp();
    clamp_stability(next.min(stability))
}

/// Stability used for same-day reviews (short-term schedule), independent of
/// the main recall/lapse equations.
pub fn short_term_stability(weights: &FsrsWeights, stability: f64, rating: Rating) -> f64 {
    let increase = (weights.w(17) * (rating.as_i32() as f64 - 3.0 + weights.w(18))).exp()
        * stability.powf(-weights.w(19));
    clamp_stability(stability * increase.max(0.0))
}

/// Multiplies the post-recall stability growth by a sentiment-derived boost.
/// `sentiment_magnitude` is expected in `[0, 1]`; `k` defaults to `0.15`.
pub fn sentiment_boost(base_stability: f64, sentiment_magnitude: f64, k: f64) -> f64 {
    clamp_stability(base_stability * (1.0 + k * sentiment_magnitude.clamp(0.0, 1.0)))
}

/// Interval (in days) to schedule the next review so that predicted
/// retrievability at that point equals `desired_retention`.
pub fn next_interval(stability: f64, desired_retention: f64, decay: f64) -> f64 {
    let factor = forgetting_factor(decay);
    let retention = desired_retention.clamp(0.01, 0.999);
    (stability / factor) * (retention.powf(-1.0 / decay) - 1.0)
}

/// Applies a uniform fuzz factor in `[0.95, 1.05]` to an interval, given a
/// pre-sampled `fuzz_factor` in `[0, 1)` (callers supply randomness so this
/// stays deterministic and testable).
pub fn fuzz_interval(interval_days: f64, fuzz_factor: f64) -> f64 {
    let factor = 0.95 + fuzz_factor.clamp(0.0, 1.0) * 0.10;
    (interval_days * factor).max(1.0)
}
