//! FSRS-6 (Free Spaced Repetition Scheduler) Module
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! 21 parameters with a personalizable forgetting curve decay (w20) and
//! a separate short-term equation for same-day reviews.
//!
//! Core formulas:
//! - Retrievability: R = (1 + FACTOR * t / S)^(-w20) where FACTOR = 0.9^(-1/w20) - 1
//! - Interval: t = S/FACTOR * (R^(-1/w20) - 1)

mod algorithm;
mod scheduler;

pub use algorithm::{
    DEFAULT_DECAY, DEFAULT_DESIRED_RETENTION, DEFAULT_PARAMETERS, FsrsWeights, LearningState,
    PARAM_COUNT, Rating, forgetting_factor, fuzz_interval, initial_difficulty, initial_stability,
    next_difficulty, next_interval, retrievability, sentiment_boost, short_term_stability,
    stability_after_lapse, stability_after_recall,
};
pub use scheduler::{FSRSParameters, FSRSScheduler, FSRSState, PreviewResults, ReviewResult};
