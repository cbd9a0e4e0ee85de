//! Virtualizable time source
//!
//! Every component that needs "now" takes `&dyn Clock` instead of calling
//! `Utc::now()` directly, so decay/scheduling behavior can be driven
//! deterministically in tests (see `VirtualClock`).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wraps `Utc::now()`. Used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A single jump recorded by `VirtualClock`, for debugging time travel in tests.
#[derive(Debug, Clone, Copy)]
pub struct ClockJump {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub at_call: usize,
}

/// A clock whose value is set explicitly. Lets tests simulate the passage of
/// days or weeks without sleeping.
pub struct VirtualClock {
    current: Mutex<DateTime<Utc>>,
    history: Mutex<Vec<ClockJump>>,
    call_count: Mutex<usize>,
}

impl VirtualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
            history: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// Jump directly to `ts`.
    pub fn set(&self, ts: DateTime<Utc>) {
        self.record_jump(ts);
    }

    /// Move the clock forward by `delta`. `delta` may be negative.
    pub fn advance(&self, delta: Duration) {
        let next = *self.current.lock().expect("clock mutex poisoned") + delta;
        self.record_jump(next);
    }

    /// Jump to a specific timestamp (alias of `set`, reads better at call sites
    /// that are advancing *to* a point in time rather than *by* a duration).
    pub fn advance_to(&self, ts: DateTime<Utc>) {
        self.record_jump(ts);
    }

    /// The full jump history, oldest first.
    pub fn history(&self) -> Vec<ClockJump> {
        self.history.lock().expect("clock mutex poisoned").clone()
    }

    fn record_jump(&self, to: DateTime<Utc>) {
        let mut current = self.current.lock().expect("clock mutex poisoned");
        let from = *current;
        *current = to;
        drop(current);

        let mut count = self.call_count.lock().expect("clock mutex poisoned");
        *count += 1;
        self.history.lock().expect("clock mutex poisoned").push(ClockJump {
            from,
            to,
            at_call: *count,
        });
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("clock mutex poisoned")
    }
}
