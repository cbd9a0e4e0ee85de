//! Bi-temporal validity helpers shared by nodes and edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open validity window: `[valid_from, valid_until)`. Either bound may
/// be absent, meaning unbounded in that direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemporalRange {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl TemporalRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from(start: DateTime<Utc>) -> Self {
        Self {
            valid_from: Some(start),
            valid_until: None,
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        let after_start = self.valid_from.map(|t| time >= t).unwrap_or(true);
        let before_end = self.valid_until.map(|t| time < t).unwrap_or(true);
        after_start && before_end
    }

    /// Close the range at `end`, marking it no longer valid from that point on.
    pub fn close_at(&mut self, end: DateTime<Utc>) {
        self.valid_until = Some(end);
    }
}

/// Validity classification for a queried timestamp against a [`TemporalRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalValidity {
    /// Not yet valid at the queried time
    NotYetValid,
    /// Valid at the queried time
    Valid,
    /// No longer valid at the queried time
    Expired,
}

impl TemporalValidity {
    pub fn classify(range: &TemporalRange, time: DateTime<Utc>) -> Self {
        if let Some(from) = range.valid_from {
            if time < from {
                return TemporalValidity::NotYetValid;
            }
        }
        if let Some(until) = range.valid_until {
            if time >= until {
                return TemporalValidity::Expired;
            }
        }
        TemporalValidity::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unbounded_range_contains_everything() {
        let range = TemporalRange::unbounded();
        assert!(range.contains(Utc::now()));
    }

    #[test]
    fn range_excludes_before_start() {
        let now = Utc::now();
        let range = TemporalRange::from(now + Duration::days(1));
        assert!(!range.contains(now));
    }

    #[test]
    fn close_at_makes_range_expire() {
        let now = Utc::now();
        let mut range = TemporalRange::from(now - Duration::days(1));
        range.close_at(now);
        assert!(!range.contains(now));
        assert!(range.contains(now - Duration::hours(12)));
    }

    #[test]
    fn classify_distinguishes_states() {
        let now = Utc::now();
        let range = TemporalRange {
            valid_from: Some(now),
            valid_until: Some(now + Duration::days(1)),
        };
        assert_eq!(
            TemporalValidity::classify(&range, now - Duration::hours(1)),
            TemporalValidity::NotYetValid
        );
        assert_eq!(TemporalValidity::classify(&range, now), TemporalValidity::Valid);
        assert_eq!(
            TemporalValidity::classify(&range, now + Duration::days(2)),
            TemporalValidity::Expired
        );
    }
}
