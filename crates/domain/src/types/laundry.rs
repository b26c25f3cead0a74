//! Laundry run results

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::EventId;

/// Why an expired event was left untouched during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Laundry is enabled but no interval was chosen.
    NoInterval,
    /// The chosen interval is not in the catalog.
    UnknownInterval(String),
    /// Stored dates or timezone could not be converted.
    Conversion(String),
    /// The scanner returned an id the store no longer knows.
    NotFound,
    /// Reading settings or writing the new dates failed.
    Storage(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInterval => write!(f, "no interval selected"),
            Self::UnknownInterval(key) => write!(f, "unknown interval '{key}'"),
            Self::Conversion(detail) => write!(f, "conversion failed: {detail}"),
            Self::NotFound => write!(f, "event not found"),
            Self::Storage(detail) => write!(f, "storage failure: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEvent {
    pub id: EventId,
    pub reason: SkipReason,
}

/// Outcome of one pass over the expired events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaundryReport {
    pub run_at: DateTime<Utc>,
    pub scanned: usize,
    pub laundered: Vec<EventId>,
    pub skipped: Vec<SkippedEvent>,
}

impl LaundryReport {
    pub fn new(run_at: DateTime<Utc>) -> Self {
        Self { run_at, scanned: 0, laundered: Vec::new(), skipped: Vec::new() }
    }

    pub fn record_laundered(&mut self, id: EventId) {
        self.laundered.push(id);
    }

    pub fn record_skipped(&mut self, id: EventId, reason: SkipReason) {
        self.skipped.push(SkippedEvent { id, reason });
    }

    /// Skip reason recorded for `id`, if it was skipped.
    pub fn skip_reason(&self, id: &EventId) -> Option<&SkipReason> {
        self.skipped.iter().find(|skipped| &skipped.id == id).map(|skipped| &skipped.reason)
    }

    pub fn was_laundered(&self, id: &EventId) -> bool {
        self.laundered.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_outcomes_per_event() {
        let mut report = LaundryReport::new(Utc::now());
        report.scanned = 2;
        report.record_laundered(EventId::from("1"));
        report.record_skipped(EventId::from("2"), SkipReason::NoInterval);

        assert!(report.was_laundered(&EventId::from("1")));
        assert_eq!(report.skip_reason(&EventId::from("2")), Some(&SkipReason::NoInterval));
        assert_eq!(report.skip_reason(&EventId::from("1")), None);
    }

    #[test]
    fn skip_reason_serializes_with_tag() {
        let json = serde_json::to_value(SkipReason::UnknownInterval("weekly".into())).unwrap();
        assert_eq!(json["reason"], "unknown_interval");
        assert_eq!(json["detail"], "weekly");
    }
}
