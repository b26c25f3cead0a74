//! Event projections
//!
//! The laundry never owns events. It reads a projection of the stored date
//! fields and writes back a [`LaunderedDates`] value.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DB_DATETIME_FORMAT;

/// Opaque, unique event identifier assigned by the event store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Date fields exactly as the store holds them.
///
/// Values are kept as raw strings so that malformed rows surface as
/// conversion failures during laundering instead of failing the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEventDates {
    pub start_utc: String,
    pub end_utc: String,
    pub timezone: String,
}

/// New dates computed for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunderedDates {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    /// Wall-clock start in the event's timezone
    pub start_local: NaiveDateTime,
    /// Wall-clock end in the event's timezone
    pub end_local: NaiveDateTime,
    /// Zone the local values were computed in
    pub timezone: String,
}

impl LaunderedDates {
    pub fn start_utc_db(&self) -> String {
        self.start_utc.format(DB_DATETIME_FORMAT).to_string()
    }

    pub fn end_utc_db(&self) -> String {
        self.end_utc.format(DB_DATETIME_FORMAT).to_string()
    }

    pub fn start_local_db(&self) -> String {
        self.start_local.format(DB_DATETIME_FORMAT).to_string()
    }

    pub fn end_local_db(&self) -> String {
        self.end_local.format(DB_DATETIME_FORMAT).to_string()
    }
}

/// Full stored row for an event, used when seeding or inspecting a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub start_utc: String,
    pub end_utc: String,
    pub start_local: Option<String>,
    pub end_local: Option<String>,
    pub timezone: String,
    pub laundry_enabled: bool,
    pub laundry_interval: Option<String>,
}

impl EventRecord {
    /// Minimal record with UTC dates only; laundry disabled.
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        start_utc: impl Into<String>,
        end_utc: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_utc: start_utc.into(),
            end_utc: end_utc.into(),
            start_local: None,
            end_local: None,
            timezone: timezone.into(),
            laundry_enabled: false,
            laundry_interval: None,
        }
    }

    /// Opt the record into laundering with the given interval key.
    pub fn with_laundry(mut self, interval: impl Into<String>) -> Self {
        self.laundry_enabled = true;
        self.laundry_interval = Some(interval.into());
        self
    }

    pub fn stored_dates(&self) -> StoredEventDates {
        StoredEventDates {
            start_utc: self.start_utc.clone(),
            end_utc: self.end_utc.clone(),
            timezone: self.timezone.clone(),
        }
    }
}

/// Earliest start and latest end across all known events (local time).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub earliest_event: Option<EventId>,
    pub latest_event: Option<EventId>,
}
