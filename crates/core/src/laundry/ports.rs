//! Port interfaces for the laundry
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launder_domain::{EventId, LaunderedDates, Result, StoredEventDates};

use super::schedule::LaundrySchedule;

/// Finds events that have ended and opted into laundering.
#[async_trait]
pub trait ExpiredEventScanner: Send + Sync {
    /// Ids of events with laundry enabled whose UTC end is strictly before
    /// `now`. Order is unspecified.
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<EventId>>;
}

/// Per-event laundry settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_enabled(&self, id: &EventId) -> Result<bool>;

    async fn get_interval(&self, id: &EventId) -> Result<Option<String>>;

    async fn set_enabled(&self, id: &EventId, enabled: bool) -> Result<()>;

    async fn set_interval(&self, id: &EventId, interval: &str) -> Result<()>;
}

/// Reads and writes the date fields of an event.
#[async_trait]
pub trait EventDateStore: Send + Sync {
    /// `None` when the event does not exist.
    async fn load_dates(&self, id: &EventId) -> Result<Option<StoredEventDates>>;

    /// Replace start/end in both UTC and local form.
    async fn write_dates(&self, id: &EventId, dates: &LaunderedDates) -> Result<()>;
}

/// Keeps the calendar's earliest/latest bookkeeping current.
#[async_trait]
pub trait KnownRangeTracker: Send + Sync {
    /// Fold the event's current dates into the known range.
    async fn update_known_range(&self, id: &EventId) -> Result<()>;

    /// Recompute the range from every stored event.
    async fn rebuild_known_range(&self) -> Result<()>;
}

/// Persistence for the recurring task's first activation.
#[async_trait]
pub trait ScheduleAnchorStore: Send + Sync {
    async fn load_anchor(&self, task: &str) -> Result<Option<LaundrySchedule>>;

    async fn save_anchor(&self, task: &str, schedule: &LaundrySchedule) -> Result<()>;

    /// Returns whether an anchor was removed.
    async fn clear_anchor(&self, task: &str) -> Result<bool>;
}

/// Registers the recurring laundry task with a scheduler.
#[async_trait]
pub trait SchedulerTrigger: Send + Sync {
    /// Idempotent: an existing registration is kept.
    async fn ensure_scheduled(&self) -> Result<LaundrySchedule>;
}
