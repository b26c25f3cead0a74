//! Domain types and models
//!
//! Projections of calendar events owned by the external store, laundering
//! results, and the per-event settings exchanged with the settings panel.

pub mod event;
pub mod laundry;
pub mod settings;

pub use event::{EventId, EventRecord, KnownRange, LaunderedDates, StoredEventDates};
pub use laundry::{LaundryReport, SkipReason, SkippedEvent};
pub use settings::{IntervalOption, LaundrySettings, SettingsSubmission};
