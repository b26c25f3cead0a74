//! # Event Laundry Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The interval catalog and the date launderer
//! - Schedule arithmetic for the recurring laundry task
//! - Port/adapter interfaces (traits) for the event store, settings store,
//!   known-range bookkeeping, schedule persistence and request tokens
//! - The laundry and settings services
//!
//! ## Architecture Principles
//! - Only depends on `launder-domain`
//! - No database, scheduler runtime, or rendering framework code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod laundry;
pub mod settings;

// Re-export specific items to avoid ambiguity
pub use laundry::catalog::{
    DateOffset, FixedOffsetRule, IntervalCatalog, IntervalRule, RandomWindowRule,
};
pub use laundry::launderer::DateLaunderer;
pub use laundry::ports::{
    EventDateStore, ExpiredEventScanner, KnownRangeTracker, ScheduleAnchorStore, SchedulerTrigger,
    SettingsStore,
};
pub use laundry::schedule::{ensure_anchor, LaundrySchedule};
pub use laundry::timezone::EventTimezone;
pub use laundry::LaundryService;
pub use settings::ports::{IntervalSelectorRenderer, RequestTokenGuard};
pub use settings::selector::HtmlSelectRenderer;
pub use settings::SettingsService;
