//! Application constants
//!
//! Centralized location for the stable names shared by the laundry service,
//! the settings panel and the storage adapters.

// Per-event settings keys
pub const LAUNDRY_ENABLED: &str = "tec-laundry-enabled";
pub const LAUNDRY_INTERVAL: &str = "tec-laundry-interval";

// Recurring task
pub const LAUNDRY_PROCESS: &str = "tec-laundry-process";
pub const DEFAULT_INITIAL_DELAY_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 300;

// Settings form
pub const FORM_ENABLE_FIELD: &str = "tec-laundry-enable";
pub const FORM_INTERVAL_FIELD: &str = "tec-laundry-interval";
pub const FORM_TOKEN_FIELD: &str = "event-laundromat-check";
pub const SETTINGS_TOKEN_ACTION: &str = "update-event-laundry-settings";
pub const SETTINGS_PANEL_ID: &str = "tec-launder-event";
pub const SETTINGS_PANEL_TITLE: &str = "Laundry Settings";

// Built-in interval keys, in catalog order
pub const INTERVAL_TODAY: &str = "today";
pub const INTERVAL_NEXT_DAY: &str = "next_day";
pub const INTERVAL_SAME_NEXT_WEEK: &str = "same_next_week";
pub const INTERVAL_RANDOM_NEXT_WEEK: &str = "random_next_week";
pub const INTERVAL_SAME_NEXT_MONTH: &str = "same_next_month";
pub const INTERVAL_RANDOM_NEXT_MONTH: &str = "random_next_month";
pub const INTERVAL_SAME_NEXT_YEAR: &str = "same_next_year";

/// Storage format for event datetimes (`YYYY-MM-DD HH:MM:SS`).
pub const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timezone used when an event carries none and configuration is silent.
pub const DEFAULT_TIMEZONE: &str = "UTC";
