//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INITIAL_DELAY_SECS, DEFAULT_JOB_TIMEOUT_SECS, DEFAULT_TIMEZONE};
use crate::impl_option_conversions;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub laundry: LaundryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "launder.db".to_string(), pool_size: default_pool_size() }
    }
}

fn default_pool_size() -> u32 {
    4
}

/// Laundering behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaundryConfig {
    /// Zone applied to events stored without one.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Whether random intervals draw once per event or once per endpoint.
    #[serde(default)]
    pub random_draw: RandomDrawPolicy,
    /// Secret for settings-form request tokens.
    #[serde(default, skip_serializing)]
    pub token_secret: Option<String>,
}

impl Default for LaundryConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            random_draw: RandomDrawPolicy::default(),
            token_secret: None,
        }
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Scheduling of the recurring laundry task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Delay between first setup and first run.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_seconds: u64,
    /// Timeout applied to a single laundry run.
    #[serde(default = "default_job_timeout")]
    pub job_timeout_seconds: u64,
    /// Run one pass immediately when the daemon starts.
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recurrence: Recurrence::default(),
            initial_delay_seconds: default_initial_delay(),
            job_timeout_seconds: default_job_timeout(),
            run_on_start: false,
        }
    }
}

fn default_initial_delay() -> u64 {
    DEFAULT_INITIAL_DELAY_SECS
}

fn default_job_timeout() -> u64 {
    DEFAULT_JOB_TIMEOUT_SECS
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How random intervals sample their offsets for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomDrawPolicy {
    /// Start and end each draw their own offset; durations may drift.
    #[default]
    PerEndpoint,
    /// One offset is drawn per event and applied to both endpoints.
    Shared,
}

impl_option_conversions!(RandomDrawPolicy {
    PerEndpoint => "per_endpoint",
    Shared => "shared",
});

/// Recurrence of the laundry task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Hourly,
    TwiceDaily,
    #[default]
    Daily,
}

impl_option_conversions!(Recurrence {
    Hourly => "hourly",
    TwiceDaily => "twicedaily",
    Daily => "daily",
});

impl Recurrence {
    /// Length of one recurrence period.
    pub fn period(self) -> chrono::Duration {
        match self {
            Self::Hourly => chrono::Duration::hours(1),
            Self::TwiceDaily => chrono::Duration::hours(12),
            Self::Daily => chrono::Duration::hours(24),
        }
    }
}
