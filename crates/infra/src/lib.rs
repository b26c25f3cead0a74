//! # Event Laundry Infrastructure
//!
//! Infrastructure implementations of core laundry ports.
//!
//! This crate contains:
//! - SQLite repositories for events, settings, known range and schedules
//! - The cron-based scheduler runtime for the laundry task
//! - The BLAKE3 request token guard for the settings form
//! - Configuration loading, logging setup and metrics
//!
//! ## Architecture
//! - Implements traits defined in `launder-core`
//! - Depends on `launder-domain` and `launder-core`
//! - Contains all "impure" code (I/O, clocks, randomness sources)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod scheduling;
pub mod security;

// Re-export commonly used items
pub use database::{DbManager, SqliteEventRepository, SqliteScheduleRepository};
pub use errors::InfraError;
pub use observability::{init_tracing, LaundryMetrics};
pub use scheduling::{LaundryScheduler, LaundrySchedulerConfig, SchedulerError};
pub use security::Blake3RequestTokenGuard;
