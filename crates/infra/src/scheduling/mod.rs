//! Scheduling runtime for the recurring laundry task
//!
//! The scheduler follows explicit lifecycle rules:
//! - start/stop with timeouts on every async operation
//! - join handles for spawned tasks
//! - cancellation token support

pub mod error;
pub mod laundry_scheduler;

pub use error::{CronStage, SchedulerError, SchedulerResult};
pub use laundry_scheduler::{LaundryScheduler, LaundrySchedulerConfig};
