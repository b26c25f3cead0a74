//! Observability for the laundry daemon
//!
//! - [`logging`]: global `tracing` subscriber setup
//! - [`metrics`]: counters and run timings for the laundry task
//!
//! All mutex locks use explicit poison recovery:
//!
//! ```ignore
//! let guard = match mutex.lock() {
//!     Ok(guard) => guard,
//!     Err(poison_err) => {
//!         tracing::warn!("Mutex poisoned, recovering");
//!         poison_err.into_inner()
//!     }
//! };
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{LaundryMetrics, LaundryMetricsSnapshot};

/// Metrics error type
///
/// Record methods return `MetricsResult<()>` and currently always succeed.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "average")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
