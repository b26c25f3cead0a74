//! Metrics for the recurring laundry task
//!
//! ## Design
//! - **VecDeque ring buffer** of recent run durations (max 100)
//! - **Poison-safe locking** with explicit match pattern (no .expect())
//! - **MetricsResult returns** on record methods (currently always Ok)

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use launder_domain::LaundryReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

const MAX_DURATION_SAMPLES: usize = 100;

/// Counters and timings for laundry runs.
#[derive(Debug)]
pub struct LaundryMetrics {
    runs_completed: AtomicU64,
    runs_failed: AtomicU64,
    runs_timed_out: AtomicU64,
    /// Triggers dropped because a run was already in flight
    overlaps_skipped: AtomicU64,
    events_laundered: AtomicU64,
    events_skipped: AtomicU64,
    run_durations_ms: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of [`LaundryMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaundryMetricsSnapshot {
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub runs_timed_out: u64,
    pub overlaps_skipped: u64,
    pub events_laundered: u64,
    pub events_skipped: u64,
    pub average_run_ms: Option<f64>,
}

impl Default for LaundryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LaundryMetrics {
    pub fn new() -> Self {
        Self {
            runs_completed: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            runs_timed_out: AtomicU64::new(0),
            overlaps_skipped: AtomicU64::new(0),
            events_laundered: AtomicU64::new(0),
            events_skipped: AtomicU64::new(0),
            run_durations_ms: Mutex::new(VecDeque::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record a completed run and its per-event outcomes.
    pub fn record_run(&self, report: &LaundryReport, elapsed: Duration) -> MetricsResult<()> {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.events_laundered.fetch_add(report.laundered.len() as u64, Ordering::Relaxed);
        self.events_skipped.fetch_add(report.skipped.len() as u64, Ordering::Relaxed);
        self.record_duration(elapsed)
    }

    pub fn record_failure(&self) -> MetricsResult<()> {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_timeout(&self) -> MetricsResult<()> {
        self.runs_timed_out.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_overlap_skipped(&self) -> MetricsResult<()> {
        self.overlaps_skipped.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn record_duration(&self, elapsed: Duration) -> MetricsResult<()> {
        let ms = elapsed.as_millis() as u64;

        let mut durations = match self.run_durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "LaundryMetrics::run_durations_ms",
                    "Mutex poisoned during duration recording, recovering data"
                );
                poison_err.into_inner()
            }
        };

        durations.push_back(ms);
        if durations.len() > MAX_DURATION_SAMPLES {
            durations.pop_front();
        }

        Ok(())
    }

    /// Mean duration of the retained runs, in milliseconds.
    ///
    /// Returns `MetricsError::EmptyData` if no run has completed.
    pub fn average_run_ms(&self) -> MetricsResult<f64> {
        let durations = match self.run_durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "LaundryMetrics::run_durations_ms",
                    "Mutex poisoned during average read, recovering"
                );
                poison_err.into_inner()
            }
        };

        if durations.is_empty() {
            return Err(MetricsError::EmptyData { metric: "average" });
        }

        let total: u64 = durations.iter().sum();
        Ok(total as f64 / durations.len() as f64)
    }

    pub fn snapshot(&self) -> LaundryMetricsSnapshot {
        LaundryMetricsSnapshot {
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            runs_timed_out: self.runs_timed_out.load(Ordering::Relaxed),
            overlaps_skipped: self.overlaps_skipped.load(Ordering::Relaxed),
            events_laundered: self.events_laundered.load(Ordering::Relaxed),
            events_skipped: self.events_skipped.load(Ordering::Relaxed),
            average_run_ms: self.average_run_ms().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;
    use launder_domain::{EventId, SkipReason};

    use super::*;

    fn report(laundered: usize, skipped: usize) -> LaundryReport {
        let mut report = LaundryReport::new(Utc::now());
        for i in 0..laundered {
            report.record_laundered(EventId::new(format!("l{i}")));
        }
        for i in 0..skipped {
            report.record_skipped(EventId::new(format!("s{i}")), SkipReason::NoInterval);
        }
        report.scanned = laundered + skipped;
        report
    }

    #[test]
    fn test_record_run_accumulates_outcomes() {
        let metrics = LaundryMetrics::new();
        metrics.record_run(&report(3, 1), Duration::from_millis(40)).unwrap();
        metrics.record_run(&report(1, 2), Duration::from_millis(60)).unwrap();
        metrics.record_failure().unwrap();
        metrics.record_timeout().unwrap();
        metrics.record_overlap_skipped().unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs_completed, 2);
        assert_eq!(snapshot.events_laundered, 4);
        assert_eq!(snapshot.events_skipped, 3);
        assert_eq!(snapshot.runs_failed, 1);
        assert_eq!(snapshot.runs_timed_out, 1);
        assert_eq!(snapshot.overlaps_skipped, 1);
        assert_eq!(snapshot.average_run_ms, Some(50.0));
    }

    #[test]
    fn test_average_empty_returns_error() {
        let metrics = LaundryMetrics::new();
        assert!(matches!(
            metrics.average_run_ms(),
            Err(MetricsError::EmptyData { metric: "average" })
        ));
        assert_eq!(metrics.snapshot().average_run_ms, None);
    }

    #[test]
    fn test_duration_ring_buffer() {
        let metrics = LaundryMetrics::new();
        for ms in 0..150 {
            metrics.record_run(&report(0, 0), Duration::from_millis(ms)).unwrap();
        }

        let durations = match metrics.run_durations_ms.lock() {
            Ok(guard) => guard,
            Err(e) => e.into_inner(),
        };
        assert_eq!(durations.len(), MAX_DURATION_SAMPLES);
        assert_eq!(durations[0], 50);
        assert_eq!(durations[99], 149);
    }

    #[test]
    fn test_poison_recovery_during_record() {
        let metrics = Arc::new(LaundryMetrics::new());

        let metrics_clone = Arc::clone(&metrics);
        let _ = thread::spawn(move || {
            let _guard = metrics_clone.run_durations_ms.lock().unwrap();
            panic!("intentional poison");
        })
        .join();

        let result = metrics.record_run(&report(1, 0), Duration::from_millis(10));
        assert!(result.is_ok(), "Should recover from poison");
        assert_eq!(metrics.average_run_ms().unwrap(), 10.0);
    }
}
