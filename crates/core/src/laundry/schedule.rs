//! Recurring laundry schedule
//!
//! A schedule is an anchor instant plus a recurrence. The anchor is the
//! first activation; later activations fall on whole periods after it.

use chrono::{DateTime, Duration, Timelike, Utc};
use launder_domain::{Recurrence, Result};
use tracing::{debug, info};

use super::ports::ScheduleAnchorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaundrySchedule {
    pub anchor: DateTime<Utc>,
    pub recurrence: Recurrence,
}

impl LaundrySchedule {
    pub fn new(anchor: DateTime<Utc>, recurrence: Recurrence) -> Self {
        Self { anchor: anchor.with_nanosecond(0).unwrap_or(anchor), recurrence }
    }

    /// Schedule whose first activation is `initial_delay` after `now`.
    pub fn starting_after(
        now: DateTime<Utc>,
        initial_delay: Duration,
        recurrence: Recurrence,
    ) -> Self {
        Self::new(now + initial_delay, recurrence)
    }

    /// First activation strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now < self.anchor {
            return self.anchor;
        }
        let period = self.recurrence.period().num_seconds();
        let elapsed = (now - self.anchor).num_seconds();
        let periods = elapsed / period + 1;
        self.anchor + Duration::seconds(periods * period)
    }

    /// Whether a trigger at `now` is at or after the first activation.
    /// One second of slack absorbs scheduler jitter.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(1) >= self.anchor
    }

    /// Six-field cron expression (`sec min hour dom mon dow`, UTC) firing on
    /// the anchor's time of day at this recurrence.
    pub fn cron_expression(&self) -> String {
        let (sec, min, hour) = (self.anchor.second(), self.anchor.minute(), self.anchor.hour());
        match self.recurrence {
            Recurrence::Hourly => format!("{sec} {min} * * * *"),
            Recurrence::TwiceDaily => {
                let other = (hour + 12) % 24;
                format!("{sec} {min} {},{} * * *", hour.min(other), hour.max(other))
            }
            Recurrence::Daily => format!("{sec} {min} {hour} * * *"),
        }
    }
}

/// Load the persisted schedule for `task`, creating it when absent.
///
/// Returns the schedule and whether it was created by this call. An
/// existing schedule is kept as is, so repeated setup never adds a second
/// registration or moves the first activation.
pub async fn ensure_anchor(
    store: &dyn ScheduleAnchorStore,
    task: &str,
    now: DateTime<Utc>,
    initial_delay: Duration,
    recurrence: Recurrence,
) -> Result<(LaundrySchedule, bool)> {
    if let Some(existing) = store.load_anchor(task).await? {
        if existing.recurrence != recurrence {
            debug!(
                task,
                stored = %existing.recurrence,
                configured = %recurrence,
                "keeping stored recurrence"
            );
        }
        return Ok((existing, false));
    }

    let schedule = LaundrySchedule::starting_after(now, initial_delay, recurrence);
    store.save_anchor(task, &schedule).await?;
    info!(task, first_run = %schedule.anchor, recurrence = %recurrence, "laundry task scheduled");
    Ok((schedule, true))
}
