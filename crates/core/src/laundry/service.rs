//! Laundry service - one pass over all expired events

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use launder_domain::constants::DEFAULT_TIMEZONE;
use launder_domain::{
    EventId, LaunderError, LaunderedDates, LaundryReport, Result, SkipReason, StoredEventDates,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::launderer::DateLaunderer;
use super::ports::{EventDateStore, ExpiredEventScanner, KnownRangeTracker, SettingsStore};

/// Runs the laundry over every expired, opted-in event.
///
/// Each event is handled on its own: a failure is recorded in the report
/// and the pass moves on. Only a failing scan aborts the run.
pub struct LaundryService {
    scanner: Arc<dyn ExpiredEventScanner>,
    settings: Arc<dyn SettingsStore>,
    dates: Arc<dyn EventDateStore>,
    known_range: Arc<dyn KnownRangeTracker>,
    launderer: DateLaunderer,
    default_timezone: String,
    rng: Mutex<StdRng>,
}

impl LaundryService {
    pub fn new(
        scanner: Arc<dyn ExpiredEventScanner>,
        settings: Arc<dyn SettingsStore>,
        dates: Arc<dyn EventDateStore>,
        known_range: Arc<dyn KnownRangeTracker>,
        launderer: DateLaunderer,
    ) -> Self {
        Self {
            scanner,
            settings,
            dates,
            known_range,
            launderer,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Zone used for events stored without one.
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    /// Seed the random source so random intervals are reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn launderer(&self) -> &DateLaunderer {
        &self.launderer
    }

    /// Launder everything that has expired as of the current instant.
    pub async fn process_laundry(&self) -> Result<LaundryReport> {
        self.process_laundry_at(Utc::now()).await
    }

    /// Launder everything that has expired as of `now`. Dates are rebased
    /// onto `now`'s UTC calendar date.
    pub async fn process_laundry_at(&self, now: DateTime<Utc>) -> Result<LaundryReport> {
        let expired = self.scanner.find_expired(now).await?;
        let mut report = LaundryReport::new(now);
        report.scanned = expired.len();
        info!(expired = expired.len(), run_at = %now, "starting laundry pass");

        let today = now.date_naive();
        for id in expired {
            match self.launder_event(&id, today).await {
                Ok(()) => report.record_laundered(id),
                Err(reason) => {
                    warn!(event_id = %id, reason = %reason, "event skipped");
                    report.record_skipped(id, reason);
                }
            }
        }

        info!(
            scanned = report.scanned,
            laundered = report.laundered.len(),
            skipped = report.skipped.len(),
            "laundry pass finished"
        );
        Ok(report)
    }

    async fn launder_event(
        &self,
        id: &EventId,
        today: NaiveDate,
    ) -> std::result::Result<(), SkipReason> {
        let interval = self.settings.get_interval(id).await.map_err(storage_failure)?;
        let Some(interval) = interval.filter(|key| !key.trim().is_empty()) else {
            return Err(SkipReason::NoInterval);
        };

        let stored = match self.dates.load_dates(id).await {
            Ok(Some(stored)) => stored,
            Ok(None) | Err(LaunderError::NotFound(_)) => return Err(SkipReason::NotFound),
            Err(err) => return Err(storage_failure(err)),
        };

        let laundered = self.compute(stored, interval.trim(), today).map_err(|err| match err {
            LaunderError::UnknownInterval(key) => SkipReason::UnknownInterval(key),
            LaunderError::Conversion(detail) => SkipReason::Conversion(detail),
            other => SkipReason::Conversion(other.to_string()),
        })?;

        self.dates.write_dates(id, &laundered).await.map_err(storage_failure)?;
        debug!(
            event_id = %id,
            interval = %interval,
            start = %laundered.start_utc,
            end = %laundered.end_utc,
            "event laundered"
        );

        if let Err(err) = self.known_range.update_known_range(id).await {
            warn!(event_id = %id, error = %err, "failed to update known range");
        }
        Ok(())
    }

    fn compute(
        &self,
        mut stored: StoredEventDates,
        interval: &str,
        today: NaiveDate,
    ) -> Result<LaunderedDates> {
        if stored.timezone.trim().is_empty() {
            stored.timezone = self.default_timezone.clone();
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.launderer.launder_stored(&stored, interval, today, &mut *rng)
    }
}

fn storage_failure(err: LaunderError) -> SkipReason {
    SkipReason::Storage(err.to_string())
}
