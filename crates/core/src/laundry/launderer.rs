//! Date laundering
//!
//! Given an expired event's dates, produce new ones: each UTC endpoint keeps
//! its time of day, is moved onto today's date and then shifted by the
//! interval's offset. Local wall-clock values are derived in the event's
//! timezone afterwards.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use launder_domain::constants::DB_DATETIME_FORMAT;
use launder_domain::{LaunderError, LaunderedDates, RandomDrawPolicy, Result, StoredEventDates};
use rand::RngCore;

use super::catalog::{DateOffset, IntervalCatalog, IntervalRule};
use super::timezone::EventTimezone;

/// Computes laundered dates from a catalog rule. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct DateLaunderer {
    catalog: Arc<IntervalCatalog>,
    draw_policy: RandomDrawPolicy,
}

impl DateLaunderer {
    pub fn new(catalog: Arc<IntervalCatalog>) -> Self {
        Self { catalog, draw_policy: RandomDrawPolicy::default() }
    }

    pub fn with_draw_policy(mut self, draw_policy: RandomDrawPolicy) -> Self {
        self.draw_policy = draw_policy;
        self
    }

    pub fn catalog(&self) -> &IntervalCatalog {
        &self.catalog
    }

    pub fn draw_policy(&self) -> RandomDrawPolicy {
        self.draw_policy
    }

    /// Launder typed dates.
    ///
    /// Fails with [`LaunderError::UnknownInterval`] before touching the
    /// dates, and with [`LaunderError::Conversion`] when the timezone is
    /// unusable or the arithmetic overflows.
    pub fn launder(
        &self,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        timezone: &str,
        interval_key: &str,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<LaunderedDates> {
        let rule = self.catalog.resolve(interval_key)?;
        self.launder_with_rule(rule.as_ref(), start_utc, end_utc, timezone, today, rng)
    }

    /// Launder dates as read from the store.
    pub fn launder_stored(
        &self,
        stored: &StoredEventDates,
        interval_key: &str,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<LaunderedDates> {
        let rule = self.catalog.resolve(interval_key)?;
        let start_utc = parse_stored_utc(&stored.start_utc)?;
        let end_utc = parse_stored_utc(&stored.end_utc)?;
        self.launder_with_rule(rule.as_ref(), start_utc, end_utc, &stored.timezone, today, rng)
    }

    fn launder_with_rule(
        &self,
        rule: &dyn IntervalRule,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        timezone: &str,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<LaunderedDates> {
        let zone = EventTimezone::parse(timezone)?;

        let start_offset = rule.offset(rng);
        let end_offset = match self.draw_policy {
            RandomDrawPolicy::PerEndpoint => rule.offset(rng),
            RandomDrawPolicy::Shared => start_offset,
        };

        let start_utc = shift(rebase_on(start_utc, today), start_offset)?;
        let end_utc = shift(rebase_on(end_utc, today), end_offset)?;

        Ok(LaunderedDates {
            start_utc,
            end_utc,
            start_local: zone.to_local(start_utc),
            end_local: zone.to_local(end_utc),
            timezone: timezone.trim().to_string(),
        })
    }
}

/// Same UTC time of day, on `today`.
fn rebase_on(at: DateTime<Utc>, today: NaiveDate) -> DateTime<Utc> {
    today.and_time(at.time()).and_utc()
}

fn shift(at: DateTime<Utc>, offset: DateOffset) -> Result<DateTime<Utc>> {
    offset
        .apply(at)
        .ok_or_else(|| LaunderError::Conversion(format!("offset {offset:?} overflows {at}")))
}

/// Parse a stored UTC timestamp (`YYYY-MM-DD HH:MM:SS`, ISO `T` form or
/// RFC 3339).
pub fn parse_stored_utc(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DB_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc)))
        .map_err(|_| LaunderError::Conversion(format!("invalid UTC timestamp '{raw}'")))
}
