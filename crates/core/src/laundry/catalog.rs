//! Interval catalog
//!
//! Maps interval keys to the rule that produces a date offset. The catalog
//! is built once at startup and then only read.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use launder_domain::constants::{
    INTERVAL_NEXT_DAY, INTERVAL_RANDOM_NEXT_MONTH, INTERVAL_RANDOM_NEXT_WEEK,
    INTERVAL_SAME_NEXT_MONTH, INTERVAL_SAME_NEXT_WEEK, INTERVAL_SAME_NEXT_YEAR, INTERVAL_TODAY,
};
use launder_domain::{IntervalOption, LaunderError, Result};
use rand::{Rng, RngCore};

/// Calendar-aware shift applied to a timestamp.
///
/// Months are applied first and clamp to the last valid day of the target
/// month (Jan 31 + 1 month is the last day of February). Days and hours are
/// then added as exact durations in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateOffset {
    pub months: u32,
    pub days: i64,
    pub hours: i64,
}

impl DateOffset {
    pub const ZERO: Self = Self { months: 0, days: 0, hours: 0 };

    pub const fn days(days: i64) -> Self {
        Self { months: 0, days, hours: 0 }
    }

    pub const fn months(months: u32) -> Self {
        Self { months, days: 0, hours: 0 }
    }

    pub const fn with_hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    /// Shift `at` by this offset. `None` on overflow.
    pub fn apply(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let shifted =
            if self.months > 0 { at.checked_add_months(Months::new(self.months))? } else { at };
        shifted
            .checked_add_signed(Duration::try_days(self.days)?)?
            .checked_add_signed(Duration::try_hours(self.hours)?)
    }
}

/// Produces the offset for one endpoint of a laundered event.
pub trait IntervalRule: Send + Sync {
    fn offset(&self, rng: &mut dyn RngCore) -> DateOffset;
}

/// Always returns the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOffsetRule(pub DateOffset);

impl IntervalRule for FixedOffsetRule {
    fn offset(&self, _rng: &mut dyn RngCore) -> DateOffset {
        self.0
    }
}

/// Uniform draw of whole days and whole hours, both bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomWindowRule {
    days: RangeInclusive<i64>,
    hours: RangeInclusive<i64>,
}

impl RandomWindowRule {
    pub fn new(days: RangeInclusive<i64>, hours: RangeInclusive<i64>) -> Result<Self> {
        if days.is_empty() || hours.is_empty() {
            return Err(LaunderError::InvalidInput(format!(
                "empty random window: days {days:?}, hours {hours:?}"
            )));
        }
        Ok(Self { days, hours })
    }

    pub fn days(&self) -> &RangeInclusive<i64> {
        &self.days
    }

    pub fn hours(&self) -> &RangeInclusive<i64> {
        &self.hours
    }
}

impl IntervalRule for RandomWindowRule {
    fn offset(&self, rng: &mut dyn RngCore) -> DateOffset {
        let days = rng.gen_range(self.days.clone());
        let hours = rng.gen_range(self.hours.clone());
        DateOffset::days(days).with_hours(hours)
    }
}

struct CatalogEntry {
    key: String,
    label: String,
    rule: Arc<dyn IntervalRule>,
}

/// Ordered registry of interval rules.
pub struct IntervalCatalog {
    entries: Vec<CatalogEntry>,
}

impl IntervalCatalog {
    /// Catalog with no intervals.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Catalog with the seven built-in intervals, in display order.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::empty();
        let fixed = |offset| Arc::new(FixedOffsetRule(offset)) as Arc<dyn IntervalRule>;
        let builtin: [(&str, &str, Arc<dyn IntervalRule>); 7] = [
            (INTERVAL_TODAY, "The current day", fixed(DateOffset::ZERO)),
            (INTERVAL_NEXT_DAY, "The following day", fixed(DateOffset::days(1))),
            (INTERVAL_SAME_NEXT_WEEK, "Same day next week", fixed(DateOffset::days(7))),
            (
                INTERVAL_RANDOM_NEXT_WEEK,
                "Random within the next week",
                Arc::new(RandomWindowRule { days: 7..=13, hours: 0..=24 }),
            ),
            (INTERVAL_SAME_NEXT_MONTH, "Same day next month", fixed(DateOffset::months(1))),
            (
                INTERVAL_RANDOM_NEXT_MONTH,
                "Random within the next month",
                Arc::new(RandomWindowRule { days: 30..=60, hours: 0..=24 }),
            ),
            (INTERVAL_SAME_NEXT_YEAR, "Same date next year", fixed(DateOffset::months(12))),
        ];
        for (key, label, rule) in builtin {
            catalog.entries.push(CatalogEntry { key: key.into(), label: label.into(), rule });
        }
        catalog
    }

    /// Add an interval, or replace the rule and label of an existing key in
    /// place so its display position is kept.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        rule: Arc<dyn IntervalRule>,
    ) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LaunderError::InvalidInput("interval key must not be empty".into()));
        }
        let label = label.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.label = label;
                entry.rule = rule;
            }
            None => self.entries.push(CatalogEntry { key, label, rule }),
        }
        Ok(())
    }

    /// Remove an interval. Returns whether the key was present.
    pub fn unregister(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        self.entries.len() != before
    }

    /// Key/label pairs in display order.
    pub fn list(&self) -> Vec<IntervalOption> {
        self.entries.iter().map(|entry| IntervalOption::new(&entry.key, &entry.label)).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|entry| entry.key == key).map(|entry| entry.label.as_str())
    }

    /// Rule for `key`, or [`LaunderError::UnknownInterval`].
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn IntervalRule>> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| Arc::clone(&entry.rule))
            .ok_or_else(|| LaunderError::UnknownInterval(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IntervalCatalog {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for IntervalCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|entry| &entry.key)).finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn builtin_catalog_lists_seven_intervals_in_order() {
        let keys: Vec<String> =
            IntervalCatalog::with_builtin().list().into_iter().map(|option| option.key).collect();
        assert_eq!(
            keys,
            vec![
                "today",
                "next_day",
                "same_next_week",
                "random_next_week",
                "same_next_month",
                "random_next_month",
                "same_next_year",
            ]
        );
    }

    #[test]
    fn labels_match_display_text() {
        let catalog = IntervalCatalog::with_builtin();
        assert_eq!(catalog.label("today"), Some("The current day"));
        assert_eq!(catalog.label("random_next_month"), Some("Random within the next month"));
        assert_eq!(catalog.label("fortnight"), None);
    }

    #[test]
    fn resolve_unknown_key_fails() {
        let catalog = IntervalCatalog::with_builtin();
        let err = catalog.resolve("fortnight").err();
        assert_eq!(err, Some(LaunderError::UnknownInterval("fortnight".into())));
    }

    #[test]
    fn register_replaces_in_place_and_appends_new_keys() {
        let mut catalog = IntervalCatalog::with_builtin();
        catalog
            .register("next_day", "Tomorrow", Arc::new(FixedOffsetRule(DateOffset::days(2))))
            .unwrap();
        catalog
            .register("fortnight", "Two weeks", Arc::new(FixedOffsetRule(DateOffset::days(14))))
            .unwrap();

        let options = catalog.list();
        assert_eq!(options[1], IntervalOption::new("next_day", "Tomorrow"));
        assert_eq!(options.last(), Some(&IntervalOption::new("fortnight", "Two weeks")));
        assert_eq!(catalog.len(), 8);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(catalog.resolve("next_day").unwrap().offset(&mut rng), DateOffset::days(2));
    }

    #[test]
    fn register_rejects_blank_key() {
        let mut catalog = IntervalCatalog::empty();
        let result = catalog.register("  ", "Blank", Arc::new(FixedOffsetRule(DateOffset::ZERO)));
        assert!(matches!(result, Err(LaunderError::InvalidInput(_))));
        assert!(catalog.is_empty());
    }

    #[test]
    fn unregister_removes_key() {
        let mut catalog = IntervalCatalog::with_builtin();
        assert!(catalog.unregister("today"));
        assert!(!catalog.unregister("today"));
        assert!(!catalog.contains("today"));
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn random_window_rejects_empty_ranges() {
        #[allow(clippy::reversed_empty_ranges)]
        let result = RandomWindowRule::new(13..=7, 0..=24);
        assert!(result.is_err());
        assert!(RandomWindowRule::new(7..=13, 0..=24).is_ok());
    }

    #[test]
    fn random_window_stays_inside_bounds() {
        let rule = RandomWindowRule::new(30..=60, 0..=24).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let offset = rule.offset(&mut rng);
            assert_eq!(offset.months, 0);
            assert!((30..=60).contains(&offset.days));
            assert!((0..=24).contains(&offset.hours));
        }
    }

    #[test]
    fn month_offset_clamps_to_month_end() {
        let jan_31 = Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 0).unwrap();
        assert_eq!(
            DateOffset::months(1).apply(jan_31),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 9, 30, 0).unwrap())
        );

        let leap_day = Utc.with_ymd_and_hms(2024, 2, 29, 9, 30, 0).unwrap();
        assert_eq!(
            DateOffset::months(12).apply(leap_day),
            Some(Utc.with_ymd_and_hms(2025, 2, 28, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn day_and_hour_offsets_are_exact_durations() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 0, 0).unwrap();
        assert_eq!(
            DateOffset::days(1).with_hours(24).apply(at),
            Some(Utc.with_ymd_and_hms(2024, 3, 11, 23, 0, 0).unwrap())
        );
    }
}
