//! Event timezone parsing
//!
//! Events carry either an IANA zone name (`America/New_York`) or a manual
//! UTC offset such as `UTC+5`, `UTC-3.5` or `UTC+5:30`.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use launder_domain::{LaunderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTimezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl EventTimezone {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LaunderError::Conversion("empty timezone".into()));
        }

        if let Some(rest) = raw.strip_prefix("UTC").or_else(|| raw.strip_prefix("GMT")) {
            if !rest.is_empty() {
                return parse_manual_offset(rest)
                    .map(Self::Fixed)
                    .ok_or_else(|| LaunderError::Conversion(format!("invalid UTC offset '{raw}'")));
            }
        }

        raw.parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| LaunderError::Conversion(format!("unknown timezone '{raw}'")))
    }

    /// Wall-clock time of `at` in this zone.
    pub fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Named(tz) => at.with_timezone(tz).naive_local(),
            Self::Fixed(offset) => at.with_timezone(offset).naive_local(),
        }
    }
}

impl fmt::Display for EventTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Fixed(offset) => write!(f, "UTC{offset}"),
        }
    }
}

/// Largest manual offset accepted, in hours.
const MAX_OFFSET_HOURS: i32 = 14;

/// Parses `+5`, `-3.5`, `+5:30` or `+0530` into a fixed offset.
fn parse_manual_offset(rest: &str) -> Option<FixedOffset> {
    let (sign, body) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    if body.is_empty() || !body.is_ascii() {
        return None;
    }

    let (hours, minutes) = if let Some((hours, minutes)) = body.split_once(':') {
        (parse_hours(hours)?, parse_minutes(minutes)?)
    } else if let Some((hours, fraction)) = body.split_once('.') {
        (parse_hours(hours)?, parse_fraction(fraction)?)
    } else if body.len() == 4 {
        (parse_hours(body.get(..2)?)?, parse_minutes(body.get(2..)?)?)
    } else {
        (parse_hours(body)?, 0)
    };

    let seconds = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    FixedOffset::east_opt(sign * seconds)
}

fn parse_hours(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|hours| (0..=MAX_OFFSET_HOURS).contains(hours))
}

fn parse_minutes(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|minutes| (0..60).contains(minutes))
}

/// Decimal hour fraction (`5` in `3.5`) as whole minutes.
fn parse_fraction(raw: &str) -> Option<i32> {
    if raw.is_empty() || raw.len() > 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let fraction: f64 = format!("0.{raw}").parse().ok()?;
    let minutes = (fraction * 60.0).round() as i32;
    (minutes < 60).then_some(minutes)
}
