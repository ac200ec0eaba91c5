//! Calendar-day and timestamp formatting.
//!
//! All practice dates are stamped in a single reference time zone
//! (Europe/Rome) regardless of where the service runs: `YYYYMMDD` for
//! calendar days, `YYYYMMDD HH:mm` for answer timestamps.

use chrono::{DateTime, Utc};
use chrono_tz::Europe::Rome;

/// Format an instant as a `YYYYMMDD` calendar day in the reference zone.
pub fn stamp_date(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Rome).format("%Y%m%d").to_string()
}

/// Format an instant as `YYYYMMDD HH:mm` in the reference zone.
pub fn stamp_datetime(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Rome).format("%Y%m%d %H:%M").to_string()
}

/// Today as a `YYYYMMDD` calendar day in the reference zone.
pub fn today_stamp() -> String {
    stamp_date(Utc::now())
}

/// Now as `YYYYMMDD HH:mm` in the reference zone.
pub fn now_stamp() -> String {
    stamp_datetime(Utc::now())
}
