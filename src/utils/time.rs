//! Time utilities: parsing meeting instants, formatting durations.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Parse `YYYY-MM-DD HH:MM` as a UTC instant.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .ok()
        .map(|dt| dt.and_utc())
}

pub fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

pub fn format_duration(d: TimeDelta) -> String {
    format_minutes(d.num_minutes())
}
