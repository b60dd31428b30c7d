use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

/// Current calendar date in UTC, the reference timezone of every series.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Value of a `--today` override, or the UTC calendar date.
pub fn resolve_today(input: Option<&String>) -> AppResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())),
        None => Ok(today()),
    }
}

pub fn parse_optional_date(input: Option<&String>) -> AppResult<Option<NaiveDate>> {
    input
        .map(|s| parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())))
        .transpose()
}
