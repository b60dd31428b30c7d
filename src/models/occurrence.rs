use super::series::Series;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One concrete dated instance of a series.
///
/// Every series has at least one occurrence, even when it does not repeat.
/// The `id` is stable for as long as `date` stays valid under the rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Occurrence {
    pub id: i64,
    pub series_id: i64,
    pub date: NaiveDate, // ⇔ occurrences.date (TEXT "YYYY-MM-DD", UTC calendar)
}

impl Occurrence {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The series wall-clock start applied to this occurrence's date.
    pub fn start_at(&self, series: &Series) -> DateTime<Utc> {
        self.date.and_time(series.start.time()).and_utc()
    }

    pub fn end_at(&self, series: &Series) -> DateTime<Utc> {
        self.start_at(series) + series.duration()
    }
}
