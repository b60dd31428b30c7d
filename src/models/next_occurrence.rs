use chrono::NaiveDate;
use serde::Serialize;

/// Row of the next-occurrence index: one per series, pointing to the
/// occurrence shown as "the meeting date".
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NextOccurrence {
    pub series_id: i64,
    pub occurrence_id: i64,
    pub date: NaiveDate, // denormalized copy of the occurrence date
}

impl NextOccurrence {
    /// The stored pick is stale once today moved past it.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}
