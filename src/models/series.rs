use super::rule::RecurrenceRule;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

/// A meeting definition with a recurrence rule.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub id: i64,
    pub name: String,
    pub start: DateTime<Utc>, // ⇔ series.start (TEXT, RFC3339 UTC)
    pub end: DateTime<Utc>,   // ⇔ series.end
    pub rule: RecurrenceRule,
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Series {
    /// Calendar date of the first occurrence, in the UTC reference calendar.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn is_repeated(&self) -> bool {
        self.rule.frequency.is_repeating()
    }

    /// Whether a recompute is needed when moving from `self` to `input`.
    /// Only the start date and the rule shape drive the occurrence set.
    pub fn shape_changed(&self, input: &SeriesInput) -> bool {
        self.start_date() != input.start.date_naive() || self.rule != input.rule
    }
}

/// Fields supplied by the caller on create/update.
#[derive(Debug, Clone)]
pub struct SeriesInput {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub rule: RecurrenceRule,
}

impl SeriesInput {
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            rule: RecurrenceRule::once(),
        }
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.end < self.start {
            return Err(AppError::InvalidRule(format!(
                "end {} is before start {}",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        self.rule.validate()
    }
}

impl From<&Series> for SeriesInput {
    fn from(s: &Series) -> Self {
        Self {
            name: s.name.clone(),
            start: s.start,
            end: s.end,
            rule: s.rule,
        }
    }
}
