use chrono::NaiveDate;
use serde::Serialize;

/// When a recurring series stops producing occurrences.
///
/// Exactly one of count / end date / nothing is carried, so switching
/// policy always clears the other value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Termination {
    #[default]
    Never,
    AfterCount(u32),
    UntilDate(NaiveDate),
}

impl Termination {
    /// Rebuild from the two nullable DB columns. A stored count wins over a
    /// stored end date.
    pub fn from_columns(max_count: Option<i64>, until: Option<NaiveDate>) -> Self {
        match (max_count, until) {
            (Some(n), _) if n > 0 => Termination::AfterCount(n as u32),
            (_, Some(d)) => Termination::UntilDate(d),
            _ => Termination::Never,
        }
    }

    pub fn max_count(&self) -> Option<i64> {
        match self {
            Termination::AfterCount(n) => Some(*n as i64),
            _ => None,
        }
    }

    pub fn until_date(&self) -> Option<NaiveDate> {
        match self {
            Termination::UntilDate(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        matches!(self, Termination::Never)
    }
}
