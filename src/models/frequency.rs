use serde::Serialize;
use std::fmt;

/// How often a series repeats.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Workday,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Workday => "workday",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Frequency::None),
            "daily" => Some(Frequency::Daily),
            "workday" => Some(Frequency::Workday),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    /// Helper: convert input from CLI (case-insensitive, a few aliases)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "once" | "no" => Some(Frequency::None),
            "every_day" | "day" => Some(Frequency::Daily),
            "every_work_day" | "weekday" | "business" => Some(Frequency::Workday),
            "every_week" | "week" => Some(Frequency::Weekly),
            "every_month" | "month" => Some(Frequency::Monthly),
            "every_year" | "year" | "annual" => Some(Frequency::Yearly),
            other => Frequency::from_db_str(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::None => "No repeat",
            Frequency::Daily => "Every day",
            Frequency::Workday => "Every work day",
            Frequency::Weekly => "Every week",
            Frequency::Monthly => "Every month",
            Frequency::Yearly => "Every year",
        }
    }

    pub fn is_repeating(&self) -> bool {
        !matches!(self, Frequency::None)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
