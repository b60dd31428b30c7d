use super::{frequency::Frequency, termination::Termination, weekday_mask::WeekdayMask};
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// Recurrence rule of a series: frequency + interval + weekday mask + termination.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: i32,
    pub weekday_mask: WeekdayMask,
    pub termination: Termination,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::once()
    }
}

impl RecurrenceRule {
    /// A non-repeating rule.
    pub fn once() -> Self {
        Self {
            frequency: Frequency::None,
            interval: 1,
            weekday_mask: WeekdayMask::EMPTY,
            termination: Termination::Never,
        }
    }

    pub fn new(frequency: Frequency, interval: i32) -> Self {
        Self {
            frequency,
            interval,
            ..Self::once()
        }
    }

    pub fn on_days(mut self, mask: WeekdayMask) -> Self {
        self.weekday_mask = mask;
        self
    }

    pub fn ending(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Reject configurations the evaluator must never see.
    pub fn validate(&self) -> AppResult<()> {
        if self.interval <= 0 {
            return Err(AppError::InvalidRule(format!(
                "interval must be a positive integer, got {}",
                self.interval
            )));
        }

        if !self.weekday_mask.is_valid() {
            return Err(AppError::InvalidRule(format!(
                "weekday mask {:#b} has bits outside days 1..7",
                self.weekday_mask.0
            )));
        }

        if let Termination::AfterCount(0) = self.termination {
            return Err(AppError::InvalidRule(
                "max count must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Positive step used by the evaluator. Validation guarantees `interval >= 1`.
    pub fn step(&self) -> u32 {
        self.interval.max(1) as u32
    }
}

/// Human readable summary, empty for a non-repeating rule.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.frequency.is_repeating() {
            return Ok(());
        }

        write!(f, "{}", self.frequency)?;
        if self.interval > 1 {
            write!(f, " (every {})", self.interval)?;
        }
        if self.frequency == Frequency::Weekly && !self.weekday_mask.is_empty() {
            write!(f, " on {}", self.weekday_mask.short_names())?;
        }

        match self.termination {
            Termination::AfterCount(n) => write!(f, ", max repetitions {}", n),
            Termination::UntilDate(d) => write!(f, ", until {}", d.format("%Y-%m-%d")),
            Termination::Never => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn zero_or_negative_interval_is_rejected() {
        for interval in [0, -3] {
            let err = RecurrenceRule::new(Frequency::Daily, interval)
                .validate()
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidRule(_)));
        }
    }

    #[test]
    fn mask_outside_week_is_rejected() {
        let rule = RecurrenceRule::new(Frequency::Weekly, 1).on_days(WeekdayMask(0x80));
        assert!(matches!(rule.validate(), Err(AppError::InvalidRule(_))));
    }

    #[test]
    fn description_mentions_interval_and_end() {
        let rule = RecurrenceRule::new(Frequency::Weekly, 2)
            .on_days(WeekdayMask::from_weekdays(&[Weekday::Tue]))
            .ending(Termination::UntilDate(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ));

        assert_eq!(
            rule.to_string(),
            "Every week (every 2) on Tue, until 2024-03-01"
        );
        assert_eq!(RecurrenceRule::once().to_string(), "");
    }
}
