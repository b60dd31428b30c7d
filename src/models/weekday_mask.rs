//! Seven-bit weekday set used by weekly rules.
//!
//! Days are numbered 1 = Sunday … 7 = Saturday and day `d` lives in bit `d - 1`,
//! so `mask & 1` means Sunday is on.

use chrono::Weekday;
use serde::Serialize;

/// Bits above the seventh are never valid.
pub const VALID_BITS: u16 = 0b111_1111;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct WeekdayMask(pub u16);

impl WeekdayMask {
    pub const EMPTY: WeekdayMask = WeekdayMask(0);

    pub fn from_weekdays(days: &[Weekday]) -> Self {
        days.iter().fold(Self::EMPTY, |m, d| m.with(*d))
    }

    /// 1-based day number (1 = Sunday).
    pub fn day_number(day: Weekday) -> u32 {
        day.num_days_from_sunday() + 1
    }

    pub fn with(self, day: Weekday) -> Self {
        WeekdayMask(self.0 | (1 << (Self::day_number(day) - 1)))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << (Self::day_number(day) - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_valid(&self) -> bool {
        self.0 & !VALID_BITS == 0
    }

    /// Flagged days in week order, Sunday first.
    pub fn days(&self) -> Vec<Weekday> {
        let mut day = Weekday::Sun;
        let mut out = Vec::new();
        for _ in 0..7 {
            if self.contains(day) {
                out.push(day);
            }
            day = day.succ();
        }
        out
    }

    /// Parse a CLI list such as `mon,wed,fri`.
    pub fn parse_list(input: &str) -> Option<Self> {
        let mut mask = Self::EMPTY;
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = part.parse::<Weekday>().ok()?;
            mask = mask.with(day);
        }
        Some(mask)
    }

    pub fn short_names(&self) -> String {
        self.days()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_is_the_lowest_bit() {
        assert_eq!(WeekdayMask::EMPTY.with(Weekday::Sun).0, 1);
        assert_eq!(WeekdayMask::EMPTY.with(Weekday::Sat).0, 64);
    }

    #[test]
    fn parse_list_accepts_short_names() {
        let mask = WeekdayMask::parse_list("mon, wed,fri").expect("valid list");
        assert_eq!(mask.days(), vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert!(WeekdayMask::parse_list("mon,funday").is_none());
    }

    #[test]
    fn eighth_bit_is_invalid() {
        assert!(WeekdayMask(127).is_valid());
        assert!(!WeekdayMask(128).is_valid());
    }
}
