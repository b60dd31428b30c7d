//! Recurrence rule → ordered candidate dates. Pure, no I/O.

use crate::models::frequency::Frequency;
use crate::models::rule::RecurrenceRule;
use crate::models::termination::Termination;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::iter;

/// Rolling window used for rules that do not end on their own count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// First date of the current window, `max(today, series start)`.
    pub base: NaiveDate,
    /// Last date (inclusive) that may be emitted for a `never` or `until_date` rule.
    pub until: NaiveDate,
    /// Cap on dates emitted after `base` and after any retained date.
    pub limit: usize,
    /// Dates up to here are already stored and must keep being produced.
    pub keep_through: Option<NaiveDate>,
}

impl Horizon {
    /// Window of `days` days ahead of `today`, never starting before the series.
    pub fn rolling(today: NaiveDate, series_start: NaiveDate, days: u32, limit: usize) -> Self {
        let base = today.max(series_start);
        Self {
            base,
            until: base
                .checked_add_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MAX),
            limit,
            keep_through: None,
        }
    }

    /// Widen the window so nothing up to `through` is trimmed.
    pub fn retaining(mut self, through: Option<NaiveDate>) -> Self {
        if let Some(t) = through {
            self.until = self.until.max(t);
            self.keep_through = Some(self.keep_through.map_or(t, |k| k.max(t)));
        }
        self
    }

    /// Whether `date` counts against `limit`.
    fn is_fresh(&self, date: NaiveDate) -> bool {
        date >= self.base && self.keep_through.is_none_or(|k| date > k)
    }
}

/// Expand `rule` into concrete dates starting at `start`.
///
/// Deterministic and restartable. The result is never empty: a rule whose
/// window contains no candidate still yields `start`.
pub fn evaluate(rule: &RecurrenceRule, start: NaiveDate, horizon: &Horizon) -> Vec<NaiveDate> {
    if !rule.frequency.is_repeating() {
        return vec![start];
    }

    let candidates = candidates(rule, start);

    let dates: Vec<NaiveDate> = match rule.termination {
        Termination::AfterCount(n) => candidates.take(n as usize).collect(),
        Termination::UntilDate(until) => within_window(candidates, horizon, until.min(horizon.until)),
        Termination::Never => within_window(candidates, horizon, horizon.until),
    };

    if dates.is_empty() {
        vec![start]
    } else {
        dates
    }
}

/// Candidates up to `last`. Past and retained dates are always kept; only the
/// dates newly entering the window are capped by `horizon.limit`.
fn within_window(
    candidates: impl Iterator<Item = NaiveDate>,
    horizon: &Horizon,
    last: NaiveDate,
) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut fresh = 0usize;

    for date in candidates.take_while(|d| *d <= last) {
        if horizon.is_fresh(date) {
            if fresh == horizon.limit {
                break;
            }
            fresh += 1;
        }
        out.push(date);
    }
    out
}

/// Latest of `stored` that the rule still produces under its own termination,
/// ignoring any horizon. `None` for rules the horizon does not apply to.
pub fn retained_through(rule: &RecurrenceRule, start: NaiveDate, stored: &[NaiveDate]) -> Option<NaiveDate> {
    if !rule.frequency.is_repeating() {
        return None;
    }

    let last = match rule.termination {
        Termination::AfterCount(_) => return None,
        Termination::UntilDate(until) => (*stored.iter().max()?).min(until),
        Termination::Never => *stored.iter().max()?,
    };

    let stored: BTreeSet<NaiveDate> = stored.iter().copied().collect();
    candidates(rule, start)
        .take_while(|d| *d <= last)
        .filter(|d| stored.contains(d))
        .last()
}

/// Unbounded (up to the calendar's end) stream of candidate dates.
fn candidates(rule: &RecurrenceRule, start: NaiveDate) -> Box<dyn Iterator<Item = NaiveDate>> {
    let step = rule.step();

    match rule.frequency {
        Frequency::None => Box::new(iter::once(start)),
        Frequency::Daily => Box::new(iter::successors(Some(start), move |d| {
            d.checked_add_days(Days::new(step as u64))
        })),
        Frequency::Workday => Box::new(iter::successors(first_business_day(start), move |d| {
            add_business_days(*d, step)
        })),
        Frequency::Weekly => {
            let days = if rule.weekday_mask.is_empty() {
                vec![start.weekday()]
            } else {
                rule.weekday_mask.days()
            };
            let week0 = start - Days::new(start.weekday().num_days_from_sunday() as u64);

            Box::new(
                (0u64..)
                    .map_while(move |k| {
                        k.checked_mul(7 * step as u64)
                            .and_then(|offset| week0.checked_add_days(Days::new(offset)))
                    })
                    .flat_map(move |week| {
                        days.clone()
                            .into_iter()
                            .filter_map(move |day| day_in_week(week, day))
                    })
                    .filter(move |d| *d >= start),
            )
        }
        Frequency::Monthly => Box::new(
            (0u32..).map_while(move |k| k.checked_mul(step).and_then(|n| add_months_clamped(start, n))),
        ),
        Frequency::Yearly => Box::new((0u32..).map_while(move |k| {
            k.checked_mul(step)
                .and_then(|n| n.checked_mul(12))
                .and_then(|n| add_months_clamped(start, n))
        })),
    }
}

fn is_weekend(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

fn first_business_day(d: NaiveDate) -> Option<NaiveDate> {
    let mut d = d;
    while is_weekend(d) {
        d = d.succ_opt()?;
    }
    Some(d)
}

fn add_business_days(d: NaiveDate, n: u32) -> Option<NaiveDate> {
    let mut d = d;
    for _ in 0..n {
        d = first_business_day(d.succ_opt()?)?;
    }
    Some(d)
}

/// Date of `day` within the Sunday-based week starting at `week`.
fn day_in_week(week: NaiveDate, day: Weekday) -> Option<NaiveDate> {
    week.checked_add_days(Days::new(day.num_days_from_sunday() as u64))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Same day-of-month `months` months later, clamped to the target month's
/// last day (Jan 31 + 1 → Feb 28/29, Feb 29 + 12 → Feb 28).
pub fn add_months_clamped(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = start.year() as i64 * 12 + start.month0() as i64 + months as i64;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = start.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}
