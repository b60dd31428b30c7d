//! Minimal insert/delete diff between evaluated dates and stored occurrences.

use crate::models::occurrence::Occurrence;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OccurrenceDiff {
    /// Evaluated dates with no stored occurrence yet, ascending.
    pub to_insert: Vec<NaiveDate>,
    /// Stored occurrences whose date is no longer produced by the rule.
    pub to_delete: Vec<Occurrence>,
    /// Stored occurrences that stay, identity untouched.
    pub unchanged: Vec<Occurrence>,
}

impl OccurrenceDiff {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "+{} -{} ={}",
            self.to_insert.len(),
            self.to_delete.len(),
            self.unchanged.len()
        )
    }
}

pub fn diff_occurrences(evaluated: &[NaiveDate], existing: &[Occurrence]) -> OccurrenceDiff {
    let wanted: BTreeSet<NaiveDate> = evaluated.iter().copied().collect();
    let stored: BTreeSet<NaiveDate> = existing.iter().map(|o| o.date).collect();

    let (unchanged, to_delete): (Vec<Occurrence>, Vec<Occurrence>) = existing
        .iter()
        .cloned()
        .partition(|o| wanted.contains(&o.date));

    OccurrenceDiff {
        to_insert: wanted.difference(&stored).copied().collect(),
        to_delete,
        unchanged,
    }
}
