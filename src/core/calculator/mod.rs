pub mod diff;
pub mod recurrence;
