pub mod frequency;
pub mod next_occurrence;
pub mod occurrence;
pub mod response;
pub mod rule;
pub mod series;
pub mod termination;
pub mod weekday_mask;
