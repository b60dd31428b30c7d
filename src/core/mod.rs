pub mod calculator;
pub mod config;
pub mod log;
pub mod next;
pub mod reconcile;
pub mod rsvp;
pub mod series;
