pub mod date;
pub mod time;
