pub mod add;
pub mod config;
pub mod del;
pub mod edit;
pub mod extend;
pub mod history;
pub mod init;
pub mod list;
pub mod log;
pub mod rsvp;
pub mod show;
pub mod status;
pub mod upcoming;
