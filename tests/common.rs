#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rmeetings::config::Config;
use rmeetings::db::pool::DbPool;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rmt() -> Command {
    cargo_bin_cmd!("rmeetings")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rmeetings.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh on-disk database plus a matching configuration.
pub fn open_test_db(name: &str) -> (DbPool, Config) {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    let cfg = Config {
        database: db_path,
        horizon_days: 60,
        horizon_limit: 500,
        list_limit: 10,
    };
    (pool, cfg)
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

pub fn at(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .expect("instant")
        .and_utc()
}

/// Initialize a DB through the CLI, without touching the config file.
pub fn init_cli_db(db_path: &str) {
    rmt()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}
