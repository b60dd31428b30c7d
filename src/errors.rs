//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid response value: {0}")]
    InvalidResponse(String),

    // ---------------------------
    // Engine errors
    // ---------------------------
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error(
        "Series {series_id}: occurrences on {} still have responses and cannot be removed",
        .dates.join(", ")
    )]
    ReconciliationConflict { series_id: i64, dates: Vec<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Series {series_id} was modified concurrently: {detail}")]
    ConcurrentModification { series_id: i64, detail: String },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Conditions the caller may retry after re-reading state or confirming.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::ReconciliationConflict { .. } | AppError::ConcurrentModification { .. }
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
