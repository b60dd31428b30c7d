//! Append-only storage for the response log.

use crate::errors::{AppError, AppResult};
use crate::models::response::{NewResponse, ResponseEntry, ResponseScope, ResponseValue};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_response_row(row: &Row) -> Result<ResponseEntry> {
    let value_str: String = row.get("value")?;
    let value = ResponseValue::from_db_str(&value_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidResponse(value_str.clone())),
        )
    })?;

    Ok(ResponseEntry {
        id: row.get("id")?,
        series_id: row.get("series_id")?,
        scope: ResponseScope::from_column(row.get("occurrence_id")?),
        subject_id: row.get("subject_id")?,
        value,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

/// Append one entry. There is no update or delete counterpart.
pub fn insert_response(conn: &Connection, r: &NewResponse) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO responses (series_id, occurrence_id, subject_id, value, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            r.series_id,
            r.scope.occurrence_id(),
            r.subject_id,
            r.value.to_db_str(),
            r.note,
            r.created_at_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Latest entry for one exact `(series, scope, subject)` key.
/// Ties on `created_at` go to the highest id.
pub fn latest_for_key(
    conn: &Connection,
    series_id: i64,
    scope: ResponseScope,
    subject_id: &str,
) -> AppResult<Option<ResponseEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM responses
         WHERE series_id = ?1 AND occurrence_id IS ?2 AND subject_id = ?3
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
    )?;
    Ok(stmt
        .query_row(
            params![series_id, scope.occurrence_id(), subject_id],
            map_response_row,
        )
        .optional()?)
}

/// Every entry a subject ever wrote for a series, newest first.
/// Entries whose occurrence no longer resolves are included.
pub fn history(conn: &Connection, series_id: i64, subject_id: &str) -> AppResult<Vec<ResponseEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM responses
         WHERE series_id = ?1 AND subject_id = ?2
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![series_id, subject_id], map_response_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Occurrence ids (among `ids`) that have at least one response pointing at them.
pub fn occurrences_with_responses(conn: &Connection, ids: &[i64]) -> AppResult<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!(
        "SELECT DISTINCT occurrence_id FROM responses
         WHERE occurrence_id IN ({})
         ORDER BY occurrence_id ASC",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), |row| {
        row.get::<_, i64>(0)
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
