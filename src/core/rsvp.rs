use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{get_series, load_occurrence, load_occurrences};
use crate::db::responses::{history as load_history, insert_response, latest_for_key};
use crate::errors::{AppError, AppResult};
use crate::models::occurrence::Occurrence;
use crate::models::response::{NewResponse, ResponseEntry, ResponseScope};
use rusqlite::Connection;

/// Pick the current entry for one key out of a slice of log entries:
/// the newest by `created_at`, ties going to the highest id.
fn latest<'a>(
    entries: &'a [ResponseEntry],
    scope: ResponseScope,
    subject_id: &str,
) -> Option<&'a ResponseEntry> {
    entries
        .iter()
        .filter(|e| e.scope == scope && e.subject_id == subject_id)
        .max_by(|a, b| (&a.created_at, a.id).cmp(&(&b.created_at, b.id)))
}

/// Resolve the response in force for one occurrence.
///
/// An occurrence-scoped entry wins; otherwise the series-wide entry applies.
pub fn resolve<'a>(
    entries: &'a [ResponseEntry],
    occurrence_id: i64,
    subject_id: &str,
) -> Option<&'a ResponseEntry> {
    latest(entries, ResponseScope::Occurrence(occurrence_id), subject_id)
        .or_else(|| latest(entries, ResponseScope::Series, subject_id))
}

fn ensure_occurrence_of(conn: &Connection, series_id: i64, occurrence_id: i64) -> AppResult<()> {
    match load_occurrence(conn, occurrence_id)? {
        Some(occ) if occ.series_id == series_id => Ok(()),
        _ => Err(AppError::NotFound(format!(
            "occurrence {} of series {}",
            occurrence_id, series_id
        ))),
    }
}

/// Append-only response log operations.
pub struct RsvpLogic;

impl RsvpLogic {
    /// Append one response and return the new entry id. Prior entries are
    /// never touched.
    pub fn record(pool: &mut DbPool, response: &NewResponse) -> AppResult<i64> {
        if response.subject_id.trim().is_empty() {
            return Err(AppError::InvalidResponse("empty subject id".into()));
        }

        let tx = pool.begin()?;

        get_series(&tx, response.series_id)?;
        if let ResponseScope::Occurrence(occ_id) = response.scope {
            ensure_occurrence_of(&tx, response.series_id, occ_id)?;
        }

        let id = insert_response(&tx, response)?;

        ttlog(
            &tx,
            "rsvp",
            &format!("series {}", response.series_id),
            &format!(
                "{} → {} ({})",
                response.subject_id,
                response.value.to_db_str(),
                match response.scope {
                    ResponseScope::Series => "whole series".to_string(),
                    ResponseScope::Occurrence(o) => format!("occurrence {}", o),
                }
            ),
        )?;

        tx.commit()?;
        Ok(id)
    }

    /// Response in force for `subject_id` on one occurrence, if any.
    pub fn resolve_current(
        conn: &Connection,
        series_id: i64,
        occurrence_id: i64,
        subject_id: &str,
    ) -> AppResult<Option<ResponseEntry>> {
        get_series(conn, series_id)?;
        ensure_occurrence_of(conn, series_id, occurrence_id)?;

        match latest_for_key(conn, series_id, ResponseScope::Occurrence(occurrence_id), subject_id)? {
            Some(entry) => Ok(Some(entry)),
            None => latest_for_key(conn, series_id, ResponseScope::Series, subject_id),
        }
    }

    /// Current responses for a page of occurrences, resolved one by one.
    pub fn responses_for_occurrences(
        conn: &Connection,
        series_id: i64,
        occurrences: &[Occurrence],
        subject_id: &str,
    ) -> AppResult<Vec<(Occurrence, Option<ResponseEntry>)>> {
        let entries = load_history(conn, series_id, subject_id)?;
        Ok(occurrences
            .iter()
            .map(|occ| (occ.clone(), resolve(&entries, occ.id, subject_id).cloned()))
            .collect())
    }

    /// Whether any occurrence of the series resolves to a response.
    pub fn has_responded_any(conn: &Connection, series_id: i64, subject_id: &str) -> AppResult<bool> {
        get_series(conn, series_id)?;
        let entries = load_history(conn, series_id, subject_id)?;
        let occurrences = load_occurrences(conn, series_id)?;
        Ok(occurrences
            .iter()
            .any(|occ| resolve(&entries, occ.id, subject_id).is_some()))
    }

    /// Full history for one subject, newest first, orphaned entries included.
    pub fn history(conn: &Connection, series_id: i64, subject_id: &str) -> AppResult<Vec<ResponseEntry>> {
        get_series(conn, series_id)?;
        load_history(conn, series_id, subject_id)
    }
}
