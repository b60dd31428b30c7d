use crate::errors::{AppError, AppResult};
use crate::models::frequency::Frequency;
use crate::models::next_occurrence::NextOccurrence;
use crate::models::occurrence::Occurrence;
use crate::models::rule::RecurrenceRule;
use crate::models::series::{Series, SeriesInput};
use crate::models::termination::Termination;
use crate::models::weekday_mask::WeekdayMask;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const DATE_FMT: &str = "%Y-%m-%d";

pub fn date_to_db(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

pub fn parse_date_column(row: &Row, name: &str) -> Result<NaiveDate> {
    let raw: String = row.get(name)?;
    NaiveDate::parse_from_str(&raw, DATE_FMT).map_err(|_| conversion_error(0, AppError::InvalidDate(raw)))
}

fn parse_instant_column(row: &Row, name: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(0, AppError::InvalidTime(raw)))
}

// ---------------------------
// Series
// ---------------------------

pub fn map_series_row(row: &Row) -> Result<Series> {
    let freq_str: String = row.get("frequency")?;
    let frequency = Frequency::from_db_str(&freq_str).ok_or_else(|| {
        conversion_error(0, AppError::InvalidRule(format!("Invalid frequency: {}", freq_str)))
    })?;

    let until_raw: Option<String> = row.get("until_date")?;
    let until = match until_raw {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, DATE_FMT)
                .map_err(|_| conversion_error(0, AppError::InvalidDate(raw.clone())))?,
        ),
        None => None,
    };

    let rule = RecurrenceRule {
        frequency,
        interval: row.get("interval")?,
        weekday_mask: WeekdayMask(row.get::<_, u16>("weekday_mask")?),
        termination: Termination::from_columns(row.get("max_count")?, until),
    };

    Ok(Series {
        id: row.get("id")?,
        name: row.get("name")?,
        start: parse_instant_column(row, "start_at")?,
        end: parse_instant_column(row, "end_at")?,
        rule,
        revision: row.get("revision")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_series(conn: &Connection, input: &SeriesInput, now: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO series (name, start_at, end_at, frequency, interval, weekday_mask,
                             max_count, until_date, revision, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)",
        params![
            input.name,
            input.start.to_rfc3339(),
            input.end.to_rfc3339(),
            input.rule.frequency.to_db_str(),
            input.rule.interval,
            input.rule.weekday_mask.0,
            input.rule.termination.max_count(),
            input.rule.termination.until_date().map(|d| date_to_db(&d)),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update all editable fields and bump the revision.
pub fn update_series(
    conn: &Connection,
    id: i64,
    input: &SeriesInput,
    revision: i64,
    now: &str,
) -> AppResult<()> {
    conn.execute(
        "UPDATE series
         SET name = ?1, start_at = ?2, end_at = ?3,
             frequency = ?4, interval = ?5, weekday_mask = ?6,
             max_count = ?7, until_date = ?8,
             revision = ?9, updated_at = ?10
         WHERE id = ?11",
        params![
            input.name,
            input.start.to_rfc3339(),
            input.end.to_rfc3339(),
            input.rule.frequency.to_db_str(),
            input.rule.interval,
            input.rule.weekday_mask.0,
            input.rule.termination.max_count(),
            input.rule.termination.until_date().map(|d| date_to_db(&d)),
            revision,
            now,
            id,
        ],
    )?;
    Ok(())
}

pub fn load_series(conn: &Connection, id: i64) -> AppResult<Option<Series>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM series WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_series_row).optional()?)
}

/// Like `load_series`, but an unknown id is an error.
pub fn get_series(conn: &Connection, id: i64) -> AppResult<Series> {
    load_series(conn, id)?.ok_or_else(|| AppError::NotFound(format!("series {}", id)))
}

pub fn delete_series(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM series WHERE id = ?1", [id])?)
}

/// Ids of series materialized through a rolling window that may still grow:
/// `never` rules, and `until_date` rules whose end is not behind `today`.
pub fn rolling_series_ids(conn: &Connection, today: &NaiveDate) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM series
         WHERE frequency <> 'none' AND max_count IS NULL
           AND (until_date IS NULL OR until_date >= ?1)
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([date_to_db(today)], |row| row.get::<_, i64>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Occurrences
// ---------------------------

pub fn map_occurrence_row(row: &Row) -> Result<Occurrence> {
    Ok(Occurrence {
        id: row.get("id")?,
        series_id: row.get("series_id")?,
        date: parse_date_column(row, "date")?,
    })
}

fn collect_occurrences(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> AppResult<Vec<Occurrence>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, map_occurrence_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// All stored occurrences of a series, ordered by date.
pub fn load_occurrences(conn: &Connection, series_id: i64) -> AppResult<Vec<Occurrence>> {
    collect_occurrences(
        conn,
        "SELECT id, series_id, date FROM occurrences WHERE series_id = ?1 ORDER BY date ASC",
        [series_id],
    )
}

pub fn load_occurrence(conn: &Connection, id: i64) -> AppResult<Option<Occurrence>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, series_id, date FROM occurrences WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_occurrence_row).optional()?)
}

pub fn insert_occurrence(conn: &Connection, series_id: i64, date: &NaiveDate) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO occurrences (series_id, date) VALUES (?1, ?2)",
        params![series_id, date_to_db(date)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_occurrence(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM occurrences WHERE id = ?1", [id])?;
    Ok(())
}

/// Occurrences on or after `today`, nearest first.
pub fn future_occurrences(
    conn: &Connection,
    series_id: i64,
    today: &NaiveDate,
    limit: usize,
) -> AppResult<Vec<Occurrence>> {
    collect_occurrences(
        conn,
        "SELECT id, series_id, date FROM occurrences
         WHERE series_id = ?1 AND date >= ?2
         ORDER BY date ASC
         LIMIT ?3",
        params![series_id, date_to_db(today), limit as i64],
    )
}

/// Occurrences strictly before `today`, most recent first.
pub fn past_occurrences(
    conn: &Connection,
    series_id: i64,
    today: &NaiveDate,
    limit: usize,
) -> AppResult<Vec<Occurrence>> {
    collect_occurrences(
        conn,
        "SELECT id, series_id, date FROM occurrences
         WHERE series_id = ?1 AND date < ?2
         ORDER BY date DESC
         LIMIT ?3",
        params![series_id, date_to_db(today), limit as i64],
    )
}

// ---------------------------
// Next-occurrence index
// ---------------------------

fn map_next_row(row: &Row) -> Result<NextOccurrence> {
    Ok(NextOccurrence {
        series_id: row.get("series_id")?,
        occurrence_id: row.get("occurrence_id")?,
        date: parse_date_column(row, "date")?,
    })
}

pub fn load_next(conn: &Connection, series_id: i64) -> AppResult<Option<NextOccurrence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT series_id, occurrence_id, date FROM next_occurrence WHERE series_id = ?1",
    )?;
    Ok(stmt.query_row([series_id], map_next_row).optional()?)
}

pub fn upsert_next(conn: &Connection, next: &NextOccurrence) -> AppResult<()> {
    conn.execute(
        "INSERT INTO next_occurrence (series_id, occurrence_id, date)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(series_id) DO UPDATE
         SET occurrence_id = excluded.occurrence_id, date = excluded.date",
        params![next.series_id, next.occurrence_id, date_to_db(&next.date)],
    )?;
    Ok(())
}

pub fn delete_next(conn: &Connection, series_id: i64) -> AppResult<()> {
    conn.execute(
        "DELETE FROM next_occurrence WHERE series_id = ?1",
        [series_id],
    )?;
    Ok(())
}

/// Index rows whose stored date already lies behind `today`.
pub fn stale_next_series_ids(conn: &Connection, today: &NaiveDate) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT n.series_id FROM next_occurrence n
         WHERE n.date < ?1
           AND EXISTS (SELECT 1 FROM occurrences o
                       WHERE o.series_id = n.series_id AND o.date >= ?1)",
    )?;
    let rows = stmt.query_map([date_to_db(today)], |row| row.get::<_, i64>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Index rows on or after `today`, nearest first.
pub fn upcoming_next(conn: &Connection, today: &NaiveDate) -> AppResult<Vec<NextOccurrence>> {
    let mut stmt = conn.prepare(
        "SELECT series_id, occurrence_id, date FROM next_occurrence
         WHERE date >= ?1
         ORDER BY date ASC, series_id ASC",
    )?;
    let rows = stmt.query_map([date_to_db(today)], map_next_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
