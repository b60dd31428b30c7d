use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check whether a migration was already recorded in the log table.
fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Series, occurrences, next-occurrence index and response log.
fn create_meeting_tables(conn: &Connection) -> Result<()> {
    let version = "20250301_0001_create_meeting_tables";
    if is_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS series (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL DEFAULT '',
            start_at      TEXT NOT NULL,
            end_at        TEXT NOT NULL,
            frequency     TEXT NOT NULL DEFAULT 'none'
                          CHECK(frequency IN ('none','daily','workday','weekly','monthly','yearly')),
            interval      INTEGER NOT NULL DEFAULT 1 CHECK(interval > 0),
            weekday_mask  INTEGER NOT NULL DEFAULT 0 CHECK(weekday_mask BETWEEN 0 AND 127),
            max_count     INTEGER,
            until_date    TEXT,
            revision      INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            CHECK(max_count IS NULL OR until_date IS NULL)
        );

        CREATE TABLE IF NOT EXISTS occurrences (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            series_id  INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            UNIQUE(series_id, date)
        );

        CREATE TABLE IF NOT EXISTS next_occurrence (
            series_id      INTEGER PRIMARY KEY REFERENCES series(id) ON DELETE CASCADE,
            occurrence_id  INTEGER NOT NULL REFERENCES occurrences(id) ON DELETE CASCADE,
            date           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS responses (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            series_id      INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
            occurrence_id  INTEGER REFERENCES occurrences(id),
            subject_id     TEXT NOT NULL,
            value          TEXT NOT NULL,
            note           TEXT NOT NULL DEFAULT '',
            created_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_occurrences_series_date ON occurrences(series_id, date);
        CREATE INDEX IF NOT EXISTS idx_next_occurrence_date ON next_occurrence(date);
        CREATE INDEX IF NOT EXISTS idx_responses_key
            ON responses(series_id, subject_id, occurrence_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_responses_occurrence ON responses(occurrence_id);
        "#,
    )?;

    mark_applied(conn, version, "Created series/occurrence/response tables")?;
    success(format!("Migration applied: {}", version));

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Called by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    create_meeting_tables(conn)?;
    Ok(())
}
