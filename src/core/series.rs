use crate::config::Config;
use crate::core::calculator::diff::OccurrenceDiff;
use crate::core::next::NextOccurrenceLogic;
use crate::core::reconcile::ReconcileLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{
    self, future_occurrences, get_series, insert_series, past_occurrences, rolling_series_ids,
    update_series,
};
use crate::errors::{AppError, AppResult};
use crate::models::occurrence::Occurrence;
use crate::models::response::{CREATED_AT_FORMAT, ResponseScope};
use crate::models::series::{Series, SeriesInput};
use chrono::{NaiveDate, Utc};

/// Outcome of one horizon-extension pass.
#[derive(Debug, Default)]
pub struct ExtendReport {
    pub extended: Vec<(i64, OccurrenceDiff)>,
    pub failed: Vec<(i64, AppError)>,
}

fn now_str() -> String {
    Utc::now().format(CREATED_AT_FORMAT).to_string()
}

/// High-level operations on a series, each one atomic.
pub struct SeriesLogic;

impl SeriesLogic {
    /// Create a series (`id = None`) or update an existing one, then reconcile
    /// its occurrences and refresh the index, all in one transaction.
    ///
    /// `expected_revision`, when given, must match the stored revision.
    pub fn create_or_update(
        pool: &mut DbPool,
        id: Option<i64>,
        input: &SeriesInput,
        expected_revision: Option<i64>,
        today: NaiveDate,
        cfg: &Config,
    ) -> AppResult<(i64, OccurrenceDiff)> {
        input.validate()?;
        let now = now_str();

        let (series_id, tx) = match id {
            None => {
                let tx = pool.begin_series_write(0)?;
                let series_id = insert_series(&tx, input, &now)?;
                ttlog(&tx, "series_add", &format!("series {}", series_id), &input.name)?;
                (series_id, tx)
            }
            Some(series_id) => {
                let tx = pool.begin_series_write(series_id)?;
                let current = get_series(&tx, series_id)?;

                if let Some(expected) = expected_revision
                    && expected != current.revision
                {
                    return Err(AppError::ConcurrentModification {
                        series_id,
                        detail: format!(
                            "expected revision {}, found {}",
                            expected, current.revision
                        ),
                    });
                }

                update_series(&tx, series_id, input, current.revision + 1, &now)?;
                ttlog(
                    &tx,
                    "series_edit",
                    &format!("series {}", series_id),
                    if current.shape_changed(input) {
                        "recurrence changed"
                    } else {
                        "details changed"
                    },
                )?;
                (series_id, tx)
            }
        };

        let series = get_series(&tx, series_id)?;
        let horizon = cfg.horizon(today, series.start_date());
        let diff = ReconcileLogic::reconcile(&tx, &series, &horizon, &today)?;

        tx.commit()?;
        Ok((series_id, diff))
    }

    /// Re-run reconciliation for a stored series without changing it.
    pub fn resync(
        pool: &mut DbPool,
        series_id: i64,
        today: NaiveDate,
        cfg: &Config,
    ) -> AppResult<OccurrenceDiff> {
        let tx = pool.begin_series_write(series_id)?;
        let series = get_series(&tx, series_id)?;
        let horizon = cfg.horizon(today, series.start_date());
        let diff = ReconcileLogic::reconcile(&tx, &series, &horizon, &today)?;
        tx.commit()?;
        Ok(diff)
    }

    pub fn get(pool: &DbPool, series_id: i64) -> AppResult<Series> {
        get_series(&pool.conn, series_id)
    }

    /// Occurrence shown as the meeting date; reads the next-occurrence index.
    pub fn display_occurrence(
        pool: &mut DbPool,
        series_id: i64,
        today: NaiveDate,
    ) -> AppResult<Occurrence> {
        NextOccurrenceLogic::display(pool, series_id, &today)
    }

    pub fn list_future(
        pool: &DbPool,
        series_id: i64,
        today: NaiveDate,
        limit: usize,
    ) -> AppResult<Vec<Occurrence>> {
        get_series(&pool.conn, series_id)?;
        future_occurrences(&pool.conn, series_id, &today, limit)
    }

    pub fn list_past(
        pool: &DbPool,
        series_id: i64,
        today: NaiveDate,
        limit: usize,
    ) -> AppResult<Vec<Occurrence>> {
        get_series(&pool.conn, series_id)?;
        past_occurrences(&pool.conn, series_id, &today, limit)
    }

    /// Delete a series with its occurrences, index row and responses.
    pub fn delete(pool: &mut DbPool, series_id: i64) -> AppResult<()> {
        let tx = pool.begin_series_write(series_id)?;
        let series = get_series(&tx, series_id)?;
        tx.execute("DELETE FROM responses WHERE series_id = ?1", [series_id])?;
        queries::delete_series(&tx, series_id)?;
        ttlog(&tx, "series_del", &format!("series {}", series_id), &series.name)?;
        tx.commit()?;
        Ok(())
    }

    /// Move the window of every series that still grows forward to `today`.
    /// Each series runs in its own transaction; one failure does not stop the rest.
    pub fn extend_horizons(pool: &mut DbPool, today: NaiveDate, cfg: &Config) -> AppResult<ExtendReport> {
        let mut report = ExtendReport::default();

        for series_id in rolling_series_ids(&pool.conn, &today)? {
            match Self::resync(pool, series_id, today, cfg) {
                Ok(diff) => report.extended.push((series_id, diff)),
                Err(e) => report.failed.push((series_id, e)),
            }
        }

        ttlog(
            &pool.conn,
            "extend",
            &today.to_string(),
            &format!(
                "{} series checked, {} failed",
                report.extended.len() + report.failed.len(),
                report.failed.len()
            ),
        )?;

        Ok(report)
    }

    /// Scope a response should be recorded under. Occurrence-specific answers
    /// only make sense for a repeating series.
    pub fn response_scope(
        series: &Series,
        occurrence_id: Option<i64>,
    ) -> ResponseScope {
        match occurrence_id {
            Some(id) if series.is_repeated() => ResponseScope::Occurrence(id),
            _ => ResponseScope::Series,
        }
    }
}
