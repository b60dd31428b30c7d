use crate::core::calculator::diff::{OccurrenceDiff, diff_occurrences};
use crate::core::calculator::recurrence::{Horizon, evaluate, retained_through};
use crate::core::next::NextOccurrenceLogic;
use crate::db::log::ttlog;
use crate::db::queries::{date_to_db, delete_occurrence, insert_occurrence, load_occurrences};
use crate::db::responses::occurrences_with_responses;
use crate::errors::{AppError, AppResult};
use crate::models::series::Series;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Keeps the stored occurrence set of a series in sync with its rule.
pub struct ReconcileLogic;

impl ReconcileLogic {
    /// Diff between what the rule produces now and what is stored. No writes.
    ///
    /// The window is widened to the last stored date the rule still produces,
    /// so a narrower horizon never trims occurrences already handed out.
    pub fn plan(conn: &Connection, series: &Series, horizon: &Horizon) -> AppResult<OccurrenceDiff> {
        let existing = load_occurrences(conn, series.id)?;
        let stored: Vec<NaiveDate> = existing.iter().map(|o| o.date).collect();

        let horizon =
            horizon.retaining(retained_through(&series.rule, series.start_date(), &stored));
        let evaluated = evaluate(&series.rule, series.start_date(), &horizon);

        Ok(diff_occurrences(&evaluated, &existing))
    }

    /// Diff, apply and refresh the index for one series.
    ///
    /// `conn` must be the series' open write transaction: on any error the
    /// caller drops it and nothing of this call survives. Occurrences that stay
    /// valid are never touched, so their ids (and the responses pointing at
    /// them) survive every recompute.
    pub fn reconcile(
        conn: &Connection,
        series: &Series,
        horizon: &Horizon,
        today: &NaiveDate,
    ) -> AppResult<OccurrenceDiff> {
        let diff = Self::plan(conn, series, horizon)?;

        // Occurrences carrying responses are never removed.
        let doomed: Vec<i64> = diff.to_delete.iter().map(|o| o.id).collect();
        let blocked = occurrences_with_responses(conn, &doomed)?;
        if !blocked.is_empty() {
            let dates = diff
                .to_delete
                .iter()
                .filter(|o| blocked.contains(&o.id))
                .map(|o| o.date_str())
                .collect();
            return Err(AppError::ReconciliationConflict {
                series_id: series.id,
                dates,
            });
        }

        for occ in &diff.to_delete {
            delete_occurrence(conn, occ.id)?;
        }
        for date in &diff.to_insert {
            insert_occurrence(conn, series.id, date)?;
        }

        NextOccurrenceLogic::refresh(conn, series.id, today)?;

        if !diff.is_empty() {
            ttlog(
                conn,
                "reconcile",
                &format!("series {}", series.id),
                &format!(
                    "{} (first added: {})",
                    diff.summary(),
                    diff.to_insert
                        .first()
                        .map(date_to_db)
                        .unwrap_or_else(|| "-".into())
                ),
            )?;
        }

        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;
    use crate::db::queries::{get_series, insert_series};
    use crate::models::frequency::Frequency;
    use crate::models::rule::RecurrenceRule;
    use crate::models::series::SeriesInput;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> chrono::DateTime<chrono::Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap().and_utc()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn weekly_series(pool: &DbPool) -> Series {
        let input = SeriesInput::new("Review", at("2024-01-02 15:00"), at("2024-01-02 16:00"))
            .with_rule(RecurrenceRule::new(Frequency::Weekly, 1));
        let id = insert_series(&pool.conn, &input, "2024-01-01T00:00:00.000000Z").unwrap();
        get_series(&pool.conn, id).unwrap()
    }

    #[test]
    fn narrower_window_keeps_stored_occurrences() {
        let pool = DbPool::open_in_memory().unwrap();
        let series = weekly_series(&pool);
        let today = d("2024-01-01");

        let wide = Horizon::rolling(today, series.start_date(), 60, 500);
        let first = ReconcileLogic::reconcile(&pool.conn, &series, &wide, &today).unwrap();
        assert_eq!(first.to_insert.len(), 9);

        let narrow = Horizon::rolling(today, series.start_date(), 14, 500);
        let plan = ReconcileLogic::plan(&pool.conn, &series, &narrow).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged.len(), 9);
    }

    #[test]
    fn reconcile_points_the_index_at_the_next_date() {
        let pool = DbPool::open_in_memory().unwrap();
        let series = weekly_series(&pool);
        let today = d("2024-01-10");

        let horizon = Horizon::rolling(today, series.start_date(), 30, 500);
        ReconcileLogic::reconcile(&pool.conn, &series, &horizon, &today).unwrap();

        let next = crate::db::queries::load_next(&pool.conn, series.id).unwrap().unwrap();
        assert_eq!(next.date, d("2024-01-16"));
    }
}
