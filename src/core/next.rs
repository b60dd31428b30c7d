use crate::db::pool::DbPool;
use crate::db::queries::{
    delete_next, future_occurrences, get_series, load_next, load_occurrence, past_occurrences,
    stale_next_series_ids, upcoming_next, upsert_next,
};
use crate::errors::{AppError, AppResult};
use crate::models::next_occurrence::NextOccurrence;
use crate::models::occurrence::Occurrence;
use crate::models::series::Series;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Maintenance of the next-occurrence index.
pub struct NextOccurrenceLogic;

impl NextOccurrenceLogic {
    /// Closest occurrence for display: soonest on/after `today`, else the
    /// most recent past one.
    pub fn select(conn: &Connection, series_id: i64, today: &NaiveDate) -> AppResult<Option<Occurrence>> {
        if let Some(upcoming) = future_occurrences(conn, series_id, today, 1)?.into_iter().next() {
            return Ok(Some(upcoming));
        }
        Ok(past_occurrences(conn, series_id, today, 1)?.into_iter().next())
    }

    /// Recompute the index row of one series. Must run inside the series'
    /// write transaction.
    pub fn refresh(conn: &Connection, series_id: i64, today: &NaiveDate) -> AppResult<Option<NextOccurrence>> {
        match Self::select(conn, series_id, today)? {
            Some(occ) => {
                let next = NextOccurrence {
                    series_id,
                    occurrence_id: occ.id,
                    date: occ.date,
                };
                upsert_next(conn, &next)?;
                Ok(Some(next))
            }
            None => {
                delete_next(conn, series_id)?;
                Ok(None)
            }
        }
    }

    /// Occurrence to show as "the meeting date". Reads the index only,
    /// refreshing it on read when `today` moved past the stored pick.
    pub fn display(pool: &mut DbPool, series_id: i64, today: &NaiveDate) -> AppResult<Occurrence> {
        let current = load_next(&pool.conn, series_id)?;

        let next = match current {
            Some(n) if !n.is_stale(*today) => n,
            _ => {
                let tx = pool.begin_series_write(series_id)?;
                get_series(&tx, series_id)?;
                let refreshed = Self::refresh(&tx, series_id, today)?;
                tx.commit()?;
                refreshed.ok_or_else(|| {
                    AppError::NotFound(format!("occurrences of series {}", series_id))
                })?
            }
        };

        load_occurrence(&pool.conn, next.occurrence_id)?.ok_or_else(|| {
            AppError::NotFound(format!("occurrence {}", next.occurrence_id))
        })
    }

    /// Series whose display date is on or after `today`, nearest first.
    pub fn upcoming(pool: &mut DbPool, today: &NaiveDate) -> AppResult<Vec<(Series, NextOccurrence)>> {
        for series_id in stale_next_series_ids(&pool.conn, today)? {
            let tx = pool.begin_series_write(series_id)?;
            Self::refresh(&tx, series_id, today)?;
            tx.commit()?;
        }

        let mut out = Vec::new();
        for next in upcoming_next(&pool.conn, today)? {
            let series = get_series(&pool.conn, next.series_id)?;
            out.push((series, next));
        }
        Ok(out)
    }
}
