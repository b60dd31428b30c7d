use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::occurrence::Occurrence;
use crate::models::series::Series;
use crate::utils::date::resolve_today;
use crate::utils::time::format_instant;
use serde::Serialize;

#[derive(Serialize)]
struct OccurrenceRow {
    id: i64,
    date: String,
    start: String,
    end: String,
}

fn to_rows(series: &Series, occurrences: &[Occurrence]) -> Vec<OccurrenceRow> {
    occurrences
        .iter()
        .map(|o| OccurrenceRow {
            id: o.id,
            date: o.date_str(),
            start: o.start_at(series).to_rfc3339(),
            end: o.end_at(series).to_rfc3339(),
        })
        .collect()
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        id,
        past,
        limit,
        today,
        json,
    } = cmd
    {
        let today = resolve_today(today.as_ref())?;
        let limit = limit.unwrap_or(cfg.list_limit);
        let pool = DbPool::new(&cfg.database)?;

        let series = SeriesLogic::get(&pool, *id)?;
        let occurrences = if *past {
            SeriesLogic::list_past(&pool, *id, today, limit)?
        } else {
            SeriesLogic::list_future(&pool, *id, today, limit)?
        };

        if *json {
            let out = serde_json::to_string_pretty(&to_rows(&series, &occurrences))
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        if occurrences.is_empty() {
            println!(
                "No {} occurrences for series #{}",
                if *past { "past" } else { "upcoming" },
                id
            );
            return Ok(());
        }

        for o in &occurrences {
            println!(
                "{:>6}  {}  {} → {}",
                o.id,
                o.date_str(),
                format_instant(&o.start_at(&series)),
                format_instant(&o.end_at(&series))
            );
        }
    }
    Ok(())
}
