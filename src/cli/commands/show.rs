use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::date::resolve_today;
use crate::utils::time::{format_duration, format_instant};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { id, today } = cmd {
        let today = resolve_today(today.as_ref())?;
        let mut pool = DbPool::new(&cfg.database)?;

        let series = SeriesLogic::get(&pool, *id)?;
        let next = SeriesLogic::display_occurrence(&mut pool, *id, today)?;

        header(format!("#{} {}", series.id, series.name));
        println!("Start     : {}", format_instant(&series.start));
        println!("Duration  : {}", format_duration(series.duration()));
        if series.is_repeated() {
            println!("Repeat    : {}", series.rule);
            if series.rule.termination.is_open_ended() {
                println!("Horizon   : rolling, {} days ahead", cfg.horizon_days);
            }
        }
        println!(
            "Meeting   : {} → {} (occurrence #{})",
            format_instant(&next.start_at(&series)),
            format_instant(&next.end_at(&series)),
            next.id
        );
        println!("Revision  : {}", series.revision);
    }

    Ok(())
}
