use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::next::NextOccurrenceLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::date::resolve_today;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Upcoming { today } = cmd {
        let today = resolve_today(today.as_ref())?;
        let mut pool = DbPool::new(&cfg.database)?;

        let rows = NextOccurrenceLogic::upcoming(&mut pool, &today)?;
        if rows.is_empty() {
            info(format!("No meetings on or after {}.", today));
            return Ok(());
        }

        for (series, next) in rows {
            println!("{}  #{:<5} {}", next.date, series.id, series.name);
        }
    }

    Ok(())
}
