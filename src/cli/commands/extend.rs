use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{error, success};
use crate::utils::date::resolve_today;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Extend { today } = cmd {
        let today = resolve_today(today.as_ref())?;
        let mut pool = DbPool::new(&cfg.database)?;

        let report = SeriesLogic::extend_horizons(&mut pool, today, cfg)?;

        for (id, diff) in &report.extended {
            if !diff.is_empty() {
                println!("#{:<5} {}", id, diff.summary());
            }
        }
        for (id, e) in &report.failed {
            error(format!("#{}: {}", id, e));
        }

        success(format!(
            "{} rolling series checked, {} failed.",
            report.extended.len() + report.failed.len(),
            report.failed.len()
        ));
    }

    Ok(())
}
