use crate::cli::commands::add::build_rule;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::series::SeriesInput;
use crate::ui::messages::{info, success};
use crate::utils::date::resolve_today;
use crate::utils::time::parse_instant;

/// Edit a series; unchanged fields keep their stored value.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        id,
        name,
        start,
        end,
        rule,
        never,
        revision,
        today,
    } = cmd
    {
        let today = resolve_today(today.as_ref())?;
        let mut pool = DbPool::new(&cfg.database)?;

        let current = SeriesLogic::get(&pool, *id)?;
        let mut input = SeriesInput::from(&current);

        if let Some(n) = name {
            input.name = n.clone();
        }
        if let Some(s) = start {
            input.start = parse_instant(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?;
        }
        if let Some(e) = end {
            input.end = parse_instant(e).ok_or_else(|| AppError::InvalidTime(e.clone()))?;
        }
        input.rule = build_rule(current.rule, rule, *never)?;

        let (_, diff) =
            SeriesLogic::create_or_update(&mut pool, Some(*id), &input, *revision, today, cfg)?;

        success(format!(
            "Series #{} updated (revision {}).",
            id,
            current.revision + 1
        ));
        info(format!("Occurrences: {}", diff.summary()));
    }

    Ok(())
}
