use crate::cli::parser::{Commands, RuleArgs};
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::frequency::Frequency;
use crate::models::rule::RecurrenceRule;
use crate::models::series::SeriesInput;
use crate::models::termination::Termination;
use crate::models::weekday_mask::WeekdayMask;
use crate::ui::messages::{info, success};
use crate::utils::date::{parse_optional_date, resolve_today};
use crate::utils::time::parse_instant;

/// Apply the recurrence options given on the command line on top of `base`.
pub fn build_rule(base: RecurrenceRule, args: &RuleArgs, never: bool) -> AppResult<RecurrenceRule> {
    let mut rule = base;

    if let Some(code) = &args.repeat {
        rule.frequency = Frequency::from_code(code)
            .ok_or_else(|| AppError::InvalidRule(format!("unknown repetition '{}'", code)))?;
    }

    if let Some(interval) = args.interval {
        rule.interval = interval;
    }

    if let Some(days) = &args.days {
        rule.weekday_mask = WeekdayMask::parse_list(days)
            .ok_or_else(|| AppError::InvalidRule(format!("invalid weekday list '{}'", days)))?;
    }

    if let Some(n) = args.count {
        rule.termination = Termination::AfterCount(n);
    } else if let Some(d) = parse_optional_date(args.until.as_ref())? {
        rule.termination = Termination::UntilDate(d);
    } else if never {
        rule.termination = Termination::Never;
    }

    Ok(rule)
}

/// Create a meeting series.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        name,
        start,
        end,
        rule,
        today,
    } = cmd
    {
        let today = resolve_today(today.as_ref())?;
        let start = parse_instant(start).ok_or_else(|| AppError::InvalidTime(start.clone()))?;
        let end = parse_instant(end).ok_or_else(|| AppError::InvalidTime(end.clone()))?;

        let input = SeriesInput::new(name.clone(), start, end)
            .with_rule(build_rule(RecurrenceRule::once(), rule, false)?);

        let mut pool = DbPool::new(&cfg.database)?;
        let (id, diff) = SeriesLogic::create_or_update(&mut pool, None, &input, None, today, cfg)?;

        success(format!(
            "Series #{} '{}' created with {} occurrence(s).",
            id,
            input.name,
            diff.to_insert.len()
        ));

        let next = SeriesLogic::display_occurrence(&mut pool, id, today)?;
        info(format!("Meeting date: {}", next.date_str()));
    }

    Ok(())
}
