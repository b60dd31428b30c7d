use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rsvp::RsvpLogic;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::date::resolve_today;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status {
        id,
        subject,
        occurrence,
        today,
    } = cmd
    {
        let today = resolve_today(today.as_ref())?;
        let mut pool = DbPool::new(&cfg.database)?;

        // Without an explicit occurrence, answer for the current meeting date.
        let occurrence_id = match occurrence {
            Some(o) => *o,
            None => SeriesLogic::display_occurrence(&mut pool, *id, today)?.id,
        };

        match RsvpLogic::resolve_current(&pool.conn, *id, occurrence_id, subject)? {
            Some(entry) => println!(
                "{} on occurrence #{}: {} ({})",
                subject,
                occurrence_id,
                entry.value.to_db_str(),
                entry.created_at
            ),
            None => info(format!(
                "{} has not responded for occurrence #{}.",
                subject, occurrence_id
            )),
        }
    }

    Ok(())
}
