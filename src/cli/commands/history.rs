use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rsvp::RsvpLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::response::ResponseScope;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::History { id, subject } = cmd {
        let pool = DbPool::new(&cfg.database)?;
        let entries = RsvpLogic::history(&pool.conn, *id, subject)?;

        if entries.is_empty() {
            info(format!("No responses from {} for series #{}.", subject, id));
            return Ok(());
        }

        for e in entries {
            let scope = match e.scope {
                ResponseScope::Series => "series".to_string(),
                ResponseScope::Occurrence(o) => format!("occ #{}", o),
            };
            let note = if e.note.is_empty() {
                String::new()
            } else {
                format!("  \"{}\"", e.note)
            };
            println!(
                "{:>5}  {}  {:<10} {}{}",
                e.id,
                e.created_at,
                scope,
                e.value.to_db_str(),
                note
            );
        }
    }

    Ok(())
}
