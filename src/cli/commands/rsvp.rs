use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rsvp::RsvpLogic;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::response::{NewResponse, ResponseScope, ResponseValue};
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Rsvp {
        id,
        subject,
        value,
        occurrence,
        note,
    } = cmd
    {
        let value = ResponseValue::from_code(value)
            .ok_or_else(|| AppError::InvalidResponse(value.clone()))?;

        let mut pool = DbPool::new(&cfg.database)?;
        let series = SeriesLogic::get(&pool, *id)?;

        let scope = SeriesLogic::response_scope(&series, *occurrence);
        if occurrence.is_some() && scope == ResponseScope::Series {
            warning("Series does not repeat: recording the response for the whole series.");
        }

        let mut response = NewResponse::new(*id, scope, subject.clone(), value);
        if let Some(n) = note {
            response = response.with_note(n.clone());
        }

        let entry_id = RsvpLogic::record(&mut pool, &response)?;
        success(format!(
            "Response #{} recorded: {} is {}.",
            entry_id,
            subject,
            value.to_db_str()
        ));
    }

    Ok(())
}
