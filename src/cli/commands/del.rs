use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::series::SeriesLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let mut pool = DbPool::new(&cfg.database)?;
        let series = SeriesLogic::get(&pool, *id)?;

        let prompt = format!(
            "Delete series #{} '{}' with all its occurrences and responses? This action is irreversible.",
            id, series.name
        );

        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        SeriesLogic::delete(&mut pool, *id)?;
        success(format!("Series #{} has been deleted.", id));
    }

    Ok(())
}
