//! rMeetings main entrypoint.

use rmeetings::run;
use rmeetings::ui::messages::{error, warning};

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        if e.is_retryable() {
            warning("Nothing was changed. Re-read the series and try again.");
        }
        std::process::exit(1);
    }
}
