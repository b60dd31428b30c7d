use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;

const OP_WIDTH_MAX: usize = 40;

fn op_target(row: &LogRow) -> String {
    if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut t: String = s.chars().take(max.saturating_sub(3)).collect();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}

/// One printable line per log row, columns aligned.
pub fn format_log(rows: &[LogRow]) -> Vec<String> {
    let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
    let date_w = rows.iter().map(|r| r.date.len()).max().unwrap_or(10);
    let op_w = rows
        .iter()
        .map(|r| op_target(r).chars().count())
        .max()
        .unwrap_or(10)
        .min(OP_WIDTH_MAX);

    rows.iter()
        .map(|r| {
            format!(
                "{:>id_w$}: {:<date_w$} | {:<op_w$} => {}",
                r.id,
                r.date,
                truncate(&op_target(r), OP_WIDTH_MAX),
                r.message,
            )
        })
        .collect()
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let rows = load_log(&pool.conn)?;

        println!("📜 Internal log:\n");
        for line in format_log(&rows) {
            println!("{}", line);
        }

        Ok(())
    }
}
