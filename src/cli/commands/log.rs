use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_operation};
use crate::utils::formatting::{pad_right, truncate};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let store = open_store(cfg)?;
        let rows = load_log(&store.pool().conn, *limit)?;

        if rows.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        println!("📜 Internal log:\n");

        // oldest first on screen
        for row in rows.iter().rev() {
            let date = chrono::DateTime::parse_from_rfc3339(&row.date)
                .map(|dt| dt.format("%F %T").to_string())
                .unwrap_or_else(|_| row.date.clone());

            let op_target = if row.target.is_empty() {
                row.operation.clone()
            } else {
                format!("{} ({})", row.operation, row.target)
            };

            println!(
                "{}  {}{}{}  {}",
                date,
                color_for_operation(&row.operation),
                pad_right(&truncate(&op_target, 48), 48),
                RESET,
                row.message
            );
        }
    }

    Ok(())
}
