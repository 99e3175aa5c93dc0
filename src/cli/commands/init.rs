use crate::cli::commands::open_store;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite pending store with all migrations applied
pub fn handle(cli: &Cli) -> AppResult<()> {
    //
    // 1️⃣ CONFIGURATION
    //
    let cfg = Config::init_all(cli.db.clone(), cli.url.clone(), cli.test)?;

    println!("⚙️  Initializing seatsync…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &cfg.database);

    //
    // 2️⃣ PENDING STORE (tables + migrations)
    //
    let store = open_store(&cfg)?;
    store.audit(
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    );

    success(format!("Database initialized at {}", &cfg.database));

    if cfg.api_url.trim().is_empty() {
        warning("No backend URL configured yet: set `api_url` with `seatsync config --edit`.");
    }

    Ok(())
}
