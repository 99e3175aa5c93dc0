use crate::cli::commands::{initial_fetch, open_service};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::grid;
use crate::utils::date;

/// Handle the `show` command: one fetch, then the seat map of the day.
pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { date: day } = &cli.command {
        let day = date::iso(date::resolve_date(day.as_deref())?);
        let service = open_service(cli, cfg)?;

        initial_fetch(&service).await;

        let engine = service.engine()?;
        let view = engine.view(&day)?;
        println!("{}", grid::render(&day, |key| engine.seat_status(&view, key)));
    }
    Ok(())
}
