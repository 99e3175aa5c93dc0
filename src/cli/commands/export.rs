use crate::cli::commands::{initial_fetch, open_service};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::export_view;
use crate::utils::date;

pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        date: day,
        force,
    } = &cli.command
    {
        let day = date::iso(date::resolve_date(day.as_deref())?);
        let service = open_service(cli, cfg)?;
        initial_fetch(&service).await;

        let view = service.view(&day)?;
        export_view(&view, *format, file, *force)?;
    }
    Ok(())
}
