use crate::cli::commands::{initial_fetch, open_service};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::booking::{BookingOutcome, BookingRequest};
use crate::models::location::Location;
use crate::ui::messages::announce_outcome;
use crate::utils::date;

/// Handle the `book` command.
pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Book {
        date: day,
        location,
        bay,
        seat,
        name,
        department,
    } = &cli.command
    {
        //
        // 1. Parse input (nothing leaves the machine if this fails)
        //
        let day = date::resolve_date(day.as_deref())?;
        let location = Location::from_code(location).ok_or_else(|| {
            AppError::InvalidLocation(format!(
                "'{}'. Use one of: {}",
                location,
                Location::ALL.map(|l| l.code()).join(", ")
            ))
        })?;

        let request = BookingRequest {
            date: day,
            location,
            bay: *bay,
            seat: *seat,
            occupant: name.trim().to_string(),
            department: department.trim().to_string(),
        };

        //
        // 2. Fresh view, then submit
        //
        let service = open_service(cli, cfg)?;
        initial_fetch(&service).await;

        let outcome = service.submit(request).await?;
        announce_outcome(&outcome);

        if let BookingOutcome::Failed { message, .. } = outcome {
            return Err(AppError::Other(message));
        }
    }
    Ok(())
}
