use crate::cli::commands::open_store;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{GREY, RESET, YELLOW};
use crate::utils::formatting::{pad_right, truncate};

/// Handle the `pending` command: bookings the shared sheet does not show yet.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = open_store(cfg)?;
    let records = store.all()?;

    if records.is_empty() {
        println!("No pending bookings.");
        return Ok(());
    }

    println!(
        "{}{} {} {} {} {} {}{}",
        GREY,
        pad_right("DATE", 10),
        pad_right("SEAT", 12),
        pad_right("NAME", 24),
        pad_right("STATUS", 12),
        pad_right("TRIES", 5),
        "LAST ERROR",
        RESET
    );

    for p in records {
        let r = &p.reservation;
        println!(
            "{} {} {} {}{}{} {} {}",
            pad_right(&r.date, 10),
            pad_right(&r.seat_id(), 12),
            pad_right(&truncate(&r.holder(), 24), 24),
            YELLOW,
            pad_right(p.status.to_db_str(), 12),
            RESET,
            pad_right(&p.attempts.to_string(), 5),
            truncate(p.last_error.as_deref().unwrap_or("-"), 40)
        );
    }

    Ok(())
}
