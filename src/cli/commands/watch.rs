use crate::cli::commands::open_service;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::grid;
use crate::ui::messages::{announce_event, info};
use crate::utils::date;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Handle the `watch` command: poll + retry loops, redraw on every change.
pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { date: day } = &cli.command {
        let day = date::iso(date::resolve_date(day.as_deref())?);
        let service = open_service(cli, cfg)?;

        let mut events = service.subscribe();
        let mut revisions = service.revisions();

        let shutdown = CancellationToken::new();
        let tasks = service.spawn(&shutdown);

        info(format!(
            "Watching {day} every {}s (Ctrl-C to stop)",
            cfg.poll_interval_secs
        ));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let frame = {
                        let engine = service.engine()?;
                        let view = engine.view(&day)?;
                        grid::render(&day, |key| engine.seat_status(&view, key))
                    };
                    // clear screen, cursor home
                    print!("\x1b[2J\x1b[H{frame}");
                }
                event = events.recv() => match event {
                    Ok(ev) => announce_event(&ev),
                    Err(RecvError::Lagged(n)) => tracing::debug!("skipped {n} sync events"),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        shutdown.cancel();
        tasks.join().await;
        info("Stopped.");
    }
    Ok(())
}
