pub mod book;
pub mod config;
pub mod export;
pub mod init;
pub mod log;
pub mod pending;
pub mod show;
pub mod watch;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::engine::ReservationEngine;
use crate::core::sync::{SyncService, SyncSettings};
use crate::db::pending::PendingStore;
use crate::errors::AppResult;
use crate::remote::{HttpBackend, InMemoryBackend, ReservationBackend};
use crate::ui::messages::warning;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Open the pending store, creating its directory when needed.
pub(crate) fn open_store(cfg: &Config) -> AppResult<PendingStore> {
    if let Some(parent) = Path::new(&cfg.database).parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    PendingStore::open(&cfg.database)
}

/// Wire engine, pending store and backend together for one command run.
pub(crate) fn open_service(cli: &Cli, cfg: &Config) -> AppResult<SyncService> {
    let backend: Arc<dyn ReservationBackend> = if cli.test && cfg.api_url.trim().is_empty() {
        Arc::new(InMemoryBackend::new())
    } else {
        Arc::new(HttpBackend::new(
            cfg.api_url.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        )?)
    };

    let engine = ReservationEngine::new(open_store(cfg)?);
    Ok(SyncService::new(engine, backend, SyncSettings::from(cfg)))
}

/// First fetch of a one-shot command, retrying unconfirmed bookings on the
/// way. A failure leaves the local view usable.
pub(crate) async fn initial_fetch(service: &SyncService) {
    if let Err(e) = service.sync_once().await {
        warning(format!(
            "Could not reach the reservation sheet ({e}); showing local data only."
        ));
    }
}
