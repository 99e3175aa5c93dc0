//! Sync service: the engine plus the two scheduled tasks that keep it fresh.
//!
//! - poll loop: fetches the snapshot on a fixed interval or on demand
//! - retry loop: re-sends unconfirmed bookings after a successful fetch
//!
//! The engine sits behind a mutex that is never held across an await, so the
//! last good view stays readable while a fetch or a write is in flight.
//! Observers follow changes through a revision counter (`watch`) and a stream
//! of [`SyncEvent`]s (`broadcast`).

use crate::config::Config;
use crate::core::engine::{ApplyOutcome, ReservationEngine, Resolution, SeatStatus};
use crate::core::reconciler::MergedView;
use crate::errors::{AppError, AppResult};
use crate::models::booking::BookingOutcome;
use crate::models::pending::PendingRecord;
use crate::models::reservation::Reservation;
use crate::models::seat_key::SeatKey;
use crate::remote::ReservationBackend;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Notify, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub poll_interval: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
        }
    }
}

impl From<&Config> for SyncSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            poll_interval: Duration::from_secs(cfg.poll_interval_secs.max(1)),
        }
    }
}

/// Notifications for whoever renders the seat map.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    SnapshotApplied { seq: u64, rows: usize },
    FetchFailed { message: String },
    Resolved(Resolution),
    SelectionLost { key: SeatKey, winner: Reservation },
    Booking(BookingOutcome),
    RetryAcknowledged(SeatKey),
    RetryConflicted { key: SeatKey, message: String },
}

/// Summary of one retry pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    pub acknowledged: usize,
    pub conflicted: usize,
    pub still_pending: usize,
}

/// Handles of the two background tasks.
pub struct SyncTasks {
    pub poll: JoinHandle<()>,
    pub retry: JoinHandle<()>,
}

impl SyncTasks {
    pub async fn join(self) {
        if let Err(e) = self.poll.await {
            warn!("poll loop ended abnormally: {e}");
        }
        if let Err(e) = self.retry.await {
            warn!("retry loop ended abnormally: {e}");
        }
    }
}

struct Inner {
    engine: Mutex<ReservationEngine>,
    backend: Arc<dyn ReservationBackend>,
    settings: SyncSettings,
    fetch_seq: AtomicU64,
    refresh: Notify,
    retry: Notify,
    revision: watch::Sender<u64>,
    events: broadcast::Sender<SyncEvent>,
}

#[derive(Clone)]
pub struct SyncService {
    inner: Arc<Inner>,
}

impl SyncService {
    pub fn new(
        engine: ReservationEngine,
        backend: Arc<dyn ReservationBackend>,
        settings: SyncSettings,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                engine: Mutex::new(engine),
                backend,
                settings,
                fetch_seq: AtomicU64::new(0),
                refresh: Notify::new(),
                retry: Notify::new(),
                revision,
                events,
            }),
        }
    }

    pub(crate) fn engine(&self) -> AppResult<MutexGuard<'_, ReservationEngine>> {
        self.inner
            .engine
            .lock()
            .map_err(|_| AppError::Other("reservation engine lock poisoned".into()))
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ReservationBackend> {
        &self.inner.backend
    }

    // ---------------------------
    // Read side
    // ---------------------------

    pub fn view(&self, date: &str) -> AppResult<MergedView> {
        self.engine()?.view(date)
    }

    pub fn seat_status(&self, key: &SeatKey) -> AppResult<SeatStatus> {
        let engine = self.engine()?;
        let view = engine.view(key.date())?;
        Ok(engine.seat_status(&view, key))
    }

    pub fn pending(&self) -> AppResult<Vec<PendingRecord>> {
        self.engine()?.pending()
    }

    pub fn select(&self, key: SeatKey) -> AppResult<()> {
        self.engine()?.select(key)?;
        self.bump_revision();
        Ok(())
    }

    pub fn clear_selection(&self) -> AppResult<()> {
        self.engine()?.clear_selection();
        self.bump_revision();
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Receiver that changes every time the merged view may have changed.
    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Ask the poll loop for an immediate fetch.
    pub fn request_refresh(&self) {
        self.inner.refresh.notify_one();
    }

    pub(crate) fn publish(&self, event: SyncEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn bump_revision(&self) {
        self.inner.revision.send_modify(|r| *r += 1);
    }

    // ---------------------------
    // Fetch
    // ---------------------------

    /// Fetch the snapshot once and fold it into the engine.
    ///
    /// On failure the previous snapshot stays in place. A response that
    /// arrives after a newer one was applied is dropped.
    pub async fn fetch_once(&self) -> AppResult<ApplyOutcome> {
        let seq = self.inner.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "fetching snapshot");

        let payload = match self.inner.backend.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(seq, "snapshot fetch failed, keeping last good data: {e}");
                self.publish(SyncEvent::FetchFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let snapshot = payload.into_snapshot(seq);
        let outcome = {
            let mut engine = self.engine()?;
            engine.apply_snapshot(snapshot)?
        };

        if let ApplyOutcome::Applied {
            seq,
            rows,
            resolved,
            unconfirmed,
            selection_lost,
            ..
        } = &outcome
        {
            debug!(seq, rows, "snapshot applied");
            self.bump_revision();
            self.publish(SyncEvent::SnapshotApplied {
                seq: *seq,
                rows: *rows,
            });
            for r in resolved {
                self.publish(SyncEvent::Resolved(r.clone()));
            }
            if let Some((key, winner)) = selection_lost {
                info!(seat = %key, winner = %winner.occupant, "selected seat was taken");
                self.publish(SyncEvent::SelectionLost {
                    key: key.clone(),
                    winner: winner.clone(),
                });
            }
            if *unconfirmed > 0 {
                self.inner.retry.notify_one();
            }
        }

        Ok(outcome)
    }

    /// Fetch once, then re-send unconfirmed bookings in place when the fetch
    /// left some behind. For callers that run without the retry loop.
    pub async fn sync_once(&self) -> AppResult<ApplyOutcome> {
        let outcome = self.fetch_once().await?;

        if let ApplyOutcome::Applied { unconfirmed, .. } = &outcome
            && *unconfirmed > 0
        {
            let report = self.retry_pending().await?;
            info!(
                acknowledged = report.acknowledged,
                conflicted = report.conflicted,
                still_pending = report.still_pending,
                "retried unconfirmed bookings"
            );
        }

        Ok(outcome)
    }

    /// Fetch after a write so this client sees the sheet's verdict at once.
    pub(crate) async fn refresh_after_write(&self) {
        if let Err(e) = self.fetch_once().await {
            debug!("refresh after write failed: {e}");
        }
    }

    // ---------------------------
    // Scheduled tasks
    // ---------------------------

    /// Poll until `shutdown` fires. Errors are logged and never stop the loop.
    pub async fn run_poll_loop(self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.inner.settings.poll_interval.as_millis() as u64,
            "poll loop started"
        );

        let mut ticker = tokio::time::interval(self.inner.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.inner.refresh.notified() => {
                    ticker.reset();
                }
            }

            // failure already logged inside fetch_once
            let _ = self.fetch_once().await;
        }

        info!("poll loop stopped");
    }

    /// Re-send unconfirmed bookings each time a fetch leaves some behind.
    pub async fn run_retry_loop(self, shutdown: CancellationToken) {
        info!("retry loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.inner.retry.notified() => {}
            }

            match self.retry_pending().await {
                Ok(report) if report != RetryReport::default() => {
                    info!(
                        acknowledged = report.acknowledged,
                        conflicted = report.conflicted,
                        still_pending = report.still_pending,
                        "retry pass finished"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("retry pass failed: {e}"),
            }
        }

        info!("retry loop stopped");
    }

    /// Start both loops on the current runtime.
    pub fn spawn(&self, shutdown: &CancellationToken) -> SyncTasks {
        SyncTasks {
            poll: tokio::spawn(self.clone().run_poll_loop(shutdown.clone())),
            retry: tokio::spawn(self.clone().run_retry_loop(shutdown.clone())),
        }
    }
}
