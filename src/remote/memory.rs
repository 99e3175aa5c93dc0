//! In-process backend with the same observable behaviour as the sheet:
//! append-only rows, a DUPLICATE check on write, whole-list reads.
//! Used by tests and by `--test` runs of the CLI.

use super::ReservationBackend;
use super::wire::{BookingForm, ReadPayload, WireRecord, WriteResponse};
use crate::errors::{AppError, AppResult};
use crate::models::reservation::Reservation;
use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    rows: Mutex<Vec<WireRecord>>,
    rules: Mutex<Option<Vec<Value>>>,
    offline: AtomicBool,
    lose_next_reply: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row as if another client had written it.
    pub fn seed(&self, reservation: &Reservation) -> AppResult<()> {
        self.seed_raw(WireRecord::from(reservation))
    }

    /// Append a row verbatim (drifted formats included).
    pub fn seed_raw(&self, record: WireRecord) -> AppResult<()> {
        self.lock_rows()?.push(record);
        Ok(())
    }

    /// Reads start answering with the envelope shape carrying these rules.
    pub fn set_rules(&self, rules: Vec<Value>) -> AppResult<()> {
        let mut guard = self
            .rules
            .lock()
            .map_err(|_| AppError::Other("memory backend lock poisoned".into()))?;
        *guard = Some(rules);
        Ok(())
    }

    /// Every call fails with a network error while offline.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next write is stored but its reply is lost.
    pub fn lose_next_reply(&self) {
        self.lose_next_reply.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> AppResult<Vec<Reservation>> {
        Ok(self
            .lock_rows()?
            .iter()
            .map(WireRecord::to_reservation)
            .collect())
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock_rows(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<WireRecord>>> {
        self.rows
            .lock()
            .map_err(|_| AppError::Other("memory backend lock poisoned".into()))
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Network("backend offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationBackend for InMemoryBackend {
    async fn fetch(&self) -> AppResult<ReadPayload> {
        self.check_online()?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let records = self.lock_rows()?.clone();
        let rules = self
            .rules
            .lock()
            .map_err(|_| AppError::Other("memory backend lock poisoned".into()))?
            .clone();

        Ok(match rules {
            Some(config) => ReadPayload::Envelope {
                reservations: records,
                config,
            },
            None => ReadPayload::Bare(records),
        })
    }

    async fn submit(&self, form: &BookingForm) -> AppResult<WriteResponse> {
        self.check_online()?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let wanted = form.to_reservation();
        let key = wanted.key();

        {
            let mut rows = self.lock_rows()?;
            if let Some(holder) = rows
                .iter()
                .map(WireRecord::to_reservation)
                .find(|r| r.key() == key)
            {
                return Ok(WriteResponse::duplicate(format!(
                    "Seat {} is already booked by {}",
                    key.seat_id(),
                    holder.holder()
                )));
            }

            rows.push(WireRecord::from(
                &wanted.with_created_at(Local::now().to_rfc3339()),
            ));
        }

        if self.lose_next_reply.swap(false, Ordering::SeqCst) {
            return Err(AppError::Network("connection reset after write".to_string()));
        }

        Ok(WriteResponse::ok())
    }
}
