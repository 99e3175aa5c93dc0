//! Local pending store: bookings this client submitted that no snapshot has
//! shown yet. Persisted in SQLite so they survive a restart.
//!
//! Entries leave the store only through [`PendingStore::reconcile_against`],
//! once the backend's snapshot carries an entry with the same identity key.

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::pending::{PendingRecord, PendingStatus};
use crate::models::reservation::Reservation;
use crate::models::seat_key::SeatKey;
use crate::models::snapshot::Snapshot;
use chrono::Local;
use rusqlite::{Row, params};

/// Result of matching the store against a fresh snapshot.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Still waiting for the backend to show them.
    pub survivors: Vec<PendingRecord>,
    /// Removed from the store, paired with the snapshot row that matched.
    pub resolved: Vec<(PendingRecord, Reservation)>,
}

pub struct PendingStore {
    pool: DbPool,
}

impl PendingStore {
    pub fn open(path: &str) -> AppResult<Self> {
        Ok(Self {
            pool: DbPool::new(path)?,
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        Ok(Self {
            pool: DbPool::in_memory()?,
        })
    }

    /// Insert a record, replacing any earlier local record for the same key.
    pub fn add(&mut self, record: &PendingRecord) -> AppResult<()> {
        let r = &record.reservation;
        let key = r.key();
        self.pool.conn.execute(
            "INSERT INTO pending_reservations
                (date, location, bay, seat, occupant, department, status, attempts, last_error, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(date, location, bay, seat) DO UPDATE SET
                occupant   = excluded.occupant,
                department = excluded.department,
                status     = excluded.status,
                attempts   = excluded.attempts,
                last_error = excluded.last_error,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                key.date(),
                key.location(),
                key.bay(),
                key.seat(),
                r.occupant,
                r.department,
                record.status.to_db_str(),
                record.attempts,
                record.last_error,
                r.created_at,
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Every pending record, oldest first.
    pub fn all(&self) -> AppResult<Vec<PendingRecord>> {
        let mut stmt = self.pool.conn.prepare(
            "SELECT date, location, bay, seat, occupant, department, status, attempts, last_error, created_at
             FROM pending_reservations
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn get(&self, key: &SeatKey) -> AppResult<Option<PendingRecord>> {
        Ok(self.all()?.into_iter().find(|p| &p.key() == key))
    }

    /// Records whose write never got an answer.
    pub fn unconfirmed(&self) -> AppResult<Vec<PendingRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(PendingRecord::is_unconfirmed)
            .collect())
    }

    /// Change the status of one record after a (re)submission.
    pub fn update_status(
        &mut self,
        key: &SeatKey,
        status: PendingStatus,
        last_error: Option<&str>,
        count_attempt: bool,
    ) -> AppResult<()> {
        if !self.update_status_if_present(key, status, last_error, count_attempt)? {
            return Err(AppError::Other(format!("no pending record for {key}")));
        }
        Ok(())
    }

    /// Like [`PendingStore::update_status`], but a record that a snapshot
    /// already removed is not an error. Returns whether a row was updated.
    pub fn update_status_if_present(
        &mut self,
        key: &SeatKey,
        status: PendingStatus,
        last_error: Option<&str>,
        count_attempt: bool,
    ) -> AppResult<bool> {
        let changed = self.pool.conn.execute(
            "UPDATE pending_reservations
             SET status = ?1,
                 last_error = ?2,
                 attempts = attempts + ?3,
                 updated_at = ?4
             WHERE date = ?5 AND location = ?6 AND bay = ?7 AND seat = ?8",
            params![
                status.to_db_str(),
                last_error,
                if count_attempt { 1 } else { 0 },
                Local::now().to_rfc3339(),
                key.date(),
                key.location(),
                key.bay(),
                key.seat(),
            ],
        )?;

        Ok(changed > 0)
    }

    /// Drop every record the snapshot now carries (same normalized key) and
    /// return what is left.
    pub fn reconcile_against(&mut self, snapshot: &Snapshot) -> AppResult<Reconciliation> {
        let mut outcome = Reconciliation::default();

        for record in self.all()? {
            match snapshot.find(&record.key()) {
                Some(remote) => outcome.resolved.push((record, remote.clone())),
                None => outcome.survivors.push(record),
            }
        }

        if outcome.resolved.is_empty() {
            return Ok(outcome);
        }

        let tx = self.pool.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "DELETE FROM pending_reservations
                 WHERE date = ?1 AND location = ?2 AND bay = ?3 AND seat = ?4",
            )?;
            for (record, _) in &outcome.resolved {
                let key = record.key();
                stmt.execute(params![key.date(), key.location(), key.bay(), key.seat()])?;
            }
        }
        tx.commit()?;

        Ok(outcome)
    }

    /// Append an audit line. Audit failures never abort a booking.
    pub fn audit(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = ttlog(&self.pool.conn, operation, target, message) {
            tracing::warn!("failed to write audit log: {e}");
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn map_row(row: &Row) -> rusqlite::Result<PendingRecord> {
    let status_str: String = row.get("status")?;
    let status = PendingStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid pending status: {status_str}"))),
        )
    })?;

    let date: String = row.get("date")?;
    let location: String = row.get("location")?;
    let bay: String = row.get("bay")?;
    let seat: String = row.get("seat")?;
    let occupant: String = row.get("occupant")?;
    let department: String = row.get("department")?;

    let mut reservation = Reservation::new(&date, &location, &bay, &seat, &occupant, &department);
    reservation.created_at = row.get("created_at")?;

    Ok(PendingRecord {
        reservation,
        status,
        attempts: row.get("attempts")?,
        last_error: row.get("last_error")?,
    })
}
