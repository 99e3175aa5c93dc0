//! Reservation engine: owns the last good snapshot, the local pending store
//! and the single selection of this client.

use crate::core::normalize::same_person;
use crate::core::reconciler::{MergedView, Origin, merge};
use crate::db::pending::PendingStore;
use crate::errors::{AppError, AppResult};
use crate::models::booking::{BookingRequest, BookingState};
use crate::models::location::Location;
use crate::models::pending::{PendingRecord, PendingStatus};
use crate::models::reservation::Reservation;
use crate::models::seat_key::SeatKey;
use crate::models::snapshot::Snapshot;
use tracing::{debug, info, warn};

/// The seat this client is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: SeatKey,
    pub state: BookingState,
}

/// What a seat looks like to this client right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatStatus {
    Available,
    Selected,
    Submitting,
    Occupied(Reservation),
    Pending(Reservation, PendingStatus),
}

/// How a pending record ended once the snapshot caught up with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The sheet shows our own booking.
    Confirmed(Reservation),
    /// The sheet shows somebody else on the seat.
    Lost {
        mine: Reservation,
        winner: Reservation,
    },
}

#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    Applied {
        seq: u64,
        rows: usize,
        resolved: Vec<Resolution>,
        survivors: usize,
        unconfirmed: usize,
        selection_lost: Option<(SeatKey, Reservation)>,
    },
    /// An older request answered after a newer one was applied.
    Stale { seq: u64, current: u64 },
}

/// Result of re-sending one unconfirmed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryResult {
    Acknowledged,
    Conflicted(String),
    StillFailing(String),
}

pub struct ReservationEngine {
    snapshot: Option<Snapshot>,
    applied_seq: u64,
    pending: PendingStore,
    selection: Option<Selection>,
}

impl ReservationEngine {
    pub fn new(pending: PendingStore) -> Self {
        Self {
            snapshot: None,
            applied_seq: 0,
            pending,
            selection: None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn pending(&self) -> AppResult<Vec<PendingRecord>> {
        self.pending.all()
    }

    pub fn pending_store(&self) -> &PendingStore {
        &self.pending
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Merged occupancy of `date`.
    pub fn view(&self, date: &str) -> AppResult<MergedView> {
        Ok(merge(date, self.snapshot.as_ref(), &self.pending.all()?))
    }

    pub fn seat_status(&self, view: &MergedView, key: &SeatKey) -> SeatStatus {
        if let Some(entry) = view.get(key) {
            return match entry.origin {
                Origin::Remote => SeatStatus::Occupied(entry.reservation.clone()),
                Origin::Pending(status) => SeatStatus::Pending(entry.reservation.clone(), status),
            };
        }

        match &self.selection {
            Some(sel) if &sel.key == key && sel.state == BookingState::Submitting => {
                SeatStatus::Submitting
            }
            Some(sel) if &sel.key == key => SeatStatus::Selected,
            _ => SeatStatus::Available,
        }
    }

    // ---------------------------
    // Snapshot intake
    // ---------------------------

    /// Install a freshly fetched snapshot unless a newer one is already in
    /// place, then drop every pending record the snapshot now carries.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> AppResult<ApplyOutcome> {
        if snapshot.seq <= self.applied_seq {
            debug!(
                seq = snapshot.seq,
                current = self.applied_seq,
                "dropping out-of-order snapshot"
            );
            return Ok(ApplyOutcome::Stale {
                seq: snapshot.seq,
                current: self.applied_seq,
            });
        }

        if snapshot.shadowed() > 0 {
            warn!(
                seq = snapshot.seq,
                shadowed = snapshot.shadowed(),
                "backend holds repeated bookings for the same seat; keeping the earliest"
            );
        }

        let reconciliation = self.pending.reconcile_against(&snapshot)?;

        let mut resolved = Vec::with_capacity(reconciliation.resolved.len());
        for (record, remote) in reconciliation.resolved {
            let target = record.key().to_string();
            if same_person(&record.reservation.occupant, &remote.occupant) {
                info!(seat = %target, "pending booking confirmed by snapshot");
                self.pending
                    .audit("confirm", &target, "booking visible in snapshot");
                resolved.push(Resolution::Confirmed(remote));
            } else {
                warn!(seat = %target, winner = %remote.occupant, "pending booking lost to another client");
                self.pending.audit(
                    "lost",
                    &target,
                    &format!("seat taken by {}", remote.holder()),
                );
                resolved.push(Resolution::Lost {
                    mine: record.reservation,
                    winner: remote,
                });
            }
        }

        let selection_lost = match &self.selection {
            Some(sel) if sel.state == BookingState::Idle => snapshot
                .find(&sel.key)
                .map(|winner| (sel.key.clone(), winner.clone())),
            _ => None,
        };
        if selection_lost.is_some() {
            self.selection = None;
        }

        let outcome = ApplyOutcome::Applied {
            seq: snapshot.seq,
            rows: snapshot.reservations().len(),
            resolved,
            survivors: reconciliation.survivors.len(),
            unconfirmed: reconciliation
                .survivors
                .iter()
                .filter(|p| p.is_unconfirmed())
                .count(),
            selection_lost,
        };

        self.applied_seq = snapshot.seq;
        self.snapshot = Some(snapshot);

        Ok(outcome)
    }

    // ---------------------------
    // Selection
    // ---------------------------

    /// Mark a free seat as the one this client is about to book.
    pub fn select(&mut self, key: SeatKey) -> AppResult<()> {
        if let Some(sel) = &self.selection
            && sel.state == BookingState::Submitting
        {
            return Err(AppError::SubmissionInProgress(sel.key.seat_id()));
        }

        check_layout(&key)?;

        let view = self.view(key.date())?;
        if let Some(holder) = view.occupant(&key) {
            return Err(AppError::SeatOccupied {
                seat: key.seat_id(),
                occupant: holder.holder(),
            });
        }

        self.selection = Some(Selection {
            key,
            state: BookingState::Idle,
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ---------------------------
    // Submission
    // ---------------------------

    /// Departments allowed at `location`: backend rules first, built-in list otherwise.
    pub fn departments_for(&self, location: Location) -> Vec<String> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.departments_for(location))
            .filter(|list| !list.is_empty())
            .map(|list| list.to_vec())
            .unwrap_or_else(|| {
                location
                    .default_departments()
                    .iter()
                    .map(|d| d.to_string())
                    .collect()
            })
    }

    /// Client-side checks run before any network call.
    pub fn validate(&self, request: &BookingRequest) -> AppResult<()> {
        if request.occupant.trim().is_empty() {
            return Err(AppError::Validation("full name is required".into()));
        }

        if request.department.trim().is_empty() {
            return Err(AppError::Validation("department is required".into()));
        }

        let allowed = self.departments_for(request.location);
        if !allowed
            .iter()
            .any(|d| d.eq_ignore_ascii_case(request.department.trim()))
        {
            return Err(AppError::Validation(format!(
                "department '{}' cannot book in {} (allowed: {})",
                request.department.trim(),
                request.location,
                allowed.join(", ")
            )));
        }

        let layout = request.location.layout();
        if !layout.contains(request.bay, request.seat) {
            return Err(AppError::Validation(format!(
                "{} has bays 1-{} with seats 1-{}",
                request.location,
                layout.bays,
                layout.seats_per_bay()
            )));
        }

        Ok(())
    }

    /// `Idle -> Submitting`. Returns the current holder instead when the
    /// merged view already shows the seat taken.
    pub fn begin_submission(&mut self, request: &BookingRequest) -> AppResult<Option<Reservation>> {
        self.validate(request)?;
        let key = request.key();

        if let Some(sel) = &self.selection
            && sel.state == BookingState::Submitting
        {
            return Err(AppError::SubmissionInProgress(sel.key.seat_id()));
        }

        let view = self.view(key.date())?;
        if let Some(holder) = view.occupant(&key) {
            self.settle(&key);
            return Ok(Some(holder.clone()));
        }

        self.pending
            .audit("submit", &key.to_string(), &request.occupant);
        self.selection = Some(Selection {
            key,
            state: BookingState::Submitting,
        });
        Ok(None)
    }

    /// `Submitting -> Confirmed`: keep the booking visible until the snapshot has it.
    pub fn record_confirmed(&mut self, reservation: &Reservation) -> AppResult<()> {
        let record = PendingRecord::new(reservation.clone(), PendingStatus::Acknowledged);
        self.pending.add(&record)?;
        self.pending
            .audit("confirm", &reservation.key().to_string(), "backend accepted booking");
        self.settle(&reservation.key());
        Ok(())
    }

    /// `Submitting -> ConnectionFailed`: keep the booking as unconfirmed for retry.
    pub fn record_connection_failed(
        &mut self,
        reservation: &Reservation,
        error: &str,
    ) -> AppResult<PendingRecord> {
        let mut record = PendingRecord::new(reservation.clone(), PendingStatus::Unconfirmed);
        record.last_error = Some(error.to_string());
        self.pending.add(&record)?;
        self.pending
            .audit("retain", &reservation.key().to_string(), error);
        self.settle(&reservation.key());
        Ok(record)
    }

    /// `Submitting -> Rejected` (or a generic failure): nothing is kept.
    pub fn record_rejected(&mut self, key: &SeatKey, message: &str) {
        self.pending.audit("reject", &key.to_string(), message);
        self.settle(key);
    }

    /// Store the answer to a retried unconfirmed record.
    ///
    /// Returns `false` when a snapshot applied while the retry was in flight
    /// already resolved the record; nothing is stored then.
    pub fn record_retry(&mut self, key: &SeatKey, result: &RetryResult) -> AppResult<bool> {
        let (status, last_error) = match result {
            RetryResult::Acknowledged => (PendingStatus::Acknowledged, None),
            RetryResult::Conflicted(message) => (PendingStatus::Conflicted, Some(message.as_str())),
            RetryResult::StillFailing(error) => (PendingStatus::Unconfirmed, Some(error.as_str())),
        };

        let present = self
            .pending
            .update_status_if_present(key, status, last_error, true)?;
        if !present {
            debug!(seat = %key, "retried booking already resolved by a snapshot");
            return Ok(false);
        }

        let target = key.to_string();
        match result {
            RetryResult::Acknowledged => {
                self.pending.audit("retry", &target, "backend accepted booking")
            }
            RetryResult::Conflicted(message) => self.pending.audit("retry", &target, message),
            RetryResult::StillFailing(_) => {}
        }
        Ok(true)
    }

    fn settle(&mut self, key: &SeatKey) {
        if self.selection.as_ref().is_some_and(|s| &s.key == key) {
            self.selection = None;
        }
    }
}

/// A key only names a real seat when its location is known and bay/seat fit the layout.
fn check_layout(key: &SeatKey) -> AppResult<()> {
    let location = Location::from_code(key.location())
        .ok_or_else(|| AppError::InvalidLocation(key.location().to_string()))?;

    let bay = key.bay().parse::<u32>().ok();
    let seat = key.seat().parse::<u32>().ok();
    match (bay, seat) {
        (Some(b), Some(s)) if location.layout().contains(b, s) => Ok(()),
        _ => Err(AppError::Validation(format!(
            "{} is not a seat of {}",
            key.seat_id(),
            location
        ))),
    }
}
