//! Merges the remote snapshot with the local pending records into one view.
//!
//! Pure function of its two inputs. The snapshot always wins: a pending
//! record only shows up for keys the snapshot does not already hold.

use crate::core::normalize::normalize_date;
use crate::models::pending::{PendingRecord, PendingStatus};
use crate::models::reservation::Reservation;
use crate::models::seat_key::SeatKey;
use crate::models::snapshot::Snapshot;
use std::collections::BTreeMap;

/// Where a view entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Pending(PendingStatus),
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Remote => "remote",
            Origin::Pending(PendingStatus::Unconfirmed) => "unconfirmed",
            Origin::Pending(PendingStatus::Acknowledged) => "acknowledged",
            Origin::Pending(PendingStatus::Conflicted) => "conflicted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub reservation: Reservation,
    pub origin: Origin,
}

/// Seat occupancy for one day. At most one entry per key.
#[derive(Debug, Clone, Default)]
pub struct MergedView {
    date: String,
    entries: BTreeMap<SeatKey, ViewEntry>,
}

impl MergedView {
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn get(&self, key: &SeatKey) -> Option<&ViewEntry> {
        self.entries.get(key)
    }

    pub fn occupant(&self, key: &SeatKey) -> Option<&Reservation> {
        self.entries.get(key).map(|e| &e.reservation)
    }

    pub fn is_occupied(&self, key: &SeatKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeatKey, &ViewEntry)> {
        self.entries.iter()
    }

    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.entries.values().map(|e| &e.reservation)
    }
}

/// Build the merged view of `date`.
pub fn merge(date: &str, snapshot: Option<&Snapshot>, pending: &[PendingRecord]) -> MergedView {
    let date = normalize_date(date);
    let mut entries = BTreeMap::new();

    // 1. remote rows, first row per key wins (backend arrival order)
    if let Some(snapshot) = snapshot {
        for r in snapshot.for_date(&date) {
            let key = r.key();
            if key.is_incomplete() {
                continue;
            }
            entries.entry(key).or_insert_with(|| ViewEntry {
                reservation: r.clone(),
                origin: Origin::Remote,
            });
        }
    }

    // 2. local optimism, only where the snapshot is silent
    for p in pending.iter().filter(|p| p.reservation.date == date) {
        entries.entry(p.key()).or_insert_with(|| ViewEntry {
            reservation: p.reservation.clone(),
            origin: Origin::Pending(p.status),
        });
    }

    MergedView { date, entries }
}
