use super::reservation::Reservation;
use super::seat_key::SeatKey;
use serde::Serialize;
use std::fmt;

/// Where a locally submitted booking stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingStatus {
    /// The write never got an answer; it is retried after the next good fetch.
    Unconfirmed,
    /// The backend accepted the write; waiting for a snapshot to show it.
    Acknowledged,
    /// A retry was answered with DUPLICATE; the next snapshot decides who won.
    Conflicted,
}

impl PendingStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PendingStatus::Unconfirmed => "unconfirmed",
            PendingStatus::Acknowledged => "acknowledged",
            PendingStatus::Conflicted => "conflicted",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "unconfirmed" => Some(PendingStatus::Unconfirmed),
            "acknowledged" => Some(PendingStatus::Acknowledged),
            "conflicted" => Some(PendingStatus::Conflicted),
            _ => None,
        }
    }
}

impl fmt::Display for PendingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// A reservation this client submitted that no snapshot has shown yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRecord {
    pub reservation: Reservation,
    pub status: PendingStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl PendingRecord {
    pub fn new(reservation: Reservation, status: PendingStatus) -> Self {
        Self {
            reservation,
            status,
            attempts: 1,
            last_error: None,
        }
    }

    pub fn key(&self) -> SeatKey {
        self.reservation.key()
    }

    pub fn is_unconfirmed(&self) -> bool {
        self.status == PendingStatus::Unconfirmed
    }
}
