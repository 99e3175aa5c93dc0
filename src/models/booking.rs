use super::location::Location;
use super::pending::PendingRecord;
use super::reservation::Reservation;
use super::seat_key::SeatKey;
use chrono::NaiveDate;
use serde::Serialize;

/// What the user asked to book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub location: Location,
    pub bay: u32,
    pub seat: u32,
    pub occupant: String,
    pub department: String,
}

impl BookingRequest {
    pub fn key(&self) -> SeatKey {
        SeatKey::new(
            &self.date.format("%Y-%m-%d").to_string(),
            self.location.code(),
            &self.bay,
            &self.seat,
        )
    }

    pub fn to_reservation(&self) -> Reservation {
        Reservation::new(
            &self.date.format("%Y-%m-%d").to_string(),
            self.location.code(),
            &self.bay.to_string(),
            &self.seat.to_string(),
            &self.occupant,
            &self.department,
        )
        .with_created_at(chrono::Local::now().to_rfc3339())
    }
}

/// Per-attempt state: `Idle -> Submitting -> {Confirmed, Rejected, ConnectionFailed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingState {
    Idle,
    Submitting,
    Confirmed,
    Rejected,
    ConnectionFailed,
}

/// How a submission ended.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    /// The backend stored the booking.
    Confirmed(Reservation),
    /// Someone else holds the seat. `winner` comes from the refreshed view.
    Rejected {
        key: SeatKey,
        winner: Option<Reservation>,
        message: String,
    },
    /// No answer from the backend; kept locally and retried later.
    ConnectionFailed(PendingRecord),
    /// Any other backend error; nothing kept.
    Failed { key: SeatKey, message: String },
}

impl BookingOutcome {
    pub fn state(&self) -> BookingState {
        match self {
            BookingOutcome::Confirmed(_) => BookingState::Confirmed,
            BookingOutcome::Rejected { .. } => BookingState::Rejected,
            BookingOutcome::ConnectionFailed(_) => BookingState::ConnectionFailed,
            // generic failures drop the attempt back to the user
            BookingOutcome::Failed { .. } => BookingState::Idle,
        }
    }
}
