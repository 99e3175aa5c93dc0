//! Identity of a booking: (date, location, bay, seat) in canonical text form.

use super::location::normalize_location;
use crate::core::normalize::{FieldText, normalize_date, normalize_number};
use serde::Serialize;
use std::fmt;

/// Canonical identity tuple. Two records describe the same seat-day iff
/// their keys are equal, whatever shape the raw fields had.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SeatKey {
    date: String,
    location: String,
    bay: String,
    seat: String,
}

impl SeatKey {
    pub fn new<D, L, B, S>(date: &D, location: &L, bay: &B, seat: &S) -> Self
    where
        D: FieldText + ?Sized,
        L: FieldText + ?Sized,
        B: FieldText + ?Sized,
        S: FieldText + ?Sized,
    {
        Self {
            date: normalize_date(date),
            location: normalize_location(location),
            bay: normalize_number(bay),
            seat: normalize_number(seat),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn bay(&self) -> &str {
        &self.bay
    }

    pub fn seat(&self) -> &str {
        &self.seat
    }

    /// Date-less seat id as drawn on the floor plan, e.g. `Salao-1-3`.
    pub fn seat_id(&self) -> String {
        format!("{}-{}-{}", self.location, self.bay, self.seat)
    }

    /// True when one of the identity components is empty.
    pub fn is_incomplete(&self) -> bool {
        self.date.is_empty() || self.location.is_empty() || self.bay.is_empty() || self.seat.is_empty()
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.seat_id(), self.date)
    }
}
