use super::location::normalize_location;
use super::seat_key::SeatKey;
use crate::core::normalize::{normalize_date, normalize_field, normalize_number};
use serde::Serialize;

/// One booking as known to the client.
///
/// Identity fields hold their normalized text so records produced by the
/// sheet and by this client compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub date: String,               // ⇔ data (YYYY-MM-DD once normalized)
    pub location: String,           // ⇔ local (Aquario | Salao | Gouvea)
    pub bay: String,                // ⇔ baia
    pub seat: String,               // ⇔ assento
    pub occupant: String,           // ⇔ nome
    pub department: String,         // ⇔ setor
    pub created_at: Option<String>, // ⇔ timestamp (ISO8601 when present)
}

impl Reservation {
    /// Build a reservation from raw field values, normalizing identity fields.
    pub fn new(
        date: &str,
        location: &str,
        bay: &str,
        seat: &str,
        occupant: &str,
        department: &str,
    ) -> Self {
        Self {
            date: normalize_date(date),
            location: normalize_location(location),
            bay: normalize_number(bay),
            seat: normalize_number(seat),
            occupant: normalize_field(occupant),
            department: normalize_field(department),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn key(&self) -> SeatKey {
        SeatKey::new(&self.date, &self.location, &self.bay, &self.seat)
    }

    pub fn seat_id(&self) -> String {
        self.key().seat_id()
    }

    /// Short description for messages: `Name (Department)`.
    pub fn holder(&self) -> String {
        if self.department.is_empty() {
            self.occupant.clone()
        } else {
            format!("{} ({})", self.occupant, self.department)
        }
    }
}
