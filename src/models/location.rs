use crate::core::normalize::{FieldText, normalize_field};
use serde::Serialize;
use std::fmt;

/// Physical seat layout of one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatLayout {
    pub bays: u32,
    pub seats_per_row: u32,
    pub rows: u32,
}

impl SeatLayout {
    /// Seats in a single bay, numbered 1..=seats_per_bay().
    pub fn seats_per_bay(&self) -> u32 {
        self.seats_per_row * self.rows
    }

    pub fn contains(&self, bay: u32, seat: u32) -> bool {
        (1..=self.bays).contains(&bay) && (1..=self.seats_per_bay()).contains(&seat)
    }

    /// Seat numbers of the given row (1-based), as drawn on the floor plan.
    pub fn row_seats(&self, row: u32) -> std::ops::RangeInclusive<u32> {
        let start = (row - 1) * self.seats_per_row + 1;
        start..=row * self.seats_per_row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Location {
    Aquario,
    Salao,
    Gouvea,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Aquario, Location::Salao, Location::Gouvea];

    /// Name as stored in the backend sheet.
    pub fn code(&self) -> &'static str {
        match self {
            Location::Aquario => "Aquario",
            Location::Salao => "Salao",
            Location::Gouvea => "Gouvea",
        }
    }

    /// Helper: convert user or backend input (any case, accents allowed)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "aquario" | "aquário" => Some(Location::Aquario),
            "salao" | "salão" => Some(Location::Salao),
            "gouvea" | "gouvêa" | "gouvéa" => Some(Location::Gouvea),
            _ => None,
        }
    }

    pub fn layout(&self) -> SeatLayout {
        match self {
            Location::Aquario => SeatLayout {
                bays: 4,
                seats_per_row: 6,
                rows: 2,
            },
            Location::Salao => SeatLayout {
                bays: 3,
                seats_per_row: 6,
                rows: 2,
            },
            Location::Gouvea => SeatLayout {
                bays: 2,
                seats_per_row: 6,
                rows: 2,
            },
        }
    }

    /// Departments allowed to book here when the backend sends no rules.
    pub fn default_departments(&self) -> &'static [&'static str] {
        match self {
            Location::Aquario => &["PTS", "Centurion", "BTG"],
            Location::Salao => &["CEP", "Lazer", "Eventos", "Supplier", "ICs"],
            Location::Gouvea => &[
                "Financeiro",
                "C&P",
                "MKT & Com",
                "TI",
                "Projetos",
                "Qualidade",
            ],
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical spelling of a location cell (`Salão`, `SALAO` and `salao` all
/// become `Salao`). Unknown names are only trimmed.
pub fn normalize_location<T: FieldText + ?Sized>(raw: &T) -> String {
    let text = normalize_field(raw);
    match Location::from_code(&text) {
        Some(location) => location.code().to_string(),
        None => text,
    }
}
