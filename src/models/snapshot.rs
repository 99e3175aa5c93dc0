use super::location::Location;
use super::reservation::Reservation;
use super::seat_key::SeatKey;
use crate::core::normalize::normalize_date;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Departments allowed at one location, as published by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRule {
    pub location: String,
    pub departments: Vec<String>,
}

/// The reservation list as last fetched from the backend.
///
/// Replaced wholesale on every successful fetch. `seq` is the sequence number
/// handed out when the request was issued, so a late answer to an older
/// request can be recognized and dropped.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub seq: u64,
    pub fetched_at: DateTime<Local>,
    reservations: Vec<Reservation>,
    rules: Vec<DepartmentRule>,
    // first row per key; later rows with the same key are shadowed
    index: HashMap<SeatKey, usize>,
    shadowed: usize,
}

impl Snapshot {
    pub fn new(seq: u64, reservations: Vec<Reservation>, rules: Vec<DepartmentRule>) -> Self {
        let mut index = HashMap::with_capacity(reservations.len());
        let mut shadowed = 0;
        for (i, r) in reservations.iter().enumerate() {
            match index.entry(r.key()) {
                Entry::Occupied(_) => shadowed += 1,
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
        }

        Self {
            seq,
            fetched_at: Local::now(),
            reservations,
            rules,
            index,
            shadowed,
        }
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn rules(&self) -> &[DepartmentRule] {
        &self.rules
    }

    /// Rows that repeat an identity key already claimed earlier in the sheet.
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }

    /// The winning row for `key` (first in backend order).
    pub fn find(&self, key: &SeatKey) -> Option<&Reservation> {
        self.index.get(key).map(|&i| &self.reservations[i])
    }

    pub fn contains(&self, key: &SeatKey) -> bool {
        self.index.contains_key(key)
    }

    /// Rows for one day, in backend order.
    pub fn for_date<'a>(&'a self, date: &str) -> impl Iterator<Item = &'a Reservation> + 'a {
        let date = normalize_date(date);
        self.reservations.iter().filter(move |r| r.date == date)
    }

    /// Departments published for `location`, if the backend sent any.
    pub fn departments_for(&self, location: Location) -> Option<&[String]> {
        self.rules
            .iter()
            .find(|rule| Location::from_code(&rule.location) == Some(location))
            .map(|rule| rule.departments.as_slice())
    }
}
