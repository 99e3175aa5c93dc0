// src/export/model.rs

use crate::core::reconciler::MergedView;
use serde::Serialize;

/// Struttura “piatta” per export dei posti occupati.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SeatExport {
    pub date: String,
    pub seat_id: String,
    pub location: String,
    pub bay: String,
    pub seat: String,
    pub occupant: String,
    pub department: String,
    pub origin: String,
    pub created_at: String,
}

/// One row per occupied seat, in seat order.
pub(crate) fn rows_from_view(view: &MergedView) -> Vec<SeatExport> {
    view.iter()
        .map(|(key, entry)| SeatExport {
            date: key.date().to_string(),
            seat_id: key.seat_id(),
            location: key.location().to_string(),
            bay: key.bay().to_string(),
            seat: key.seat().to_string(),
            occupant: entry.reservation.occupant.clone(),
            department: entry.reservation.department.clone(),
            origin: entry.origin.as_str().to_string(),
            created_at: entry.reservation.created_at.clone().unwrap_or_default(),
        })
        .collect()
}
