use crate::core::engine::Resolution;
use crate::core::sync::SyncEvent;
use crate::models::booking::BookingOutcome;
use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", RED, BOLD, ICON_ERR, RESET, msg);
}

/// Tell the user how their booking ended.
pub fn announce_outcome(outcome: &BookingOutcome) {
    match outcome {
        BookingOutcome::Confirmed(r) => success(format!(
            "Seat {} booked for {} on {}",
            r.seat_id(),
            r.holder(),
            r.date
        )),
        BookingOutcome::Rejected {
            key,
            winner: Some(w),
            ..
        } => error(format!(
            "Seat {} is already taken by {}",
            key.seat_id(),
            w.holder()
        )),
        BookingOutcome::Rejected { key, message, .. } => {
            error(format!("Seat {} is already taken: {message}", key.seat_id()))
        }
        BookingOutcome::ConnectionFailed(p) => warning(format!(
            "No answer from the server. Booking of {} kept locally and retried automatically.",
            p.reservation.seat_id()
        )),
        BookingOutcome::Failed { key, message } => {
            error(format!("Booking of {} failed: {message}", key.seat_id()))
        }
    }
}

/// One line per event worth showing while watching; routine ones stay silent.
pub fn announce_event(event: &SyncEvent) {
    match event {
        SyncEvent::Resolved(Resolution::Confirmed(r)) => success(format!(
            "{} on {} is now visible to everyone",
            r.seat_id(),
            r.date
        )),
        SyncEvent::Resolved(Resolution::Lost { mine, winner }) => error(format!(
            "Your booking of {} on {} was lost: the seat went to {}",
            mine.seat_id(),
            mine.date,
            winner.holder()
        )),
        SyncEvent::SelectionLost { key, winner } => warning(format!(
            "Seat {} was taken by {}",
            key.seat_id(),
            winner.holder()
        )),
        SyncEvent::RetryAcknowledged(key) => success(format!("Retried booking of {key} accepted")),
        SyncEvent::RetryConflicted { key, message } => {
            warning(format!("Retried booking of {key} conflicts: {message}"))
        }
        SyncEvent::Booking(outcome) => announce_outcome(outcome),
        SyncEvent::SnapshotApplied { .. } | SyncEvent::FetchFailed { .. } => {}
    }
}
