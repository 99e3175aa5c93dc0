#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDate;
use seatsync::core::engine::ReservationEngine;
use seatsync::core::sync::{SyncService, SyncSettings};
use seatsync::db::pending::PendingStore;
use seatsync::models::booking::BookingRequest;
use seatsync::models::location::Location;
use seatsync::models::reservation::Reservation;
use seatsync::remote::{InMemoryBackend, ReservationBackend};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub fn seatsync() -> Command {
    cargo_bin_cmd!("seatsync")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_seatsync.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_seatsync_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn reservation(date: &str, location: &str, bay: u32, seat: u32, name: &str) -> Reservation {
    Reservation::new(
        date,
        location,
        &bay.to_string(),
        &seat.to_string(),
        name,
        "CEP",
    )
}

pub fn request(date: &str, location: Location, bay: u32, seat: u32, name: &str) -> BookingRequest {
    let department = location.default_departments()[0].to_string();
    BookingRequest {
        date: day(date),
        location,
        bay,
        seat,
        occupant: name.to_string(),
        department,
    }
}

/// A client with an in-memory pending store talking to `backend`.
pub fn client(backend: &Arc<InMemoryBackend>) -> SyncService {
    let store = PendingStore::in_memory().expect("in-memory store");
    let shared: Arc<dyn ReservationBackend> = backend.clone();
    SyncService::new(ReservationEngine::new(store), shared, SyncSettings::default())
}

/// A client whose pending store lives in `db_path`.
pub fn client_on_disk(backend: &Arc<InMemoryBackend>, db_path: &str) -> SyncService {
    let store = PendingStore::open(db_path).expect("open store");
    let shared: Arc<dyn ReservationBackend> = backend.clone();
    SyncService::new(ReservationEngine::new(store), shared, SyncSettings::default())
}
