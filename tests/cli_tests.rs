mod common;
use common::{reservation, seatsync, setup_test_db, temp_out};
use predicates::str::contains;
use seatsync::db::pending::PendingStore;
use seatsync::models::pending::{PendingRecord, PendingStatus};
use std::fs;

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("init_creates_database");

    seatsync()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(fs::metadata(&db_path).is_ok());
}

#[test]
fn test_pending_on_fresh_store() {
    let db_path = setup_test_db("pending_on_fresh_store");

    seatsync()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    seatsync()
        .args(["--db", &db_path, "--test", "pending"])
        .assert()
        .success()
        .stdout(contains("No pending bookings."));
}

#[test]
fn test_book_seat_in_test_mode() {
    let db_path = setup_test_db("book_seat_in_test_mode");

    seatsync()
        .args([
            "--db", &db_path, "--test", "book", "--date", "02/03/2026", "-l", "salão", "-b",
            "1", "-s", "3", "-n", "Ana Souza", "-d", "CEP",
        ])
        .assert()
        .success()
        .stdout(contains("Seat Salao-1-3 booked for Ana Souza (CEP) on 2026-03-02"));

    // the confirmation fetch already matched the row
    seatsync()
        .args(["--db", &db_path, "--test", "pending"])
        .assert()
        .success()
        .stdout(contains("No pending bookings."));

    seatsync()
        .args(["--db", &db_path, "--test", "log", "--print"])
        .assert()
        .success()
        .stdout(contains("confirm"));
}

#[test]
fn test_book_rejects_wrong_department() {
    let db_path = setup_test_db("book_rejects_wrong_department");

    seatsync()
        .args([
            "--db", &db_path, "--test", "book", "--date", "2026-03-02", "-l", "Aquario", "-b",
            "1", "-s", "1", "-n", "Ana", "-d", "TI",
        ])
        .assert()
        .failure()
        .stderr(contains("Validation failed"));
}

#[test]
fn test_book_rejects_unknown_location() {
    let db_path = setup_test_db("book_rejects_unknown_location");

    seatsync()
        .args([
            "--db", &db_path, "--test", "book", "--date", "2026-03-02", "-l", "Cantina", "-b",
            "1", "-s", "1", "-n", "Ana", "-d", "CEP",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid location"));
}

#[test]
fn test_show_prints_seat_map() {
    let db_path = setup_test_db("show_prints_seat_map");

    seatsync()
        .args(["--db", &db_path, "--test", "show", "2026-03-02"])
        .assert()
        .success()
        .stdout(contains("Aquario"))
        .stdout(contains("Gouvea"));
}

#[test]
fn test_export_json_of_empty_day() {
    let db_path = setup_test_db("export_json_of_empty_day");
    let out = temp_out("export_json_of_empty_day", "json");

    seatsync()
        .args([
            "--db", &db_path, "--test", "export", "--format", "json", "--file", &out, "--date",
            "2026-03-02",
        ])
        .assert()
        .success()
        .stdout(contains("JSON export completed"));

    let content = fs::read_to_string(&out).expect("export file");
    let rows: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(rows, serde_json::json!([]));
}

#[test]
fn test_export_csv_force_overwrites() {
    let db_path = setup_test_db("export_csv_force_overwrites");
    let out = temp_out("export_csv_force_overwrites", "csv");
    fs::write(&out, "old content").expect("seed file");

    seatsync()
        .args([
            "--db", &db_path, "--test", "export", "--format", "csv", "--file", &out, "--force",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("export file");
    assert!(!content.contains("old content"));
}

#[test]
fn test_next_command_resends_unconfirmed_booking() {
    let db_path = setup_test_db("next_command_resends_unconfirmed");

    {
        let mut store = PendingStore::open(&db_path).expect("open store");
        let mut record = PendingRecord::new(
            reservation("2026-03-02", "Salao", 2, 7, "Ana"),
            PendingStatus::Unconfirmed,
        );
        record.last_error = Some("Backend unreachable: timeout".into());
        store.add(&record).expect("add");
    }

    seatsync()
        .args(["--db", &db_path, "--test", "pending"])
        .assert()
        .success()
        .stdout(contains("unconfirmed"));

    seatsync()
        .args(["--db", &db_path, "--test", "show", "2026-03-02"])
        .assert()
        .success()
        .stdout(contains("Salao-2-7 Ana (CEP)"));

    seatsync()
        .args(["--db", &db_path, "--test", "pending"])
        .assert()
        .success()
        .stdout(contains("No pending bookings."));
}
