use seatsync::core::normalize::{normalize_date, normalize_field, normalize_number, same_person};
use seatsync::models::seat_key::SeatKey;
use serde_json::json;

#[test]
fn test_slash_date_becomes_iso() {
    assert_eq!(normalize_date("10/02/2026"), "2026-02-10");
    assert_eq!(normalize_date("1/2/2026"), "2026-02-01");
}

#[test]
fn test_iso_date_is_unchanged_and_idempotent() {
    assert_eq!(normalize_date("2026-02-10"), "2026-02-10");
    assert_eq!(normalize_date(&normalize_date("10/02/2026")), "2026-02-10");
    assert_eq!(normalize_date("  2026-02-10 "), "2026-02-10");
}

#[test]
fn test_unrecognized_date_passes_through() {
    assert_eq!(normalize_date("next monday"), "next monday");
    assert_eq!(normalize_date("2026/02/10"), "2026/02/10");
    assert_eq!(normalize_date(""), "");
}

#[test]
fn test_numeric_and_textual_fields_compare_equal() {
    assert_eq!(normalize_field(&6u32), normalize_field(" 6 "));
    assert_eq!(normalize_field(&json!(6)), "6");
    assert_eq!(normalize_field(&json!(6.0)), "6");
    assert_eq!(normalize_field(&json!(" 6")), "6");
    assert_eq!(normalize_field(&json!(null)), "");
    assert_eq!(normalize_field(&json!(2.5)), "2.5");
}

#[test]
fn test_numbers_lose_leading_zeros() {
    assert_eq!(normalize_number("06"), "6");
    assert_eq!(normalize_number("000"), "0");
    assert_eq!(normalize_number("A6"), "A6");
}

#[test]
fn test_seat_key_tolerates_format_drift() {
    let from_sheet = SeatKey::new("02/03/2026", " Salao ", &json!(1.0), &json!("03"));
    let from_client = SeatKey::new("2026-03-02", "Salao", &1u32, &3u32);

    assert_eq!(from_sheet, from_client);
    assert_eq!(from_client.seat_id(), "Salao-1-3");
    assert_eq!(from_client.to_string(), "Salao-1-3@2026-03-02");
}

#[test]
fn test_seat_key_differs_by_date() {
    let a = SeatKey::new("2026-03-02", "Salao", "1", "3");
    let b = SeatKey::new("2026-03-03", "Salao", "1", "3");
    assert_ne!(a, b);
}

#[test]
fn test_same_person_is_loose() {
    assert!(same_person("Ana  Souza", " ana souza"));
    assert!(!same_person("Ana Souza", "Bruno Lima"));
}

#[test]
fn test_location_spellings_share_one_key() {
    let canonical = SeatKey::new("2026-03-02", "Salao", "1", "3");

    for spelling in ["Salão", "SALAO", " salão ", "salao"] {
        assert_eq!(SeatKey::new("2026-03-02", spelling, "1", "3"), canonical);
    }
    assert_eq!(SeatKey::new("2026-03-02", "GOUVÊA", "1", "1").location(), "Gouvea");
    assert_eq!(SeatKey::new("2026-03-02", " Cantina ", "1", "1").location(), "Cantina");
}
