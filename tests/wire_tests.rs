use seatsync::errors::AppError;
use seatsync::models::location::Location;
use seatsync::models::seat_key::SeatKey;
use seatsync::remote::wire::{ReadPayload, WriteResponse, decode_read, decode_write};

#[test]
fn test_bare_list_with_drifted_cells() {
    let body = r#"[
        {"data": "02/03/2026", "nome": "Ana", "setor": "CEP", "local": "Salao", "baia": 1.0, "assento": "03", "timestamp": "2026-03-01T10:00:00Z"},
        {"data": "2026-03-02", "nome": "Bruno", "setor": "CEP", "local": "Salao", "baia": "2", "assento": 4}
    ]"#;

    let payload = decode_read(body).expect("decode");
    assert!(matches!(payload, ReadPayload::Bare(_)));

    let snapshot = payload.into_snapshot(7);
    assert_eq!(snapshot.seq, 7);
    assert_eq!(snapshot.reservations().len(), 2);
    assert!(snapshot.rules().is_empty());

    let ana = snapshot
        .find(&SeatKey::new("2026-03-02", "Salao", "1", "3"))
        .expect("ana present");
    assert_eq!(ana.occupant, "Ana");
    assert_eq!(ana.created_at.as_deref(), Some("2026-03-01T10:00:00Z"));
    assert!(snapshot.contains(&SeatKey::new("2026-03-02", "Salao", "2", "4")));
}

#[test]
fn test_envelope_carries_department_rules() {
    let body = r#"{
        "reservations": [
            {"data": "2026-03-02", "nome": "Ana", "setor": "TI", "local": "Gouvea", "baia": 1, "assento": 1}
        ],
        "config": [
            {"local": "Gouvea", "setores": ["TI", "Projetos"]},
            {"local": "Gouvea", "setor": "Qualidade"},
            {"setor": "orphan"},
            "garbage"
        ]
    }"#;

    let snapshot = decode_read(body).expect("decode").into_snapshot(1);
    assert_eq!(snapshot.reservations().len(), 1);
    assert_eq!(snapshot.rules().len(), 1);
    assert_eq!(
        snapshot.departments_for(Location::Gouvea),
        Some(&["TI".to_string(), "Projetos".to_string(), "Qualidade".to_string()][..])
    );
    assert_eq!(snapshot.departments_for(Location::Salao), None);
}

#[test]
fn test_rows_without_identity_are_skipped() {
    let body = r#"[
        {"data": "2026-03-02", "nome": "Ana", "local": "Salao", "baia": 1},
        {"data": "2026-03-02", "nome": "Bruno", "local": "Salao", "baia": 1, "assento": 2}
    ]"#;

    let snapshot = decode_read(body).expect("decode").into_snapshot(1);
    assert_eq!(snapshot.reservations().len(), 1);
    assert_eq!(snapshot.reservations()[0].occupant, "Bruno");
}

#[test]
fn test_unexpected_body_is_a_parse_error() {
    let err = decode_read("<html>Service unavailable</html>").expect_err("html is not a list");
    assert!(matches!(err, AppError::Parse(_)));
    assert!(err.is_transient());

    assert!(matches!(decode_write("ok"), Err(AppError::Parse(_))));
}

#[test]
fn test_write_replies() {
    let ok = decode_write(r#"{"success": true}"#).expect("decode");
    assert_eq!(ok, WriteResponse::ok());

    let dup = decode_write(
        r#"{"success": false, "error": "DUPLICATE", "message": "Seat Salao-1-3 is already booked"}"#,
    )
    .expect("decode");
    assert!(dup.is_duplicate());
    assert_eq!(dup.reason(), "Seat Salao-1-3 is already booked");

    let other = decode_write(r#"{"success": false, "error": "QUOTA"}"#).expect("decode");
    assert!(!other.is_duplicate());
    assert_eq!(other.reason(), "QUOTA");
}
