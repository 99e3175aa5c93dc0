mod common;
use async_trait::async_trait;
use common::{client, client_on_disk, request, reservation, setup_test_db};
use seatsync::core::engine::{ApplyOutcome, ReservationEngine, Resolution, SeatStatus};
use seatsync::core::reconciler::Origin;
use seatsync::core::sync::{RetryReport, SyncEvent, SyncService, SyncSettings};
use seatsync::db::pending::PendingStore;
use seatsync::errors::{AppError, AppResult};
use seatsync::models::booking::{BookingOutcome, BookingState};
use seatsync::models::location::Location;
use seatsync::models::pending::PendingStatus;
use seatsync::models::seat_key::SeatKey;
use seatsync::remote::wire::{BookingForm, ReadPayload, WireRecord, WriteResponse};
use seatsync::remote::{InMemoryBackend, ReservationBackend};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const DAY: &str = "2026-03-02";

fn salao(bay: u32, seat: u32) -> SeatKey {
    SeatKey::new(DAY, "Salao", &bay, &seat)
}

/// Backend whose writes are each followed by a fetch of `client`, the way the
/// poll loop can land a snapshot while a retry is still in flight.
struct FetchAfterWrite {
    sheet: Arc<InMemoryBackend>,
    client: OnceLock<SyncService>,
}

#[async_trait]
impl ReservationBackend for FetchAfterWrite {
    async fn fetch(&self) -> AppResult<ReadPayload> {
        self.sheet.fetch().await
    }

    async fn submit(&self, form: &BookingForm) -> AppResult<WriteResponse> {
        let reply = self.sheet.submit(form).await;
        if let Some(client) = self.client.get() {
            let _ = client.fetch_once().await;
        }
        reply
    }
}

fn drain(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[tokio::test]
async fn test_confirmed_booking_shows_up_as_remote() {
    let backend = Arc::new(InMemoryBackend::new());
    let svc = client(&backend);
    svc.fetch_once().await.expect("fetch");

    let outcome = svc
        .submit(request(DAY, Location::Salao, 1, 3, "Ana"))
        .await
        .expect("submit");

    assert!(matches!(&outcome, BookingOutcome::Confirmed(r) if r.seat_id() == "Salao-1-3"));
    assert_eq!(outcome.state(), BookingState::Confirmed);
    assert_eq!(backend.writes(), 1);

    // the refresh after the write already carried the row
    assert!(svc.pending().expect("pending").is_empty());
    let view = svc.view(DAY).expect("view");
    assert_eq!(view.get(&salao(1, 3)).map(|e| e.origin), Some(Origin::Remote));
}

#[tokio::test]
async fn test_two_clients_race_for_one_seat() {
    let backend = Arc::new(InMemoryBackend::new());
    let a = client(&backend);
    let b = client(&backend);

    // both see the seat free
    a.fetch_once().await.expect("fetch a");
    b.fetch_once().await.expect("fetch b");

    let first = a
        .submit(request(DAY, Location::Salao, 1, 3, "Ana"))
        .await
        .expect("submit a");
    let second = b
        .submit(request(DAY, Location::Salao, 1, 3, "Bruno"))
        .await
        .expect("submit b");

    assert!(matches!(first, BookingOutcome::Confirmed(_)));
    match second {
        BookingOutcome::Rejected {
            key,
            winner,
            message,
        } => {
            assert_eq!(key, salao(1, 3));
            assert_eq!(winner.map(|w| w.occupant), Some("Ana".to_string()));
            assert!(message.contains("Ana"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // B never keeps its losing attempt and sees A in the seat
    assert!(b.pending().expect("pending").is_empty());
    assert!(matches!(
        b.seat_status(&salao(1, 3)).expect("status"),
        SeatStatus::Occupied(r) if r.occupant == "Ana"
    ));
    assert_eq!(backend.rows().expect("rows").len(), 1);
}

#[tokio::test]
async fn test_known_taken_seat_is_rejected_without_write() {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .seed(&reservation(DAY, "Salao", 1, 3, "Ana"))
        .expect("seed");

    let svc = client(&backend);
    svc.fetch_once().await.expect("fetch");

    let outcome = svc
        .submit(request(DAY, Location::Salao, 1, 3, "Bruno"))
        .await
        .expect("submit");

    assert!(matches!(
        outcome,
        BookingOutcome::Rejected { winner: Some(ref w), .. } if w.occupant == "Ana"
    ));
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_backend() {
    let backend = Arc::new(InMemoryBackend::new());
    let svc = client(&backend);

    let mut req = request(DAY, Location::Salao, 1, 3, "Ana");
    req.department = "Nowhere".into();

    assert!(matches!(
        svc.submit(req).await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn test_offline_booking_is_kept_and_retried() {
    let backend = Arc::new(InMemoryBackend::new());
    let svc = client(&backend);

    backend.set_offline(true);
    let outcome = svc
        .submit(request(DAY, Location::Salao, 2, 5, "Ana"))
        .await
        .expect("submit");

    let BookingOutcome::ConnectionFailed(record) = outcome else {
        panic!("expected connection failure");
    };
    assert_eq!(record.status, PendingStatus::Unconfirmed);
    assert!(matches!(
        svc.seat_status(&salao(2, 5)).expect("status"),
        SeatStatus::Pending(_, PendingStatus::Unconfirmed)
    ));

    // a failed fetch changes nothing
    assert!(svc.fetch_once().await.is_err());
    assert_eq!(svc.pending().expect("pending").len(), 1);

    backend.set_offline(false);
    svc.fetch_once().await.expect("fetch");
    assert_eq!(svc.pending().expect("pending").len(), 1);

    let report = svc.retry_pending().await.expect("retry");
    assert_eq!(report.acknowledged, 1);
    assert_eq!(report.still_pending, 0);

    // the retry refetched and found the row
    assert!(svc.pending().expect("pending").is_empty());
    assert_eq!(backend.rows().expect("rows").len(), 1);
}

#[tokio::test]
async fn test_lost_reply_is_resolved_by_next_fetch() {
    let backend = Arc::new(InMemoryBackend::new());
    let svc = client(&backend);

    backend.lose_next_reply();
    let outcome = svc
        .submit(request(DAY, Location::Salao, 1, 3, "Ana"))
        .await
        .expect("submit");
    assert_eq!(outcome.state(), BookingState::ConnectionFailed);
    assert_eq!(svc.pending().expect("pending").len(), 1);

    let ApplyOutcome::Applied { resolved, .. } = svc.fetch_once().await.expect("fetch") else {
        panic!("fresh snapshot should apply");
    };
    assert!(matches!(&resolved[..], [Resolution::Confirmed(r)] if r.occupant == "Ana"));
    assert!(svc.pending().expect("pending").is_empty());

    // nothing left to retry, so no duplicate write
    assert_eq!(svc.retry_pending().await.expect("retry"), RetryReport::default());
    assert_eq!(backend.writes(), 1);
}

#[tokio::test]
async fn test_retry_that_lost_the_race_is_reported() {
    let backend = Arc::new(InMemoryBackend::new());
    let a = client(&backend);
    let b = client(&backend);

    backend.set_offline(true);
    let outcome = a
        .submit(request(DAY, Location::Salao, 1, 3, "Ana"))
        .await
        .expect("submit a");
    assert!(matches!(outcome, BookingOutcome::ConnectionFailed(_)));
    backend.set_offline(false);

    b.fetch_once().await.expect("fetch b");
    let won = b
        .submit(request(DAY, Location::Salao, 1, 3, "Bruno"))
        .await
        .expect("submit b");
    assert!(matches!(won, BookingOutcome::Confirmed(_)));

    let mut events = a.subscribe();
    let report = a.retry_pending().await.expect("retry");
    assert_eq!(report.conflicted, 1);

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, SyncEvent::RetryConflicted { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::Resolved(Resolution::Lost { winner, .. }) if winner.occupant == "Bruno"
    )));
    assert!(a.pending().expect("pending").is_empty());
}

#[tokio::test]
async fn test_fetch_failure_keeps_last_good_view() {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .seed(&reservation(DAY, "Salao", 1, 3, "Ana"))
        .expect("seed");

    let svc = client(&backend);
    svc.fetch_once().await.expect("fetch");

    backend.set_offline(true);
    let mut events = svc.subscribe();
    let err = svc.fetch_once().await.expect_err("offline");
    assert!(err.is_transient());

    assert!(svc.view(DAY).expect("view").is_occupied(&salao(1, 3)));
    assert!(
        drain(&mut events)
            .iter()
            .any(|e| matches!(e, SyncEvent::FetchFailed { .. }))
    );
}

#[tokio::test]
async fn test_pending_booking_survives_client_restart() {
    let db_path = setup_test_db("pending_booking_restart");
    let backend = Arc::new(InMemoryBackend::new());

    {
        let svc = client_on_disk(&backend, &db_path);
        backend.set_offline(true);
        let outcome = svc
            .submit(request(DAY, Location::Gouvea, 1, 1, "Ana"))
            .await
            .expect("submit");
        assert!(matches!(outcome, BookingOutcome::ConnectionFailed(_)));
    }

    backend.set_offline(false);
    let svc = client_on_disk(&backend, &db_path);
    assert_eq!(svc.pending().expect("pending").len(), 1);

    svc.fetch_once().await.expect("fetch");
    svc.retry_pending().await.expect("retry");
    assert!(svc.pending().expect("pending").is_empty());
}

#[tokio::test]
async fn test_background_loops_pick_up_changes_and_retry() {
    let backend = Arc::new(InMemoryBackend::new());
    let shared: Arc<dyn ReservationBackend> = backend.clone();
    let svc = SyncService::new(
        ReservationEngine::new(PendingStore::in_memory().expect("store")),
        shared,
        SyncSettings {
            poll_interval: Duration::from_millis(20),
        },
    );

    backend.set_offline(true);
    let outcome = svc
        .submit(request(DAY, Location::Aquario, 1, 1, "Ana"))
        .await
        .expect("submit");
    assert!(matches!(outcome, BookingOutcome::ConnectionFailed(_)));
    backend.set_offline(false);

    let shutdown = CancellationToken::new();
    let tasks = svc.spawn(&shutdown);

    backend
        .seed(&reservation(DAY, "Salao", 1, 3, "Bruno"))
        .expect("seed");
    svc.request_refresh();

    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let seen = svc.view(DAY).expect("view").is_occupied(&salao(1, 3));
            let drained = svc.pending().expect("pending").is_empty();
            if seen && drained {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    shutdown.cancel();
    tasks.join().await;

    assert!(settled.is_ok(), "loops did not converge");
    let view = svc.view(DAY).expect("view");
    assert_eq!(
        view.get(&SeatKey::new(DAY, "Aquario", "1", "1"))
            .map(|e| e.origin),
        Some(Origin::Remote)
    );
}

#[tokio::test]
async fn test_accented_sheet_row_blocks_booking() {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .seed_raw(WireRecord {
            date: json!("02/03/2026"),
            occupant: json!("Bruno"),
            department: json!("CEP"),
            location: json!("Salão"),
            bay: json!(1),
            seat: json!(3),
            ..Default::default()
        })
        .expect("seed");

    let svc = client(&backend);
    svc.fetch_once().await.expect("fetch");
    assert!(matches!(
        svc.seat_status(&salao(1, 3)).expect("status"),
        SeatStatus::Occupied(r) if r.occupant == "Bruno"
    ));

    let outcome = svc
        .submit(request(DAY, Location::Salao, 1, 3, "Ana"))
        .await
        .expect("submit");
    assert!(matches!(
        outcome,
        BookingOutcome::Rejected { winner: Some(ref w), .. } if w.occupant == "Bruno"
    ));
    assert_eq!(backend.writes(), 0);
    assert_eq!(svc.view(DAY).expect("view").len(), 1);
}

#[tokio::test]
async fn test_retry_pass_survives_records_resolved_mid_flight() {
    let sheet = Arc::new(InMemoryBackend::new());
    let backend = Arc::new(FetchAfterWrite {
        sheet: sheet.clone(),
        client: OnceLock::new(),
    });
    let shared: Arc<dyn ReservationBackend> = backend.clone();
    let svc = SyncService::new(
        ReservationEngine::new(PendingStore::in_memory().expect("store")),
        shared,
        SyncSettings::default(),
    );
    let _ = backend.client.set(svc.clone());

    sheet.set_offline(true);
    for seat in [1, 2] {
        let outcome = svc
            .submit(request(DAY, Location::Salao, 1, seat, "Ana"))
            .await
            .expect("submit");
        assert!(matches!(outcome, BookingOutcome::ConnectionFailed(_)));
    }
    sheet.set_offline(false);

    let report = svc.retry_pending().await.expect("retry pass completes");
    assert_eq!(report.still_pending, 0);

    // both writes went out, each one matched by the fetch that followed it
    assert_eq!(sheet.writes(), 2);
    assert!(svc.pending().expect("pending").is_empty());
    let view = svc.view(DAY).expect("view");
    assert!(view.is_occupied(&salao(1, 1)));
    assert!(view.is_occupied(&salao(1, 2)));
}

#[tokio::test]
async fn test_sync_once_retries_unconfirmed_without_loops() {
    let backend = Arc::new(InMemoryBackend::new());
    let svc = client(&backend);

    backend.set_offline(true);
    let outcome = svc
        .submit(request(DAY, Location::Salao, 3, 12, "Ana"))
        .await
        .expect("submit");
    assert!(matches!(outcome, BookingOutcome::ConnectionFailed(_)));
    backend.set_offline(false);

    svc.sync_once().await.expect("sync");

    assert!(svc.pending().expect("pending").is_empty());
    assert_eq!(backend.writes(), 1);
    assert_eq!(
        svc.view(DAY)
            .expect("view")
            .get(&salao(3, 12))
            .map(|e| e.origin),
        Some(Origin::Remote)
    );
}
