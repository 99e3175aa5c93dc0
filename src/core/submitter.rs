//! Booking submitter: optimistic write, then confirm or roll back against
//! what the backend says.

use crate::core::engine::RetryResult;
use crate::core::sync::{RetryReport, SyncEvent, SyncService};
use crate::errors::AppResult;
use crate::models::booking::{BookingOutcome, BookingRequest};
use crate::remote::wire::BookingForm;
use tracing::{info, warn};

impl SyncService {
    /// Submit one booking.
    ///
    /// `Err` is returned only for validation failures and local storage
    /// errors; every backend answer, including no answer at all, is a
    /// [`BookingOutcome`].
    pub async fn submit(&self, request: BookingRequest) -> AppResult<BookingOutcome> {
        let key = request.key();

        //
        // 1️⃣ Idle -> Submitting (validation + seat disabled in the view)
        //
        let holder = {
            let mut engine = self.engine()?;
            engine.begin_submission(&request)?
        };

        if let Some(winner) = holder {
            info!(seat = %key, winner = %winner.occupant, "seat already taken, not sending");
            let message = format!("seat already taken by {}", winner.holder());
            self.engine()?.record_rejected(&key, &message);
            return Ok(self.finish(BookingOutcome::Rejected {
                key,
                winner: Some(winner),
                message,
            }));
        }
        self.bump_revision();

        //
        // 2️⃣ Network call
        //
        let reservation = request.to_reservation();
        let form = BookingForm::from(&reservation);
        let reply = self.backend().submit(&form).await;

        //
        // 3️⃣ Settle the attempt
        //
        let outcome = match reply {
            Ok(resp) if resp.success => {
                self.engine()?.record_confirmed(&reservation)?;
                info!(seat = %key, "booking confirmed");
                self.refresh_after_write().await;
                BookingOutcome::Confirmed(reservation)
            }
            Ok(resp) if resp.is_duplicate() => {
                let message = resp.reason();
                self.engine()?.record_rejected(&key, &message);
                info!(seat = %key, "booking rejected as duplicate");
                self.refresh_after_write().await;
                let winner = self.view(key.date())?.occupant(&key).cloned();
                BookingOutcome::Rejected {
                    key,
                    winner,
                    message,
                }
            }
            Ok(resp) => {
                let message = resp.reason();
                warn!(seat = %key, "backend refused booking: {message}");
                self.engine()?.record_rejected(&key, &message);
                BookingOutcome::Failed { key, message }
            }
            Err(e) if e.is_transient() => {
                // the write may or may not have landed; keep it and let the
                // next snapshot (or a retry answered with DUPLICATE) decide
                warn!(seat = %key, "no answer from backend, keeping booking for retry: {e}");
                let record = self
                    .engine()?
                    .record_connection_failed(&reservation, &e.to_string())?;
                BookingOutcome::ConnectionFailed(record)
            }
            Err(e) => {
                self.engine()?.record_rejected(&key, &e.to_string());
                self.bump_revision();
                return Err(e);
            }
        };

        Ok(self.finish(outcome))
    }

    fn finish(&self, outcome: BookingOutcome) -> BookingOutcome {
        self.bump_revision();
        self.publish(SyncEvent::Booking(outcome.clone()));
        outcome
    }

    /// Re-send every unconfirmed pending record once.
    ///
    /// Stops at the first network failure: the backend is unreachable and the
    /// remaining records would fail the same way.
    pub async fn retry_pending(&self) -> AppResult<RetryReport> {
        let candidates = self.engine()?.pending_store().unconfirmed()?;
        let mut report = RetryReport::default();

        for (idx, record) in candidates.iter().enumerate() {
            let key = record.key();
            let form = BookingForm::from(&record.reservation);

            let result = match self.backend().submit(&form).await {
                Ok(resp) if resp.success => RetryResult::Acknowledged,
                Ok(resp) if resp.is_duplicate() => RetryResult::Conflicted(resp.reason()),
                Ok(resp) => RetryResult::StillFailing(resp.reason()),
                Err(e) => RetryResult::StillFailing(e.to_string()),
            };

            let present = self.engine()?.record_retry(&key, &result)?;
            if !present && !matches!(result, RetryResult::StillFailing(_)) {
                // a fetch during the write already matched it
                continue;
            }

            match result {
                RetryResult::Acknowledged => {
                    info!(seat = %key, "retried booking accepted");
                    report.acknowledged += 1;
                    self.publish(SyncEvent::RetryAcknowledged(key));
                }
                RetryResult::Conflicted(message) => {
                    info!(seat = %key, "retried booking answered with DUPLICATE");
                    report.conflicted += 1;
                    self.publish(SyncEvent::RetryConflicted { key, message });
                }
                RetryResult::StillFailing(error) => {
                    warn!(seat = %key, "retry failed: {error}");
                    report.still_pending += candidates.len() - idx;
                    break;
                }
            }
        }

        if report.acknowledged + report.conflicted > 0 {
            self.bump_revision();
            self.refresh_after_write().await;
        }

        Ok(report)
    }
}
