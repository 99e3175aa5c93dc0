//! Backend access: one idempotent read of the whole reservation list and one
//! fire-and-forget style write per booking.

pub mod http;
pub mod memory;
pub mod wire;

use crate::errors::AppResult;
use async_trait::async_trait;
use wire::{BookingForm, ReadPayload, WriteResponse};

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

#[async_trait]
pub trait ReservationBackend: Send + Sync {
    /// Read the full reservation list (every call must defeat caches).
    async fn fetch(&self) -> AppResult<ReadPayload>;

    /// Append one booking. `Err` means no usable answer came back.
    async fn submit(&self, form: &BookingForm) -> AppResult<WriteResponse>;
}
