//! HTTP client for the spreadsheet web app.

use super::ReservationBackend;
use super::wire::{BookingForm, ReadPayload, WriteResponse, decode_read, decode_write};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    url: String,
    nonce: AtomicU64,
}

impl HttpBackend {
    /// Create a new backend client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AppError::Config("api_url is not set".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            nonce: AtomicU64::new(0),
        })
    }

    /// Fresh value for the `t` query parameter, unique per call.
    fn cache_buster(&self) -> String {
        let n = self.nonce.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp_millis(), n)
    }

    /// Read the body of a response, mapping transport problems to `Network`.
    async fn body(response: Response) -> AppResult<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!("backend answered HTTP {status}")));
        }
        response.text().await.map_err(|e| AppError::Network(e.to_string()))
    }
}

#[async_trait]
impl ReservationBackend for HttpBackend {
    async fn fetch(&self) -> AppResult<ReadPayload> {
        let nonce = self.cache_buster();
        debug!(%nonce, "GET reservation list");

        let response = self
            .client
            .get(&self.url)
            .query(&[("t", nonce.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        decode_read(&Self::body(response).await?)
    }

    async fn submit(&self, form: &BookingForm) -> AppResult<WriteResponse> {
        debug!(seat = %format!("{}-{}-{}", form.local, form.baia, form.assento), date = %form.data, "POST booking");

        let response = self
            .client
            .post(&self.url)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        decode_write(&Self::body(response).await?)
    }
}
