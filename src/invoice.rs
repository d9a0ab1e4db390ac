//! HTTP boundary to the payment backend.
//!
//! One explicit wire contract: `POST /api/invoice` returns
//! `{"invoice_id": "..."}` and nothing else is accepted, and
//! `GET /api/invoice/{id}/status` returns `{"status": "PENDING"|"PAID"}`.
//! Invoice creation failures are surfaced immediately with the backend's
//! own words; status checks are deliberately tolerant so a polling loop
//! can ride out transient backend hiccups without tearing down.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::core::config;
use crate::identity::UserId;

/// Invoice backend errors
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Backend answered with a non-success status; `body` is its error
    /// text verbatim (escaped only at the display layer)
    #[error("Backend rejected invoice creation ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    /// Network-level failure reaching the backend
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Success response whose body does not match the wire contract
    #[error("Malformed backend response: {0}")]
    Malformed(String),

    /// Backend base URL could not be parsed
    #[error("Invalid backend URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Payment state of an invoice as reported by the backend.
///
/// Monotonic per invoice id: once the backend reports `Paid` it never
/// reverts. The client never infers `Paid` locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    // Storage writes uppercase; payment webhooks have been seen lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pending") {
            Ok(InvoiceStatus::Pending)
        } else if s.eq_ignore_ascii_case("paid") {
            Ok(InvoiceStatus::Paid)
        } else {
            Err(format!("Unknown invoice status: {}", s))
        }
    }
}

/// A backend-issued payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    /// Opaque backend identifier, unique per checkout attempt
    pub invoice_id: String,
    /// Total at creation time, immutable thereafter
    pub amount: i64,
    /// Last status observed from the backend
    pub status: InvoiceStatus,
}

#[derive(Serialize)]
struct CreateInvoiceRequest<'a> {
    user_id: i64,
    groups: &'a [String],
    amount: i64,
}

#[derive(Deserialize)]
struct CreateInvoiceResponse {
    invoice_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

/// Gateway to the payment backend.
///
/// All methods are `&self`; implementations should be stateless or use
/// interior mutability. The checkout controller drives this trait, so
/// tests can substitute a scripted in-memory backend.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    /// Creates an invoice for a selection. One request, no automatic
    /// retry; the caller decides whether the user may retry manually.
    ///
    /// The `amount` is the client-computed total, sent for the backend
    /// to validate.
    async fn create_invoice(&self, user: UserId, selected: &[String], amount: i64) -> Result<Invoice, InvoiceError>;

    /// Checks payment status. Returns `None` on ANY failure (transport,
    /// non-success status, unparseable body) so a polling loop can skip
    /// the tick and try again later.
    async fn get_status(&self, invoice_id: &str) -> Option<InvoiceStatus>;
}

/// Production `reqwest` implementation of [`InvoiceApi`].
#[derive(Debug, Clone)]
pub struct InvoiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl InvoiceClient {
    /// Builds a client for the given backend base URL with the standard
    /// request timeout.
    pub fn new(base_url: &str) -> Result<Self, InvoiceError> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config::http::request_timeout())
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Client for the backend named by `BACKEND_BASE_URL`.
    pub fn from_env() -> Result<Self, InvoiceError> {
        Self::new(config::BACKEND_BASE_URL.as_str())
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    /// URL of the QR image resource for an invoice.
    ///
    /// Pure construction, no network call. The `t` parameter carries the
    /// current unix time so intermediate caches never serve a stale QR
    /// image across re-renders.
    pub fn qr_image_url(&self, invoice_id: &str, amount: i64) -> Url {
        let mut url = self.endpoint(&format!("/api/qr/{}.png", invoice_id));
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string())
            .append_pair("t", &chrono::Utc::now().timestamp().to_string());
        url
    }
}

#[async_trait]
impl InvoiceApi for InvoiceClient {
    async fn create_invoice(&self, user: UserId, selected: &[String], amount: i64) -> Result<Invoice, InvoiceError> {
        let url = self.endpoint("/api/invoice");
        let request = CreateInvoiceRequest {
            user_id: user.0,
            groups: selected,
            amount,
        };

        log::info!(
            "💳 Creating invoice: user={}, groups={:?}, amount={}",
            user,
            selected,
            amount
        );

        let response = self.http.post(url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::warn!("Invoice creation rejected ({}): {}", status, body);
            return Err(InvoiceError::Rejected { status, body });
        }

        // The contract is exactly {"invoice_id": "..."}; alternate field
        // names seen in older backends are treated as malformed rather
        // than guessed at.
        let parsed: CreateInvoiceResponse = serde_json::from_str(&body).map_err(|e| {
            log::warn!("Invoice creation returned unexpected body: {}", body);
            InvoiceError::Malformed(e.to_string())
        })?;

        log::info!("✅ Invoice created: {}", parsed.invoice_id);
        Ok(Invoice {
            invoice_id: parsed.invoice_id,
            amount,
            status: InvoiceStatus::Pending,
        })
    }

    async fn get_status(&self, invoice_id: &str) -> Option<InvoiceStatus> {
        let url = self.endpoint(&format!("/api/invoice/{}/status", invoice_id));

        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Status check transport error for {}: {}", invoice_id, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::debug!("Status check for {} returned {}", invoice_id, response.status());
            return None;
        }

        let body: StatusResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::debug!("Status check for {} returned unparseable body: {}", invoice_id, e);
                return None;
            }
        };

        match body.status.parse::<InvoiceStatus>() {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }
}
