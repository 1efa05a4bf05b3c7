//! HTTP client for the backend invoice ledger.
//!
//! Every outbound call is classified into exactly one of rejected,
//! unreachable, or unconfigured, so handlers can map failures onto the
//! gateway's error taxonomy without inspecting transport details. No call
//! is retried; transient failures surface to the caller.

use crate::config::BackendConfig;
use crate::mapping::{self, BackendInvoiceRecord, BackendVerifyOutcome, IssueInvoicePayload};
use crate::models::invoice::{Invoice, InvoiceHash, IssueInvoiceInput, ScanCode};
use chrono::{Datelike, SecondsFormat, Utc};
use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("no backend ledger configured")]
    Unconfigured,
}

/// Client for the backend ledger. Cheap to clone; the inner reqwest client
/// is an internally pooled handle.
#[derive(Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: Option<String>,
}

impl LedgerClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// The base address, or `Unconfigured` before any request is built.
    fn base_url(&self) -> Result<&str, LedgerError> {
        self.base_url.as_deref().ok_or(LedgerError::Unconfigured)
    }

    /// Issue an invoice on the backend ledger.
    pub async fn issue(
        &self,
        input: &IssueInvoiceInput,
    ) -> Result<BackendInvoiceRecord, LedgerError> {
        let url = format!("{}/invoices", self.base_url()?);

        let response = self
            .client
            .post(&url)
            .json(&IssueInvoicePayload::from(input))
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Failed to issue invoice").await
    }

    /// Fetch a single invoice record. A backend 404 stays `Rejected` here;
    /// the handler owns the not-found response shape.
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<BackendInvoiceRecord, LedgerError> {
        let url = format!("{}/invoices/{}", self.base_url()?, invoice_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Invoice not found").await
    }

    /// List invoices visible to the caller, forwarding the caller's
    /// `Authorization` header verbatim.
    pub async fn list(&self, authorization: &str) -> Result<Vec<BackendInvoiceRecord>, LedgerError> {
        let url = format!("{}/invoices", self.base_url()?);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Failed to fetch invoices").await
    }

    /// Authoritative authenticity check, distinct from `get_invoice`.
    pub async fn verify(&self, invoice_id: &str) -> Result<BackendVerifyOutcome, LedgerError> {
        let url = format!("{}/invoices/verify", self.base_url()?);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "invoice_id": invoice_id }))
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Verification failed").await
    }
}

/// Standalone issuance used when no backend ledger is configured.
///
/// Re-deriving the fallback hash from the returned invoice's own fields
/// reproduces it exactly.
pub fn issue_local(input: &IssueInvoiceInput) -> Invoice {
    let now = Utc::now();
    let sequence: u32 = rand::thread_rng().gen_range(0..10_000);
    let invoice_id = format!("INV-{}-{:04}", now.year(), sequence);
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let hash = mapping::fallback_hash(
        &invoice_id,
        &input.supplier_tpin,
        &input.buyer_tpin,
        input.amount,
        input.vat,
        &timestamp,
    );

    tracing::info!(
        invoice_id = %invoice_id,
        "Issued invoice locally (no backend ledger configured)"
    );

    Invoice {
        invoice_id,
        supplier_tpin: input.supplier_tpin.clone(),
        buyer_tpin: input.buyer_tpin.clone(),
        amount: input.amount,
        vat: input.vat,
        hash: InvoiceHash::Local(hash),
        tx_ref: None,
        timestamp,
        status: None,
        scan_code: ScanCode::Unavailable,
    }
}

fn transport_error(err: reqwest::Error) -> LedgerError {
    tracing::error!(error = %err, "Failed to reach backend ledger");
    LedgerError::Unreachable(err.to_string())
}

/// Classify the response: non-2xx becomes `Rejected` with the backend's
/// best-effort message, a 2xx body the gateway cannot parse counts as
/// unreachable.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, LedgerError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LedgerError::Unreachable(e.to_string()))?;

    if !status.is_success() {
        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let message = mapping::error_message(&value, fallback);
        tracing::warn!(status = %status, message = %message, "Backend ledger rejected request");
        return Err(LedgerError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, "Backend ledger returned an unparseable body");
        LedgerError::Unreachable(format!("invalid backend response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> IssueInvoiceInput {
        IssueInvoiceInput {
            supplier_tpin: "1234567890".to_string(),
            buyer_tpin: "0987654321".to_string(),
            amount: 1000.0,
            vat: 16.0,
        }
    }

    #[test]
    fn local_issuance_shapes_id_and_hash() {
        let invoice = issue_local(&sample_input());

        let parts: Vec<&str> = invoice.invoice_id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));

        assert!(invoice.hash.is_local());
        assert_eq!(invoice.hash.as_str().len(), 16);
        assert!(invoice.status.is_none());
        assert!(invoice.tx_ref.is_none());
    }

    #[test]
    fn local_hash_is_reproducible_from_invoice_fields() {
        let invoice = issue_local(&sample_input());
        let recomputed = mapping::fallback_hash(
            &invoice.invoice_id,
            &invoice.supplier_tpin,
            &invoice.buyer_tpin,
            invoice.amount,
            invoice.vat,
            &invoice.timestamp,
        );
        assert_eq!(invoice.hash.as_str(), recomputed);
    }

    #[tokio::test]
    async fn unconfigured_client_never_dials() {
        let client = LedgerClient::new(BackendConfig { base_url: None });
        assert!(!client.is_configured());

        assert!(matches!(
            client.issue(&sample_input()).await,
            Err(LedgerError::Unconfigured)
        ));
        assert!(matches!(
            client.get_invoice("INV-2024-001").await,
            Err(LedgerError::Unconfigured)
        ));
        assert!(matches!(
            client.list("Bearer token").await,
            Err(LedgerError::Unconfigured)
        ));
        assert!(matches!(
            client.verify("INV-2024-001").await,
            Err(LedgerError::Unconfigured)
        ));
    }
}
