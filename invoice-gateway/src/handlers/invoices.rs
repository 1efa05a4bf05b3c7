//! Invoice operation handlers.
//!
//! Each handler is a stateless transformation: validate the inbound shape,
//! make at most one backend call, and emit the canonical response. Failures
//! surface immediately; nothing is retried.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use crate::{
    error::GatewayError,
    models::invoice::{
        Invoice, IssueInvoiceRequest, VerificationResponse, VerifyInvoiceRequest, VerifyScanRequest,
    },
    services::{
        ledger::{self, LedgerError},
        qr,
    },
    AppState,
};

/// POST /invoices
///
/// Issues on the backend ledger when one is configured; otherwise falls
/// back to local standalone issuance. The scan code is attached last and
/// never fails the request.
pub async fn issue_invoice(
    State(state): State<AppState>,
    Json(payload): Json<IssueInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), GatewayError> {
    payload
        .validate()
        .map_err(|_| GatewayError::Validation("Missing required fields".to_string()))?;
    let input = payload.into_input();

    let invoice = match state.ledger.issue(&input).await {
        Ok(record) => record.into_invoice(),
        Err(LedgerError::Unconfigured) => ledger::issue_local(&input),
        Err(e) => return Err(e.into()),
    };

    let scan_code = qr::encode(&invoice);
    let invoice = invoice.with_scan_code(scan_code);

    tracing::info!(
        invoice_id = %invoice.invoice_id,
        local = invoice.hash.is_local(),
        "Invoice issued"
    );

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<VerificationResponse>, GatewayError> {
    let record = state
        .ledger
        .get_invoice(&invoice_id)
        .await
        .map_err(|e| match e {
            LedgerError::Rejected { status: 404, .. } => {
                GatewayError::NotFound("Invoice not found in registry".to_string())
            }
            other => other.into(),
        })?;

    Ok(Json(VerificationResponse::verified(record.into_invoice())))
}

/// GET /invoices
///
/// Requires the caller's bearer credential; its absence is a caller error
/// detected before any backend call.
pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Invoice>>, GatewayError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| GatewayError::Auth("Authorization header required".to_string()))?;

    let records = state.ledger.list(authorization).await?;
    let invoices = records
        .into_iter()
        .map(|record| record.into_invoice())
        .collect();

    Ok(Json(invoices))
}

/// POST /invoices/verify
pub async fn verify_invoice(
    State(state): State<AppState>,
    Json(payload): Json<VerifyInvoiceRequest>,
) -> Result<Json<VerificationResponse>, GatewayError> {
    let invoice_id = payload
        .invoice_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::Validation("invoice_id is required".to_string()))?;

    verify_by_id(&state, &invoice_id).await.map(Json)
}

/// POST /invoices/verify-qr
///
/// Decodes the scanned payload down to its invoice id, then delegates to
/// the same verification path as verify-by-id. A payload the codec cannot
/// parse fails here, before any backend call.
pub async fn verify_scan(
    State(state): State<AppState>,
    Json(payload): Json<VerifyScanRequest>,
) -> Result<Json<VerificationResponse>, GatewayError> {
    let raw = payload.qr_data.ok_or(GatewayError::InvalidScanCode)?;
    let invoice_id = qr::decode(&raw)?;

    verify_by_id(&state, &invoice_id).await.map(Json)
}

/// The backend's verdict is passed through as-is: it decides validity, the
/// gateway only reshapes the record.
async fn verify_by_id(
    state: &AppState,
    invoice_id: &str,
) -> Result<VerificationResponse, GatewayError> {
    let outcome = state.ledger.verify(invoice_id).await?;

    if outcome.valid {
        tracing::info!(invoice_id = %invoice_id, "Invoice verified");
        Ok(match outcome.invoice {
            Some(record) => VerificationResponse::verified(record.into_invoice()),
            None => VerificationResponse {
                valid: true,
                invoice: None,
                error: None,
            },
        })
    } else {
        let reason = outcome
            .error
            .unwrap_or_else(|| "Invoice could not be verified".to_string());
        tracing::warn!(invoice_id = %invoice_id, reason = %reason, "Invoice failed verification");
        Ok(VerificationResponse::rejected(reason))
    }
}
