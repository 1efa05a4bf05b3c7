use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ledger::LedgerError;
use crate::services::qr::ScanDecodeError;

/// Gateway failure taxonomy.
///
/// Validation/Auth/NotFound are detected locally and returned without a
/// backend call; `Backend` forwards the ledger's own status and message;
/// `Config` means the request needed a backend that was never configured
/// (fatal to the request, not the process).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid scan code")]
    InvalidScanCode,

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LedgerError> for GatewayError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected { status, message } => GatewayError::Backend { status, message },
            LedgerError::Unreachable(message) => GatewayError::Unreachable(message),
            LedgerError::Unconfigured => {
                GatewayError::Config("BACKEND_URL is not configured".to_string())
            }
        }
    }
}

impl From<ScanDecodeError> for GatewayError {
    fn from(_: ScanDecodeError) -> Self {
        GatewayError::InvalidScanCode
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            #[serde(skip_serializing_if = "Option::is_none")]
            valid: Option<bool>,
            error: String,
        }

        let (status, valid, error) = match self {
            GatewayError::Validation(msg) => (StatusCode::BAD_REQUEST, None, msg),
            GatewayError::Auth(msg) => (StatusCode::UNAUTHORIZED, None, msg),
            GatewayError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(false), msg),
            GatewayError::InvalidScanCode => (
                StatusCode::BAD_REQUEST,
                Some(false),
                "Invalid QR Code format.".to_string(),
            ),
            GatewayError::Backend { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                None,
                message,
            ),
            GatewayError::Unreachable(msg) => {
                tracing::error!(error = %msg, "Backend ledger unreachable");
                (
                    StatusCode::BAD_GATEWAY,
                    None,
                    "Backend ledger unreachable".to_string(),
                )
            }
            GatewayError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, None, msg),
        };

        (status, Json(ErrorResponse { valid, error })).into_response()
    }
}
