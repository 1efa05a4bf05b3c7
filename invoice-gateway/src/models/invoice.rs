//! Canonical invoice view and request DTOs.
//!
//! The gateway speaks camelCase to clients and snake_case to the backend
//! ledger; everything internal uses this one canonical shape.

use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

/// Invoice status, owned exclusively by the backend ledger. Locally issued
/// invoices carry no status until the ledger records them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "PAID" => InvoiceStatus::Paid,
            "CANCELLED" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Pending,
        }
    }
}

/// Content fingerprint of an invoice.
///
/// Backend-issued hashes and the local deterministic fallback are different
/// trust levels; the tag keeps them apart internally while the wire format
/// stays a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceHash {
    Backend(String),
    Local(String),
}

impl InvoiceHash {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceHash::Backend(hash) | InvoiceHash::Local(hash) => hash,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, InvoiceHash::Local(_))
    }
}

impl Serialize for InvoiceHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Rendered scan code for an invoice.
///
/// Rendering failure is an explicit variant, not a sentinel string, so
/// consumers cannot mistake a placeholder for a real image. `Unavailable`
/// is omitted from JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCode {
    Image(String),
    Unavailable,
}

impl ScanCode {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ScanCode::Unavailable)
    }

    pub fn as_data_url(&self) -> Option<&str> {
        match self {
            ScanCode::Image(url) => Some(url),
            ScanCode::Unavailable => None,
        }
    }
}

impl Serialize for ScanCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScanCode::Image(url) => serializer.serialize_str(url),
            ScanCode::Unavailable => serializer.serialize_unit(),
        }
    }
}

/// The canonical invoice view presented to clients, regardless of which
/// backend field names produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: String,
    pub supplier_tpin: String,
    pub buyer_tpin: String,
    pub amount: f64,
    pub vat: f64,
    pub hash: InvoiceHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
    /// ISO-8601 creation time; display formatting is the client's concern.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "ScanCode::is_unavailable")]
    pub scan_code: ScanCode,
}

impl Invoice {
    pub fn with_scan_code(mut self, scan_code: ScanCode) -> Self {
        self.scan_code = scan_code;
        self
    }
}

/// Inbound issuance request. Clients send camelCase, older ones snake_case;
/// both are accepted here and nowhere else.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueInvoiceRequest {
    #[serde(default, alias = "supplier_tpin")]
    #[validate(required, length(min = 1))]
    pub supplier_tpin: Option<String>,
    #[serde(default, alias = "buyer_tpin")]
    #[validate(required, length(min = 1))]
    pub buyer_tpin: Option<String>,
    #[serde(default)]
    #[validate(required, range(min = 0.0))]
    pub amount: Option<f64>,
    #[serde(default)]
    #[validate(required, range(min = 0.0))]
    pub vat: Option<f64>,
}

impl IssueInvoiceRequest {
    /// Call after `validate()`; absent fields have already been rejected.
    pub fn into_input(self) -> IssueInvoiceInput {
        IssueInvoiceInput {
            supplier_tpin: self.supplier_tpin.unwrap_or_default(),
            buyer_tpin: self.buyer_tpin.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            vat: self.vat.unwrap_or_default(),
        }
    }
}

/// Validated issuance input.
#[derive(Debug, Clone)]
pub struct IssueInvoiceInput {
    pub supplier_tpin: String,
    pub buyer_tpin: String,
    pub amount: f64,
    pub vat: f64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyInvoiceRequest {
    #[serde(default, alias = "invoiceId")]
    pub invoice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyScanRequest {
    #[serde(default, alias = "qrData")]
    pub qr_data: Option<String>,
}

/// Verification verdict returned by get/verify operations.
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub invoice: Option<Invoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResponse {
    pub fn verified(invoice: Invoice) -> Self {
        Self {
            valid: true,
            invoice: Some(invoice),
            error: None,
        }
    }

    pub fn rejected(error: String) -> Self {
        Self {
            valid: false,
            invoice: None,
            error: Some(error),
        }
    }
}
