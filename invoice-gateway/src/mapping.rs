//! Field mapping between the client vocabulary (camelCase) and the backend
//! ledger vocabulary (snake_case).
//!
//! This is the single place where the two vocabularies meet. Mapping is
//! total over the fields present in either direction; fields absent on one
//! side are dropped, never invented.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::invoice::{Invoice, InvoiceHash, InvoiceStatus, IssueInvoiceInput, ScanCode};

/// Invoice record as the backend ledger returns it.
///
/// Endpoints disagree on the id key, some send numeric ids, and some
/// deployments omit the ledger hash entirely, so ingestion is deliberately
/// lenient.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInvoiceRecord {
    #[serde(
        alias = "invoiceId",
        alias = "invoice_id",
        deserialize_with = "string_or_number"
    )]
    pub id: String,
    #[serde(alias = "supplierTpin")]
    pub supplier_tpin: String,
    #[serde(alias = "buyerTpin")]
    pub buyer_tpin: String,
    pub amount: f64,
    pub vat: f64,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, alias = "hash")]
    pub blockchain_hash: Option<String>,
    #[serde(default, alias = "txRef")]
    pub blockchain_tx_ref: Option<String>,
}

impl BackendInvoiceRecord {
    /// Convert into the canonical client-facing view.
    ///
    /// The canonical view requires a hash; a record that arrives without a
    /// ledger hash gets the synthetic local fallback, tagged as such.
    pub fn into_invoice(self) -> Invoice {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let hash = match self.blockchain_hash {
            Some(hash) => InvoiceHash::Backend(hash),
            None => InvoiceHash::Local(fallback_hash(
                &self.id,
                &self.supplier_tpin,
                &self.buyer_tpin,
                self.amount,
                self.vat,
                &timestamp,
            )),
        };

        Invoice {
            invoice_id: self.id,
            supplier_tpin: self.supplier_tpin,
            buyer_tpin: self.buyer_tpin,
            amount: self.amount,
            vat: self.vat,
            hash,
            tx_ref: self.blockchain_tx_ref,
            timestamp,
            status: self.status,
            scan_code: ScanCode::Unavailable,
        }
    }
}

/// Backend ids are integers on some endpoints and strings on others.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invoice id must be a string or number, got {other}"
        ))),
    }
}

/// Outbound issuance body in the backend's vocabulary.
#[derive(Debug, Serialize)]
pub struct IssueInvoicePayload<'a> {
    pub supplier_tpin: &'a str,
    pub buyer_tpin: &'a str,
    pub amount: f64,
    pub vat: f64,
}

impl<'a> From<&'a IssueInvoiceInput> for IssueInvoicePayload<'a> {
    fn from(input: &'a IssueInvoiceInput) -> Self {
        Self {
            supplier_tpin: &input.supplier_tpin,
            buyer_tpin: &input.buyer_tpin,
            amount: input.amount,
            vat: input.vat,
        }
    }
}

/// Verdict from the backend's verification endpoint.
#[derive(Debug, Deserialize)]
pub struct BackendVerifyOutcome {
    pub valid: bool,
    #[serde(default)]
    pub invoice: Option<BackendInvoiceRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Extract a human-readable message from a backend error payload.
///
/// FastAPI-style backends send `detail`, others send `error`; if neither is
/// a string the supplied fallback is used.
pub fn error_message(body: &Value, fallback: &str) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or(fallback)
        .to_string()
}

/// Deterministic local content fingerprint.
///
/// Folds each character's code point of the concatenated fields into a
/// wrapping 32-bit accumulator (multiply by 31, add), absolute-values the
/// result, and renders it as 16 zero-padded lowercase hex digits.
pub fn fallback_hash(
    id: &str,
    supplier_tpin: &str,
    buyer_tpin: &str,
    amount: f64,
    vat: f64,
    timestamp: &str,
) -> String {
    let material = format!("{id}{supplier_tpin}{buyer_tpin}{amount}{vat}{timestamp}");
    let mut acc: i32 = 0;
    for ch in material.chars() {
        acc = acc.wrapping_mul(31).wrapping_add(ch as i32);
    }
    format!("{:016x}", acc.unsigned_abs())
}
