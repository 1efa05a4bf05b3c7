//! Scan-code codec: the canonical QR payload for an invoice.
//!
//! Encoding embeds redundant display fields so a scanned code can be shown
//! offline before any network round-trip, but decoding trusts only the
//! invoice id; the backend's verify endpoint stays the authority on
//! authenticity, so a forged payload with plausible amounts is never
//! treated as verified.

use crate::models::invoice::{Invoice, ScanCode};
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use serde::Serialize;
use serde_json::Value;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanDecodeError {
    #[error("scan payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("scan payload carries no invoice id")]
    MissingInvoiceId,
}

/// Payload embedded in the QR image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanPayload<'a> {
    invoice_id: &'a str,
    supplier_tpin: &'a str,
    buyer_tpin: &'a str,
    amount: f64,
    vat: f64,
    hash: &'a str,
    timestamp: &'a str,
}

fn payload_json(invoice: &Invoice) -> serde_json::Result<String> {
    serde_json::to_string(&ScanPayload {
        invoice_id: &invoice.invoice_id,
        supplier_tpin: &invoice.supplier_tpin,
        buyer_tpin: &invoice.buyer_tpin,
        amount: invoice.amount,
        vat: invoice.vat,
        hash: invoice.hash.as_str(),
        timestamp: &invoice.timestamp,
    })
}

/// Encode an invoice into a scannable PNG data URL.
///
/// Rendering failures degrade to `ScanCode::Unavailable`; issuance must not
/// fail because the code could not be drawn.
pub fn encode(invoice: &Invoice) -> ScanCode {
    match render_data_url(invoice) {
        Ok(url) => ScanCode::Image(url),
        Err(e) => {
            tracing::warn!(
                invoice_id = %invoice.invoice_id,
                error = %e,
                "Failed to render scan code, issuing without one"
            );
            ScanCode::Unavailable
        }
    }
}

fn render_data_url(invoice: &Invoice) -> Result<String> {
    let payload = payload_json(invoice)?;
    let code = QrCode::new(payload.as_bytes())?;
    let image = code.render::<Luma<u8>>().build();

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image).write_to(&mut buffer, image::ImageOutputFormat::Png)?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(buffer.get_ref())
    ))
}

/// Decode a scanned string down to the invoice id it names.
///
/// Accepts `invoice_id` or `invoiceId`; every other field is discarded.
pub fn decode(raw: &str) -> Result<String, ScanDecodeError> {
    let value: Value = serde_json::from_str(raw)?;

    let invoice_id = value
        .get("invoice_id")
        .and_then(Value::as_str)
        .or_else(|| value.get("invoiceId").and_then(Value::as_str))
        .filter(|id| !id.is_empty())
        .ok_or(ScanDecodeError::MissingInvoiceId)?;

    Ok(invoice_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceHash;

    fn sample_invoice() -> Invoice {
        Invoice {
            invoice_id: "INV-2024-0042".to_string(),
            supplier_tpin: "1234567890".to_string(),
            buyer_tpin: "0987654321".to_string(),
            amount: 1000.0,
            vat: 16.0,
            hash: InvoiceHash::Local("00000000a3f5d8c2".to_string()),
            tx_ref: None,
            timestamp: "2024-01-15T08:30:00.000Z".to_string(),
            status: None,
            scan_code: ScanCode::Unavailable,
        }
    }

    #[test]
    fn encode_produces_png_data_url() {
        let scan_code = encode(&sample_invoice());
        let url = scan_code.as_data_url().expect("scan code unavailable");
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn payload_round_trips_to_the_same_invoice_id() {
        let invoice = sample_invoice();
        let payload = payload_json(&invoice).unwrap();
        assert_eq!(decode(&payload).unwrap(), invoice.invoice_id);
    }

    #[test]
    fn decode_accepts_both_id_spellings() {
        assert_eq!(
            decode(r#"{"invoice_id":"INV-2024-001"}"#).unwrap(),
            "INV-2024-001"
        );
        assert_eq!(
            decode(r#"{"invoiceId":"INV-2024-001"}"#).unwrap(),
            "INV-2024-001"
        );
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(matches!(
            decode("not json"),
            Err(ScanDecodeError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_or_empty_id() {
        assert!(matches!(
            decode(r#"{"amount": 1000.0}"#),
            Err(ScanDecodeError::MissingInvoiceId)
        ));
        assert!(matches!(
            decode(r#"{"invoice_id": ""}"#),
            Err(ScanDecodeError::MissingInvoiceId)
        ));
        assert!(matches!(
            decode(r#"{"invoice_id": 42}"#),
            Err(ScanDecodeError::MissingInvoiceId)
        ));
    }
}
