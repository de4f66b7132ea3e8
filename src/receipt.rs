//! Settlement receipt and its header encoding.

use crate::error::{Error, ErrorCode, Result};
use crate::network::Network;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Conventional HTTP header carrying the encoded receipt.
pub const RECEIPT_HEADER: &str = "X-PAYMENT-RECEIPT";

/// The client's claim that a ledger transaction settles a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Ledger the transaction was submitted to.
    pub network: Network,
    /// Transaction hash.
    pub tx_hash: String,
    /// Payment id the transaction claims to settle.
    pub payment_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptWire {
    network: String,
    tx_hash: String,
    payment_id: String,
}

fn invalid_receipt(message: impl Into<String>) -> Error {
    Error::verification(ErrorCode::InvalidReceipt, message)
}

/// Encode a receipt as a base64 JSON header value.
///
/// # Errors
///
/// Returns `invalid_receipt` if the hash or payment id is empty.
pub fn encode_receipt_header(receipt: &Receipt) -> Result<String> {
    if receipt.tx_hash.is_empty() {
        return Err(invalid_receipt("transaction hash is empty"));
    }
    if receipt.payment_id.is_empty() {
        return Err(invalid_receipt("payment id is empty"));
    }
    let json = serde_json::to_vec(receipt)?;
    Ok(BASE64.encode(json))
}

/// Decode and structurally validate a receipt header value.
///
/// # Errors
///
/// Returns `invalid_receipt` if the value is not base64, not JSON, names an
/// unsupported network, or has an empty hash or payment id.
pub fn decode_receipt_header(value: &str) -> Result<Receipt> {
    let bytes = BASE64
        .decode(value)
        .map_err(|e| invalid_receipt(format!("receipt is not base64: {e}")))?;
    let wire: ReceiptWire = serde_json::from_slice(&bytes)
        .map_err(|e| invalid_receipt(format!("receipt is not valid JSON: {e}")))?;

    let network = wire
        .network
        .parse::<Network>()
        .map_err(|e| invalid_receipt(e.to_string()))?;
    if wire.tx_hash.is_empty() {
        return Err(invalid_receipt("transaction hash is empty"));
    }
    if wire.payment_id.is_empty() {
        return Err(invalid_receipt("payment id is empty"));
    }

    Ok(Receipt {
        network,
        tx_hash: wire.tx_hash,
        payment_id: wire.payment_id,
    })
}
