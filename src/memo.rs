//! Ledger memo codec binding a transaction to a payment id.
//!
//! An x402 memo carries three hex-encoded fields:
//!
//! | Field        | Decoded content                                  |
//! |--------------|--------------------------------------------------|
//! | `MemoType`   | `x402`                                           |
//! | `MemoFormat` | `application/json`                               |
//! | `MemoData`   | `{"v":1,"t":"x402","paymentId":"…","sessionId":"…"}` |

use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Decoded `MemoType` of an x402 memo.
pub const MEMO_TYPE: &str = "x402";

/// Decoded `MemoFormat` of an x402 memo.
pub const MEMO_FORMAT: &str = "application/json";

/// Payload schema version.
pub const MEMO_VERSION: u8 = 1;

/// A single memo as it appears on a ledger transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMemo {
    /// Hex-encoded memo type.
    #[serde(rename = "MemoType", default, skip_serializing_if = "Option::is_none")]
    pub memo_type: Option<String>,
    /// Hex-encoded memo format.
    #[serde(rename = "MemoFormat", default, skip_serializing_if = "Option::is_none")]
    pub memo_format: Option<String>,
    /// Hex-encoded memo data.
    #[serde(rename = "MemoData", default, skip_serializing_if = "Option::is_none")]
    pub memo_data: Option<String>,
}

/// The `{ "Memo": { … } }` wrapper used in transaction JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEnvelope {
    /// Wrapped memo.
    #[serde(rename = "Memo")]
    pub memo: LedgerMemo,
}

#[derive(Serialize)]
struct MemoPayload<'a> {
    v: u8,
    t: &'a str,
    #[serde(rename = "paymentId")]
    payment_id: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

fn invalid_memo(message: impl Into<String>) -> Error {
    Error::verification(ErrorCode::InvalidMemo, message)
}

/// Build the memo a payer attaches to bind a transaction to `payment_id`.
///
/// # Errors
///
/// Returns a serialization error if the payload cannot be encoded.
pub fn encode_memo(payment_id: &str, session_id: Option<&str>) -> Result<LedgerMemo> {
    let payload = MemoPayload {
        v: MEMO_VERSION,
        t: MEMO_TYPE,
        payment_id,
        session_id,
    };
    let json = serde_json::to_string(&payload)?;

    Ok(LedgerMemo {
        memo_type: Some(hex::encode_upper(MEMO_TYPE)),
        memo_format: Some(hex::encode_upper(MEMO_FORMAT)),
        memo_data: Some(hex::encode_upper(json)),
    })
}

/// Decode one memo field.
///
/// Absent or empty fields decode to `""`. Even-length hex is decoded as
/// UTF-8; anything else is taken as plain text.
///
/// # Errors
///
/// Returns `invalid_memo` if hex content is not valid UTF-8.
pub fn decode_field(raw: Option<&str>) -> Result<String> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(String::new()),
    };

    let is_hex = raw.len() % 2 == 0 && raw.bytes().all(|b| b.is_ascii_hexdigit());
    if !is_hex {
        return Ok(raw.to_string());
    }

    let bytes = hex::decode(raw).map_err(|e| invalid_memo(format!("bad memo hex: {e}")))?;
    String::from_utf8(bytes).map_err(|e| invalid_memo(format!("memo is not UTF-8: {e}")))
}

/// Find a memo binding the transaction to `payment_id`.
///
/// Memos whose type or format is not x402 JSON, or whose data is empty,
/// are skipped. A candidate whose data is not JSON fails the whole match.
///
/// # Errors
///
/// Returns `invalid_memo` if there are no memos, a candidate is corrupt,
/// or no memo names `payment_id`.
pub fn match_memo(memos: Option<&[LedgerMemo]>, payment_id: &str) -> Result<()> {
    let memos = match memos {
        Some(memos) if !memos.is_empty() => memos,
        _ => return Err(invalid_memo("transaction carries no memos")),
    };

    for memo in memos {
        let memo_type = decode_field(memo.memo_type.as_deref())?;
        let memo_format = decode_field(memo.memo_format.as_deref())?;
        if memo_type != MEMO_TYPE || memo_format != MEMO_FORMAT {
            continue;
        }

        let memo_data = decode_field(memo.memo_data.as_deref())?;
        if memo_data.is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&memo_data)
            .map_err(|e| invalid_memo(format!("x402 memo data is not JSON: {e}")))?;

        if payload_matches(&payload, payment_id) {
            return Ok(());
        }
        debug!("Skipping x402 memo bound to another payment");
    }

    Err(invalid_memo(format!("no memo binds payment {payment_id}")))
}

fn payload_matches(payload: &Value, payment_id: &str) -> bool {
    payload.get("v").and_then(Value::as_f64) == Some(f64::from(MEMO_VERSION))
        && payload.get("t").and_then(Value::as_str) == Some(MEMO_TYPE)
        && payload.get("paymentId").and_then(Value::as_str) == Some(payment_id)
}
