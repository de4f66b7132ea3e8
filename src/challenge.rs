//! Payment challenge model.
//!
//! A challenge is issued once per payment request and is immutable
//! afterwards. The verifier re-validates it on every call since it usually
//! round-trips through the caller's own storage.

use crate::amount;
use crate::error::{Error, ErrorCode, Result};
use crate::memo::MEMO_TYPE;
use crate::network::Network;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only challenge version this crate issues and accepts.
pub const CHALLENGE_VERSION: &str = "2";

/// What the payer must deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChallengeAsset {
    /// Native XRP, settled in drops.
    #[serde(rename = "XRP")]
    Xrp,
    /// Issued currency identified by code and issuing account.
    #[serde(rename = "IOU")]
    Iou {
        /// Currency code.
        currency: String,
        /// Issuing account.
        issuer: String,
    },
}

/// Memo binding carried inside a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeMemo {
    /// Always `x402`.
    pub format: String,
    /// Always equal to the challenge payment id.
    pub payment_id: String,
}

/// A payment challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Challenge schema version.
    pub version: String,
    /// Ledger the payment must settle on.
    pub network: Network,
    /// Canonical decimal amount.
    pub amount: String,
    /// Asset to deliver.
    pub asset: ChallengeAsset,
    /// Receiving account.
    pub destination: String,
    /// ISO-8601 UTC expiry (`…T…Z`).
    pub expires_at: String,
    /// Caller-chosen payment correlation id.
    pub payment_id: String,
    /// Memo binding.
    pub memo: ChallengeMemo,
}

/// Inputs for [`create_challenge`].
#[derive(Debug, Clone)]
pub struct ChallengeParams {
    /// Ledger the payment must settle on.
    pub network: Network,
    /// Decimal amount, canonicalized on creation.
    pub amount: String,
    /// Asset to deliver.
    pub asset: ChallengeAsset,
    /// Receiving account.
    pub destination: String,
    /// ISO-8601 UTC expiry.
    pub expires_at: String,
    /// Payment correlation id.
    pub payment_id: String,
}

impl Challenge {
    /// Parse a challenge from JSON.
    ///
    /// # Errors
    ///
    /// Returns `invalid_challenge` if the JSON does not describe a
    /// challenge, including an unsupported network.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| invalid_challenge(format!("malformed challenge: {e}")))
    }
}

fn invalid_challenge(message: impl Into<String>) -> Error {
    Error::verification(ErrorCode::InvalidChallenge, message)
}

/// Parse an ISO-8601 UTC instant with a literal `Z` suffix and a time part.
#[must_use]
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    if !value.ends_with('Z') || !value.contains('T') {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    // RFC 3339 insists on seconds; ISO-8601 does not.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

fn check_asset(asset: &ChallengeAsset) -> Result<()> {
    match asset {
        ChallengeAsset::Xrp => Ok(()),
        ChallengeAsset::Iou { currency, issuer } => {
            if currency.is_empty() {
                return Err(invalid_challenge("IOU currency is empty"));
            }
            if issuer.is_empty() {
                return Err(invalid_challenge("IOU issuer is empty"));
            }
            Ok(())
        }
    }
}

/// Build a canonical challenge.
///
/// The amount is normalized and the memo is bound to `params.payment_id`.
///
/// # Errors
///
/// Returns `invalid_amount` for a malformed amount and `invalid_challenge`
/// for any other invalid field.
pub fn create_challenge(params: ChallengeParams) -> Result<Challenge> {
    let amount = amount::normalize(&params.amount)?;

    if parse_expiry(&params.expires_at).is_none() {
        return Err(invalid_challenge(format!(
            "expiry {:?} is not an ISO-8601 UTC instant",
            params.expires_at
        )));
    }
    if params.destination.is_empty() {
        return Err(invalid_challenge("destination is empty"));
    }
    if params.payment_id.is_empty() {
        return Err(invalid_challenge("payment id is empty"));
    }
    check_asset(&params.asset)?;

    Ok(Challenge {
        version: CHALLENGE_VERSION.to_string(),
        network: params.network,
        amount,
        asset: params.asset,
        destination: params.destination,
        expires_at: params.expires_at,
        memo: ChallengeMemo {
            format: MEMO_TYPE.to_string(),
            payment_id: params.payment_id.clone(),
        },
        payment_id: params.payment_id,
    })
}

/// Validate a challenge and return its expiry instant.
///
/// # Errors
///
/// Returns `invalid_challenge` if any structural invariant is violated.
pub fn validate_challenge(challenge: &Challenge) -> Result<DateTime<Utc>> {
    if challenge.version != CHALLENGE_VERSION {
        return Err(invalid_challenge(format!(
            "unsupported challenge version {:?}",
            challenge.version
        )));
    }
    if !amount::is_canonical(&challenge.amount) {
        return Err(invalid_challenge(format!(
            "amount {:?} is not a canonical decimal",
            challenge.amount
        )));
    }
    if challenge.destination.is_empty() {
        return Err(invalid_challenge("destination is empty"));
    }
    if challenge.payment_id.is_empty() {
        return Err(invalid_challenge("payment id is empty"));
    }
    if challenge.memo.payment_id != challenge.payment_id {
        return Err(invalid_challenge("memo is bound to a different payment id"));
    }
    if challenge.memo.format != MEMO_TYPE {
        return Err(invalid_challenge(format!(
            "unsupported memo format {:?}",
            challenge.memo.format
        )));
    }
    check_asset(&challenge.asset)?;

    parse_expiry(&challenge.expires_at).ok_or_else(|| {
        invalid_challenge(format!(
            "expiry {:?} is not an ISO-8601 UTC instant",
            challenge.expires_at
        ))
    })
}
