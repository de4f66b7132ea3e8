//! Settlement verifier combining receipt decoding, ledger lookup and the
//! replay store.
//!
//! This is the core decision logic of x402-xrpl.

use crate::amount;
use crate::challenge::{validate_challenge, Challenge, ChallengeAsset};
use crate::error::{Error, ErrorCode, Result};
use crate::ledger::{LedgerAmount, LedgerClient, LedgerPaymentRecord};
use crate::memo;
use crate::payment::replay::{Registration, ReplayStore};
use crate::receipt::{decode_receipt_header, Receipt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Transaction type accepted as a settlement.
const PAYMENT_TRANSACTION: &str = "Payment";

/// A verified settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    /// True when the pair was already registered and the ledger was not
    /// consulted.
    pub idempotent: bool,
    /// The decoded receipt.
    pub receipt: Receipt,
    /// Paying account, known only when the transaction was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_account: Option<String>,
}

/// Verifies x402 settlement receipts against the XRP Ledger.
///
/// Combines:
/// 1. Structural checks on the challenge and receipt
/// 2. A replay store holding the payment id ↔ transaction bijection
/// 3. A ledger client for transactions not seen before
pub struct SettlementVerifier {
    ledger: Arc<dyn LedgerClient>,
    replay: Arc<dyn ReplayStore>,
}

impl SettlementVerifier {
    /// Create a verifier over the given collaborators.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, replay: Arc<dyn ReplayStore>) -> Self {
        Self { ledger, replay }
    }

    /// Verify a receipt header against `challenge` at the current time.
    ///
    /// # Errors
    ///
    /// See [`verify_at`](Self::verify_at).
    pub async fn verify(
        &self,
        challenge: &Challenge,
        receipt_header: &str,
    ) -> Result<VerifiedPayment> {
        self.verify_at(challenge, receipt_header, Utc::now()).await
    }

    /// Verify a receipt header against `challenge` as of `now`.
    ///
    /// Nothing is written to the replay store unless every check passes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Verification`] with the failing check's code, or
    /// [`Error::Ledger`] if the ledger client fails.
    pub async fn verify_at(
        &self,
        challenge: &Challenge,
        receipt_header: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedPayment> {
        let expires_at = validate_challenge(challenge).map_err(|e| {
            debug!("Rejecting challenge {}: {e}", challenge.payment_id);
            e
        })?;
        if now > expires_at {
            return Err(Error::verification(
                ErrorCode::ExpiredChallenge,
                format!("challenge expired at {}", challenge.expires_at),
            ));
        }

        let receipt = decode_receipt_header(receipt_header)?;
        if receipt.network != challenge.network {
            return Err(Error::verification(
                ErrorCode::NetworkMismatch,
                format!(
                    "receipt is for {} but challenge is for {}",
                    receipt.network, challenge.network
                ),
            ));
        }
        if receipt.payment_id != challenge.payment_id {
            return Err(Error::verification(
                ErrorCode::InvalidReceipt,
                "receipt names a different payment id",
            ));
        }

        if self.check_replay(&receipt)? {
            info!(
                "Payment {} already settled by {} - idempotent hit",
                receipt.payment_id, receipt.tx_hash
            );
            return Ok(VerifiedPayment {
                idempotent: true,
                receipt,
                payer_account: None,
            });
        }

        let record = self
            .ledger
            .fetch(receipt.network, &receipt.tx_hash)
            .await?
            .ok_or_else(|| {
                debug!("Transaction {} not found on {}", receipt.tx_hash, receipt.network);
                Error::verification(
                    ErrorCode::TxNotFound,
                    format!("transaction {} not found", receipt.tx_hash),
                )
            })?;

        let payer = check_record(challenge, &record)?;

        let registration = self
            .replay
            .register(&receipt.payment_id, &receipt.tx_hash)
            .map_err(|e| {
                warn!(
                    "Lost registration race for payment {} with {}",
                    receipt.payment_id, receipt.tx_hash
                );
                e
            })?;

        match registration {
            Registration::Inserted => {
                info!(
                    "Payment {} settled by {} from {payer}",
                    receipt.payment_id, receipt.tx_hash
                );
                Ok(VerifiedPayment {
                    idempotent: false,
                    receipt,
                    payer_account: Some(payer),
                })
            }
            Registration::AlreadyRegistered => {
                debug!(
                    "Payment {} was registered concurrently - idempotent",
                    receipt.payment_id
                );
                Ok(VerifiedPayment {
                    idempotent: true,
                    receipt,
                    payer_account: None,
                })
            }
        }
    }

    /// Consult the replay store in both directions.
    ///
    /// Returns `true` when the exact pair is already registered.
    fn check_replay(&self, receipt: &Receipt) -> Result<bool> {
        let bound_tx = self.replay.lookup_tx_hash(&receipt.payment_id);
        let bound_payment = self.replay.lookup_payment_id(&receipt.tx_hash);

        if bound_tx.as_deref().is_some_and(|tx| tx != receipt.tx_hash) {
            warn!(
                "Replay: payment {} already settled by another transaction",
                receipt.payment_id
            );
            return Err(Error::verification(
                ErrorCode::ReplayDetected,
                format!("payment {} is already settled", receipt.payment_id),
            ));
        }
        if bound_payment
            .as_deref()
            .is_some_and(|payment| payment != receipt.payment_id)
        {
            warn!(
                "Replay: transaction {} already settled another payment",
                receipt.tx_hash
            );
            return Err(Error::verification(
                ErrorCode::ReplayDetected,
                format!("transaction {} is already used", receipt.tx_hash),
            ));
        }

        Ok(bound_tx.is_some() && bound_payment.is_some())
    }
}

/// Run the ledger-side checks and return the payer account.
fn check_record(challenge: &Challenge, record: &LedgerPaymentRecord) -> Result<String> {
    if !record.validated || record.transaction_type != PAYMENT_TRANSACTION {
        return Err(Error::verification(
            ErrorCode::TxNotValidated,
            format!(
                "transaction is not a validated payment (type {:?}, validated {})",
                record.transaction_type, record.validated
            ),
        ));
    }

    let payer = match record.account.as_deref() {
        Some(account) if !account.is_empty() => account.to_string(),
        _ => {
            return Err(Error::verification(
                ErrorCode::InvalidReceipt,
                "transaction has no paying account",
            ))
        }
    };

    if record.destination.as_deref() != Some(challenge.destination.as_str()) {
        return Err(Error::verification(
            ErrorCode::InvalidDestination,
            format!("payment is not addressed to {}", challenge.destination),
        ));
    }
    if record.destination_tag.is_some() {
        return Err(Error::verification(
            ErrorCode::InvalidDestination,
            "destination tags are not accepted",
        ));
    }

    if record.is_partial_payment() {
        return Err(Error::verification(
            ErrorCode::InvalidAsset,
            "partial payments are not accepted",
        ));
    }
    if record.uses_path_features() {
        return Err(Error::verification(
            ErrorCode::InvalidAsset,
            "path payments are not accepted",
        ));
    }

    check_amount(challenge, record.amount.as_ref())?;
    memo::match_memo(record.memos.as_deref(), &challenge.payment_id)?;

    Ok(payer)
}

/// Reconcile the delivered amount with the challenge asset and amount.
fn check_amount(challenge: &Challenge, delivered: Option<&LedgerAmount>) -> Result<()> {
    let mismatch = || {
        Error::verification(
            ErrorCode::InvalidAmount,
            format!("delivered amount does not equal {}", challenge.amount),
        )
    };

    match (&challenge.asset, delivered) {
        (ChallengeAsset::Xrp, Some(LedgerAmount::Drops(drops))) => {
            let expected = amount::xrp_to_drops(&challenge.amount)?;
            if amount::canonical_drops(drops)? == expected {
                Ok(())
            } else {
                Err(mismatch())
            }
        }
        (
            ChallengeAsset::Iou { currency, issuer },
            Some(LedgerAmount::Issued {
                currency: paid_currency,
                issuer: paid_issuer,
                value,
            }),
        ) => {
            if paid_currency != currency || paid_issuer != issuer {
                return Err(Error::verification(
                    ErrorCode::InvalidAsset,
                    format!("payment is not in {currency} issued by {issuer}"),
                ));
            }
            if *value == challenge.amount {
                Ok(())
            } else {
                Err(mismatch())
            }
        }
        (ChallengeAsset::Xrp, _) => Err(Error::verification(
            ErrorCode::InvalidAsset,
            "expected an XRP payment",
        )),
        (ChallengeAsset::Iou { .. }, _) => Err(Error::verification(
            ErrorCode::InvalidAsset,
            "expected an issued currency payment",
        )),
    }
}
