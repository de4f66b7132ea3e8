//! Ledger query collaborator.
//!
//! The verifier only needs one capability from the ledger: turn a
//! transaction hash into the fields of a `Payment` transaction. The
//! [`LedgerClient`] trait is that seam; [`XrplRpcClient`] implements it
//! against a rippled JSON-RPC endpoint.

mod rpc;

use crate::error::Result;
use crate::memo::{LedgerMemo, MemoEnvelope};
use crate::network::Network;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub use rpc::{parse_tx_response, XrplRpcClient};

/// `tfPartialPayment` transaction flag.
pub const PARTIAL_PAYMENT_FLAG: u32 = 0x0002_0000;

/// A delivered amount as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerAmount {
    /// Native XRP as an integer drops string.
    Drops(String),
    /// Issued currency amount.
    Issued {
        /// Currency code.
        currency: String,
        /// Issuing account.
        issuer: String,
        /// Decimal value, verbatim from the ledger.
        value: String,
    },
    /// Any other amount shape, such as a multi-purpose token amount.
    Other(Value),
}

/// The fields of a ledger transaction the verifier inspects.
///
/// Field names follow rippled's transaction JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerPaymentRecord {
    /// Whether the transaction is in a validated ledger.
    #[serde(default)]
    pub validated: bool,
    /// Transaction type, `Payment` for payments.
    #[serde(rename = "TransactionType", default)]
    pub transaction_type: String,
    /// Sending account.
    #[serde(rename = "Account", default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Receiving account.
    #[serde(rename = "Destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Destination tag.
    #[serde(rename = "DestinationTag", default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    /// Amount to deliver.
    #[serde(rename = "Amount", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<LedgerAmount>,
    /// Transaction flags.
    #[serde(rename = "Flags", default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Attached memos, unwrapped from their `Memo` envelopes.
    #[serde(
        rename = "Memos",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_memos",
        deserialize_with = "deserialize_memos"
    )]
    pub memos: Option<Vec<LedgerMemo>>,
    /// Cross-currency spend limit.
    #[serde(rename = "SendMax", default, skip_serializing_if = "Option::is_none")]
    pub send_max: Option<Value>,
    /// Explicit payment paths.
    #[serde(rename = "Paths", default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Value>,
    /// Minimum delivery for partial payments.
    #[serde(rename = "DeliverMin", default, skip_serializing_if = "Option::is_none")]
    pub deliver_min: Option<Value>,
}

impl LedgerPaymentRecord {
    /// Check whether the partial-payment flag is set.
    #[must_use]
    pub fn is_partial_payment(&self) -> bool {
        self.flags.is_some_and(|flags| flags & PARTIAL_PAYMENT_FLAG != 0)
    }

    /// Check whether any path-payment field is present.
    #[must_use]
    pub fn uses_path_features(&self) -> bool {
        self.paths.is_some() || self.send_max.is_some() || self.deliver_min.is_some()
    }
}

fn serialize_memos<S: Serializer>(
    memos: &Option<Vec<LedgerMemo>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let envelopes: Option<Vec<MemoEnvelope>> = memos.as_ref().map(|memos| {
        memos
            .iter()
            .cloned()
            .map(|memo| MemoEnvelope { memo })
            .collect()
    });
    envelopes.serialize(serializer)
}

fn deserialize_memos<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Vec<LedgerMemo>>, D::Error> {
    let envelopes: Option<Vec<MemoEnvelope>> = Option::deserialize(deserializer)?;
    Ok(envelopes.map(|envelopes| envelopes.into_iter().map(|e| e.memo).collect()))
}

/// Source of ledger transactions.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the transaction `tx_hash` on `network`.
    ///
    /// Returns `Ok(None)` when the ledger does not know the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Ledger`] on transport or RPC failure.
    async fn fetch(&self, network: Network, tx_hash: &str) -> Result<Option<LedgerPaymentRecord>>;
}
