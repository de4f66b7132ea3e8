//! Error types for x402-xrpl.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Wire-level failure codes reported by settlement verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The challenge is structurally invalid.
    InvalidChallenge,
    /// The receipt header is malformed or inconsistent with the challenge.
    InvalidReceipt,
    /// The receipt names a different network than the challenge.
    NetworkMismatch,
    /// The challenge expired before verification.
    ExpiredChallenge,
    /// The amount is malformed or does not match exactly.
    InvalidAmount,
    /// The asset shape is wrong or a forbidden payment feature is used.
    InvalidAsset,
    /// The payment went somewhere other than the challenge destination.
    InvalidDestination,
    /// No memo binds the transaction to the payment id.
    InvalidMemo,
    /// The payment id or transaction hash is already bound elsewhere.
    ReplayDetected,
    /// The transaction is not a validated `Payment`.
    TxNotValidated,
    /// The ledger does not know the transaction.
    TxNotFound,
}

impl ErrorCode {
    /// The literal wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidChallenge => "invalid_challenge",
            Self::InvalidReceipt => "invalid_receipt",
            Self::NetworkMismatch => "network_mismatch",
            Self::ExpiredChallenge => "expired_challenge",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidAsset => "invalid_asset",
            Self::InvalidDestination => "invalid_destination",
            Self::InvalidMemo => "invalid_memo",
            Self::ReplayDetected => "replay_detected",
            Self::TxNotValidated => "tx_not_validated",
            Self::TxNotFound => "tx_not_found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for x402-xrpl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Verification failed with a wire-level code.
    #[error("{code}: {message}")]
    Verification {
        /// Failure code.
        code: ErrorCode,
        /// Human-readable detail.
        message: String,
    },

    /// The ledger collaborator failed (transport, timeout, RPC fault).
    #[error("Ledger query error: {0}")]
    Ledger(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a verification failure.
    pub fn verification(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Verification {
            code,
            message: message.into(),
        }
    }

    /// The wire code, if this is a verification failure.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Verification { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
