//! # x402-xrpl
//!
//! Server-side settlement verifier for x402 ("HTTP 402 Payment Required")
//! flows settled on the XRP Ledger.
//!
//! Given a previously issued [`Challenge`] and the `X-PAYMENT-RECEIPT`
//! header a client sends back, the [`SettlementVerifier`] decides whether
//! the referenced ledger transaction pays exactly what the challenge asked
//! for, to the right destination, bound to the right payment id, and that
//! the transaction has not already been used to settle a different payment.
//!
//! ## Verification pipeline
//!
//! ```text
//! challenge + receipt header
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ Validate challenge  │── invalid_challenge / expired_challenge
//! │ Decode receipt      │── invalid_receipt / network_mismatch
//! └─────────┬───────────┘
//!           │
//!    ┌──────┴──────┐
//!    │ Replay store │
//!    └──────┬──────┘
//!   SAME PAIR │ UNKNOWN        CONFLICT ── replay_detected
//!     │       │
//!     ▼       ▼
//! idempotent  fetch tx ── tx_not_found / tx_not_validated
//!  success    │
//!             ▼
//!        destination, safe mode, amount, memo checks
//!             │
//!             ▼
//!        register pair ── success
//! ```
//!
//! Amounts are compared as canonical decimal strings, never as floats.

pub mod amount;
pub mod challenge;
pub mod config;
pub mod error;
pub mod ledger;
pub mod memo;
pub mod network;
pub mod payment;
pub mod receipt;

pub use challenge::{
    create_challenge, validate_challenge, Challenge, ChallengeAsset, ChallengeParams,
};
pub use config::VerifierConfig;
pub use error::{Error, ErrorCode, Result};
pub use ledger::{LedgerAmount, LedgerClient, LedgerPaymentRecord, XrplRpcClient};
pub use memo::LedgerMemo;
pub use network::Network;
pub use payment::{
    InMemoryReplayStore, Registration, ReplayStats, ReplayStore, SettlementVerifier,
    VerifiedPayment,
};
pub use receipt::{decode_receipt_header, encode_receipt_header, Receipt, RECEIPT_HEADER};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
