//! Settlement verification for x402-xrpl.
//!
//! This module implements the verification strategy:
//! 1. Check the replay store for an already-registered receipt
//! 2. If unknown, fetch the transaction and check it against the challenge
//! 3. Register the payment id ↔ transaction pair on success
//!
//! # Architecture
//!
//! ```text
//! Receipt received
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ Check replay store  │
//! └─────────┬───────────┘
//!           │
//!    ┌──────┼──────────┐
//!    │      │          │
//!  SAME   UNKNOWN   CONFLICT
//!    │      │          │
//!    ▼      ▼          ▼
//! Accept  Fetch tx   replay_detected
//! (cached)  │
//!           ▼
//!    Check + register
//! ```

mod replay;
mod verifier;

pub use replay::{InMemoryReplayStore, Registration, ReplayStats, ReplayStore};
pub use verifier::{SettlementVerifier, VerifiedPayment};
