//! End-to-end settlement scenarios for x402-xrpl.
//!
//! Each scenario drives [`x402_xrpl::SettlementVerifier`] through its public
//! API with a scripted in-process ledger.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test e2e
//! ```

mod harness;
mod integration_tests;
mod replay;

pub use harness::{Fixture, ScriptedLedger};
