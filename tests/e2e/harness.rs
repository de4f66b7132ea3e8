//! Test harness: a scripted ledger and challenge/transaction fixtures.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use x402_xrpl::memo::encode_memo;
use x402_xrpl::{
    create_challenge, encode_receipt_header, Challenge, ChallengeAsset, ChallengeParams,
    InMemoryReplayStore, LedgerAmount, LedgerClient, LedgerPaymentRecord, Network, Receipt,
    Result, SettlementVerifier,
};

/// Ledger client answering from a fixed table and counting queries.
#[derive(Default)]
pub struct ScriptedLedger {
    records: Mutex<HashMap<String, LedgerPaymentRecord>>,
    fetches: AtomicUsize,
}

impl ScriptedLedger {
    /// Make `record` available under `tx_hash`.
    pub fn insert(&self, tx_hash: &str, record: LedgerPaymentRecord) {
        self.records.lock().insert(tx_hash.to_string(), record);
    }

    /// Forget every transaction.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Number of fetches served so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn fetch(&self, _network: Network, tx_hash: &str) -> Result<Option<LedgerPaymentRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent verifications interleave at the I/O point.
        tokio::task::yield_now().await;
        Ok(self.records.lock().get(tx_hash).cloned())
    }
}

/// A verifier wired to a scripted ledger and an in-memory replay store.
pub struct Fixture {
    /// The verifier under test.
    pub verifier: Arc<SettlementVerifier>,
    /// Scripted ledger behind the verifier.
    pub ledger: Arc<ScriptedLedger>,
    /// Replay store behind the verifier.
    pub replay: InMemoryReplayStore,
}

impl Fixture {
    /// Create a fixture with an empty ledger.
    pub fn new() -> Self {
        let ledger = Arc::new(ScriptedLedger::default());
        let replay = InMemoryReplayStore::new();
        let verifier = Arc::new(SettlementVerifier::new(
            ledger.clone(),
            Arc::new(replay.clone()),
        ));
        Self {
            verifier,
            ledger,
            replay,
        }
    }

    /// Fixed verification instant, before every fixture challenge expires.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).single().expect("instant")
    }

    /// Build a testnet challenge for `payment_id`.
    pub fn challenge(payment_id: &str, amount: &str, asset: ChallengeAsset) -> Challenge {
        create_challenge(ChallengeParams {
            network: Network::Testnet,
            amount: amount.to_string(),
            asset,
            destination: "rMERCHANT".to_string(),
            expires_at: "2030-06-01T12:05:00Z".to_string(),
            payment_id: payment_id.to_string(),
        })
        .expect("challenge")
    }

    /// Build the receipt header for `tx_hash` settling `payment_id`.
    pub fn header(payment_id: &str, tx_hash: &str) -> String {
        encode_receipt_header(&Receipt {
            network: Network::Testnet,
            tx_hash: tx_hash.to_string(),
            payment_id: payment_id.to_string(),
        })
        .expect("header")
    }

    /// A validated payment to the fixture merchant bound to `payment_id`.
    pub fn payment(payment_id: &str, amount: LedgerAmount) -> LedgerPaymentRecord {
        LedgerPaymentRecord {
            validated: true,
            transaction_type: "Payment".to_string(),
            account: Some("rPAYER".to_string()),
            destination: Some("rMERCHANT".to_string()),
            amount: Some(amount),
            flags: Some(0x8000_0000),
            memos: Some(vec![encode_memo(payment_id, Some("session-1")).expect("memo")]),
            ..Default::default()
        }
    }

    /// XRP amount in drops.
    pub fn drops(drops: &str) -> LedgerAmount {
        LedgerAmount::Drops(drops.to_string())
    }
}
