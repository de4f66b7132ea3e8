//! Replay protection through a payment id ↔ transaction hash bijection.
//!
//! Each payment id settles with at most one transaction, and each
//! transaction settles at most one payment id. Entries are never evicted:
//! forgetting a pair would let its transaction be spent again.

use crate::error::{Error, ErrorCode, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a successful [`ReplayStore::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The pair was new and is now recorded.
    Inserted,
    /// The identical pair was already recorded.
    AlreadyRegistered,
}

/// Store backing the replay bijection.
///
/// Implementations must make [`register`](Self::register) atomic with
/// respect to both directions of the mapping, across concurrent callers.
pub trait ReplayStore: Send + Sync {
    /// Transaction hash bound to `payment_id`, if any.
    fn lookup_tx_hash(&self, payment_id: &str) -> Option<String>;

    /// Payment id bound to `tx_hash`, if any.
    fn lookup_payment_id(&self, tx_hash: &str) -> Option<String>;

    /// Bind `payment_id` and `tx_hash` to each other.
    ///
    /// # Errors
    ///
    /// Returns `replay_detected` if either side is already bound to a
    /// different counterpart.
    fn register(&self, payment_id: &str, tx_hash: &str) -> Result<Registration>;
}

/// Replay store statistics for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of lookups in either direction.
    pub lookups: u64,
    /// Lookups that found an entry.
    pub hits: u64,
    /// Pairs inserted.
    pub registrations: u64,
    /// Registrations refused as replays.
    pub conflicts: u64,
}

#[derive(Default)]
struct Bijection {
    tx_by_payment: HashMap<String, String>,
    payment_by_tx: HashMap<String, String>,
}

/// In-process replay store.
///
/// Suitable for a single verifier instance. Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryReplayStore {
    inner: Arc<Mutex<Bijection>>,
    stats: Arc<Mutex<ReplayStats>>,
}

impl InMemoryReplayStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().tx_by_payment.len()
    }

    /// Check if no pair is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().tx_by_payment.is_empty()
    }

    /// Get current statistics.
    #[must_use]
    pub fn stats(&self) -> ReplayStats {
        self.stats.lock().clone()
    }

    fn record_lookup(&self, found: bool) {
        let mut stats = self.stats.lock();
        stats.lookups += 1;
        if found {
            stats.hits += 1;
        }
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn lookup_tx_hash(&self, payment_id: &str) -> Option<String> {
        let found = self.inner.lock().tx_by_payment.get(payment_id).cloned();
        self.record_lookup(found.is_some());
        found
    }

    fn lookup_payment_id(&self, tx_hash: &str) -> Option<String> {
        let found = self.inner.lock().payment_by_tx.get(tx_hash).cloned();
        self.record_lookup(found.is_some());
        found
    }

    fn register(&self, payment_id: &str, tx_hash: &str) -> Result<Registration> {
        let mut map = self.inner.lock();

        let bound_tx = map.tx_by_payment.get(payment_id);
        let bound_payment = map.payment_by_tx.get(tx_hash);

        let outcome = match (bound_tx, bound_payment) {
            (None, None) => Ok(Registration::Inserted),
            (Some(tx), Some(payment)) if tx == tx_hash && payment == payment_id => {
                Ok(Registration::AlreadyRegistered)
            }
            (Some(tx), _) if tx != tx_hash => Err(Error::verification(
                ErrorCode::ReplayDetected,
                format!("payment {payment_id} is already settled by another transaction"),
            )),
            _ => Err(Error::verification(
                ErrorCode::ReplayDetected,
                format!("transaction {tx_hash} already settled another payment"),
            )),
        };

        match outcome {
            Ok(Registration::Inserted) => {
                map.tx_by_payment
                    .insert(payment_id.to_string(), tx_hash.to_string());
                map.payment_by_tx
                    .insert(tx_hash.to_string(), payment_id.to_string());
                drop(map);
                self.stats.lock().registrations += 1;
            }
            Err(_) => {
                drop(map);
                self.stats.lock().conflicts += 1;
            }
            Ok(Registration::AlreadyRegistered) => {}
        }

        outcome
    }
}
