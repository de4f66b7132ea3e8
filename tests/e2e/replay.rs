//! Idempotency and replay scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::Fixture;
use futures::future::join_all;
use x402_xrpl::{ChallengeAsset, ErrorCode, ReplayStore};

/// Repeat verification is a cache hit and never touches the ledger.
#[tokio::test]
async fn test_repeat_verification_is_idempotent() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-1", "2.5", ChallengeAsset::Xrp);
    let header = Fixture::header("pay-1", "TX1");
    fixture
        .ledger
        .insert("TX1", Fixture::payment("pay-1", Fixture::drops("2500000")));

    let first = fixture
        .verifier
        .verify_at(&challenge, &header, Fixture::now())
        .await
        .expect("first");
    assert!(!first.idempotent);

    // The ledger collaborator going away must not matter any more.
    fixture.ledger.clear();

    for _ in 0..3 {
        let again = fixture
            .verifier
            .verify_at(&challenge, &header, Fixture::now())
            .await
            .expect("again");
        assert!(again.idempotent);
        assert_eq!(again.receipt, first.receipt);
    }
    assert_eq!(fixture.ledger.fetches(), 1);
}

/// A second transaction for a settled payment id is a replay.
#[tokio::test]
async fn test_second_transaction_is_replay() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-1", "2.5", ChallengeAsset::Xrp);
    fixture
        .ledger
        .insert("TX1", Fixture::payment("pay-1", Fixture::drops("2500000")));
    fixture
        .ledger
        .insert("TX2", Fixture::payment("pay-1", Fixture::drops("2500000")));

    fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-1", "TX1"), Fixture::now())
        .await
        .expect("first");

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-1", "TX2"), Fixture::now())
        .await
        .expect_err("replay");
    assert_eq!(err.code(), Some(ErrorCode::ReplayDetected));
    assert_eq!(fixture.ledger.fetches(), 1);
}

/// One transaction cannot settle two payment ids.
#[tokio::test]
async fn test_transaction_reuse_is_replay() {
    let fixture = Fixture::new();
    fixture
        .ledger
        .insert("TX1", Fixture::payment("pay-1", Fixture::drops("2500000")));

    fixture
        .verifier
        .verify_at(
            &Fixture::challenge("pay-1", "2.5", ChallengeAsset::Xrp),
            &Fixture::header("pay-1", "TX1"),
            Fixture::now(),
        )
        .await
        .expect("first");

    let err = fixture
        .verifier
        .verify_at(
            &Fixture::challenge("pay-2", "2.5", ChallengeAsset::Xrp),
            &Fixture::header("pay-2", "TX1"),
            Fixture::now(),
        )
        .await
        .expect_err("replay");
    assert_eq!(err.code(), Some(ErrorCode::ReplayDetected));
    assert_eq!(fixture.replay.lookup_tx_hash("pay-2"), None);
}

/// Concurrent submissions of one receipt: one registers, the rest are idempotent.
#[tokio::test]
async fn test_concurrent_duplicate_receipts() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-1", "2.5", ChallengeAsset::Xrp);
    let header = Fixture::header("pay-1", "TX1");
    fixture
        .ledger
        .insert("TX1", Fixture::payment("pay-1", Fixture::drops("2500000")));

    let results = join_all(
        (0..8).map(|_| fixture.verifier.verify_at(&challenge, &header, Fixture::now())),
    )
    .await;

    let verified: Vec<_> = results.into_iter().map(|r| r.expect("verified")).collect();
    assert_eq!(verified.iter().filter(|v| !v.idempotent).count(), 1);
    assert_eq!(fixture.replay.len(), 1);
}

/// Concurrent conflicting transactions for one payment id: exactly one wins.
#[tokio::test]
async fn test_concurrent_conflicting_receipts() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-1", "2.5", ChallengeAsset::Xrp);
    let headers: Vec<_> = (0..6).map(|i| Fixture::header("pay-1", &format!("TX{i}"))).collect();
    for i in 0..6 {
        fixture.ledger.insert(
            &format!("TX{i}"),
            Fixture::payment("pay-1", Fixture::drops("2500000")),
        );
    }

    let results = join_all(
        headers
            .iter()
            .map(|header| fixture.verifier.verify_at(&challenge, header, Fixture::now())),
    )
    .await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let replays = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .err()
                .and_then(x402_xrpl::Error::code)
                == Some(ErrorCode::ReplayDetected)
        })
        .count();
    assert_eq!(winners, 1);
    assert_eq!(replays, 5);
    assert_eq!(fixture.replay.len(), 1);
}
