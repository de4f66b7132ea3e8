//! End-to-end settlement scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::Fixture;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use x402_xrpl::{ChallengeAsset, ErrorCode, LedgerAmount};

fn rlusd() -> ChallengeAsset {
    ChallengeAsset::Iou {
        currency: "RLUSD".to_string(),
        issuer: "rISSUER".to_string(),
    }
}

/// XRP challenge for 2.5 settled with 2,500,000 drops.
#[tokio::test]
async fn test_xrp_payment_settles() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-xrp", "2.5", ChallengeAsset::Xrp);
    fixture
        .ledger
        .insert("TXXRP", Fixture::payment("pay-xrp", Fixture::drops("2500000")));

    let verified = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-xrp", "TXXRP"), Fixture::now())
        .await
        .expect("verified");

    assert!(!verified.idempotent);
    assert_eq!(verified.receipt.tx_hash, "TXXRP");
    assert_eq!(verified.receipt.payment_id, "pay-xrp");
    assert_eq!(verified.payer_account.as_deref(), Some("rPAYER"));
}

/// Issued-currency challenge settled with the identical value.
#[tokio::test]
async fn test_iou_payment_settles() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-iou", "10.25", rlusd());
    fixture.ledger.insert(
        "TXIOU",
        Fixture::payment(
            "pay-iou",
            LedgerAmount::Issued {
                currency: "RLUSD".to_string(),
                issuer: "rISSUER".to_string(),
                value: "10.25".to_string(),
            },
        ),
    );

    let verified = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-iou", "TXIOU"), Fixture::now())
        .await
        .expect("verified");
    assert!(!verified.idempotent);
}

/// Issued values are compared literally, without numeric coercion.
#[tokio::test]
async fn test_iou_value_compared_literally() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-iou", "10.25", rlusd());
    fixture.ledger.insert(
        "TXIOU",
        Fixture::payment(
            "pay-iou",
            LedgerAmount::Issued {
                currency: "RLUSD".to_string(),
                issuer: "rISSUER".to_string(),
                value: "10.250".to_string(),
            },
        ),
    );

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-iou", "TXIOU"), Fixture::now())
        .await
        .expect_err("literal mismatch");
    assert_eq!(err.code(), Some(ErrorCode::InvalidAmount));
}

/// An IOU from a different issuer is the wrong asset, not the wrong amount.
#[tokio::test]
async fn test_iou_wrong_issuer() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-iou", "10.25", rlusd());
    fixture.ledger.insert(
        "TXIOU",
        Fixture::payment(
            "pay-iou",
            LedgerAmount::Issued {
                currency: "RLUSD".to_string(),
                issuer: "rFAKE".to_string(),
                value: "10.25".to_string(),
            },
        ),
    );

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-iou", "TXIOU"), Fixture::now())
        .await
        .expect_err("wrong issuer");
    assert_eq!(err.code(), Some(ErrorCode::InvalidAsset));
}

/// An IOU challenge paid in native XRP is the wrong asset.
#[tokio::test]
async fn test_iou_challenge_paid_in_xrp() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-iou", "10.25", rlusd());
    fixture
        .ledger
        .insert("TXIOU", Fixture::payment("pay-iou", Fixture::drops("10250000")));

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-iou", "TXIOU"), Fixture::now())
        .await
        .expect_err("wrong asset");
    assert_eq!(err.code(), Some(ErrorCode::InvalidAsset));
}

/// The ledger does not know the transaction.
#[tokio::test]
async fn test_unknown_transaction() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-xrp", "2.5", ChallengeAsset::Xrp);

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-xrp", "TXMISSING"), Fixture::now())
        .await
        .expect_err("not found");
    assert_eq!(err.code(), Some(ErrorCode::TxNotFound));
    assert!(fixture.replay.is_empty());
}

/// A receipt header that is not base64.
#[tokio::test]
async fn test_malformed_receipt() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-xrp", "2.5", ChallengeAsset::Xrp);

    let err = fixture
        .verifier
        .verify_at(&challenge, "***not base64***", Fixture::now())
        .await
        .expect_err("malformed");
    assert_eq!(err.code(), Some(ErrorCode::InvalidReceipt));

    let not_json = BASE64.encode("{network: xrpl:testnet}");
    let err = fixture
        .verifier
        .verify_at(&challenge, &not_json, Fixture::now())
        .await
        .expect_err("malformed");
    assert_eq!(err.code(), Some(ErrorCode::InvalidReceipt));
    assert_eq!(fixture.ledger.fetches(), 0);
}

/// Partial payments and path features are refused even when all else matches.
#[tokio::test]
async fn test_safe_mode_rejections() {
    let challenge = Fixture::challenge("pay-xrp", "2.5", ChallengeAsset::Xrp);
    let base = Fixture::payment("pay-xrp", Fixture::drops("2500000"));

    let mut partial = base.clone();
    partial.flags = Some(0x0002_0000);
    let mut paths = base.clone();
    paths.paths = Some(serde_json::json!([[{ "currency": "USD" }]]));
    let mut send_max = base.clone();
    send_max.send_max = Some(serde_json::json!("3000000"));
    let mut deliver_min = base;
    deliver_min.deliver_min = Some(serde_json::json!("2000000"));

    for record in [partial, paths, send_max, deliver_min] {
        let fixture = Fixture::new();
        fixture.ledger.insert("TXXRP", record);
        let err = fixture
            .verifier
            .verify_at(&challenge, &Fixture::header("pay-xrp", "TXXRP"), Fixture::now())
            .await
            .expect_err("safe mode");
        assert_eq!(err.code(), Some(ErrorCode::InvalidAsset));
        assert!(fixture.replay.is_empty());
    }
}

/// A memo bound to another payment id does not settle this one.
#[tokio::test]
async fn test_memo_bound_to_other_payment() {
    let fixture = Fixture::new();
    let challenge = Fixture::challenge("pay-xrp", "2.5", ChallengeAsset::Xrp);
    let mut record = Fixture::payment("pay-xrp", Fixture::drops("2500000"));
    record.memos = Fixture::payment("pay-other", Fixture::drops("2500000")).memos;
    fixture.ledger.insert("TXXRP", record);

    let err = fixture
        .verifier
        .verify_at(&challenge, &Fixture::header("pay-xrp", "TXXRP"), Fixture::now())
        .await
        .expect_err("memo");
    assert_eq!(err.code(), Some(ErrorCode::InvalidMemo));
}

/// Verification through the wall-clock entry point.
#[tokio::test]
async fn test_verify_uses_current_time() {
    let fixture = Fixture::new();
    let mut challenge = Fixture::challenge("pay-old", "1", ChallengeAsset::Xrp);
    challenge.expires_at = "2000-01-01T00:00:00Z".to_string();

    let err = fixture
        .verifier
        .verify(&challenge, &Fixture::header("pay-old", "TXOLD"))
        .await
        .expect_err("expired");
    assert_eq!(err.code(), Some(ErrorCode::ExpiredChallenge));
}
