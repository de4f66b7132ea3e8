//! x402-xrpl CLI entry point.

mod cli;

use chrono::{Duration, SecondsFormat, Utc};
use clap::Parser;
use cli::{ChallengeArgs, Cli, Command};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use x402_xrpl::memo::{encode_memo, MemoEnvelope};
use x402_xrpl::{
    create_challenge, encode_receipt_header, Challenge, ChallengeAsset, ChallengeParams,
    InMemoryReplayStore, Receipt, SettlementVerifier, VerifiedPayment, VerifierConfig,
    XrplRpcClient,
};

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialize tracing on stderr; stdout carries command output.
    // `config.log_level` already folds in `--log-level` and `RUST_LOG`.
    let filter = EnvFilter::new(&config.log_level);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("x402-xrpl v{}", x402_xrpl::VERSION);

    match cli.command {
        Command::Challenge(args) => print_challenge(&config, args)?,
        Command::Memo {
            payment_id,
            session_id,
        } => {
            let memo = encode_memo(&payment_id, session_id.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&MemoEnvelope { memo })?);
        }
        Command::Receipt {
            network,
            tx_hash,
            payment_id,
        } => {
            let header = encode_receipt_header(&Receipt {
                network,
                tx_hash,
                payment_id,
            })?;
            println!("{header}");
        }
        Command::Verify { challenge, receipt } => {
            let challenge = Challenge::from_json(&std::fs::read_to_string(challenge)?)?;
            let ledger = XrplRpcClient::new(&config.ledger)?;
            let verifier =
                SettlementVerifier::new(Arc::new(ledger), Arc::new(InMemoryReplayStore::new()));

            if !report_verification(verifier.verify(&challenge, &receipt).await)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a verification outcome and return whether it succeeded.
///
/// Failures without a wire code are propagated as errors.
fn report_verification(result: x402_xrpl::Result<VerifiedPayment>) -> color_eyre::Result<bool> {
    match result {
        Ok(verified) => {
            println!("{}", serde_json::to_string_pretty(&verified)?);
            Ok(true)
        }
        Err(e) => match e.code() {
            Some(code) => {
                eprintln!("{e}");
                println!("{}", serde_json::json!({ "ok": false, "code": code }));
                Ok(false)
            }
            None => Err(e.into()),
        },
    }
}

fn print_challenge(config: &VerifierConfig, args: ChallengeArgs) -> color_eyre::Result<()> {
    let ttl = args.ttl_secs.unwrap_or(config.challenge.ttl_secs);
    let expires_at = i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| color_eyre::eyre::eyre!("challenge ttl of {ttl}s is out of range"))?;

    let asset = match (args.currency, args.issuer) {
        (Some(currency), Some(issuer)) => ChallengeAsset::Iou { currency, issuer },
        _ => ChallengeAsset::Xrp,
    };

    let challenge = create_challenge(ChallengeParams {
        network: args.network,
        amount: args.amount,
        asset,
        destination: args.destination,
        expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        payment_id: args.payment_id,
    })?;

    println!("{}", serde_json::to_string_pretty(&challenge)?);
    Ok(())
}
