//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use x402_xrpl::{Network, VerifierConfig};

/// Issue x402 challenges and verify XRP Ledger settlement receipts.
#[derive(Parser, Debug)]
#[command(name = "x402-xrpl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (overrides the configured level).
    #[arg(long, global = true, env = "RUST_LOG")]
    pub log_level: Option<String>,

    /// Path to configuration file.
    #[arg(long, short, global = true, env = "X402_XRPL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a payment challenge and print it as JSON.
    Challenge(ChallengeArgs),

    /// Print the ledger memo that binds a transaction to a payment id.
    Memo {
        /// Payment id to bind.
        #[arg(long)]
        payment_id: String,

        /// Optional session id carried in the memo.
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Print the receipt header value for a submitted transaction.
    Receipt {
        /// Network the transaction was submitted to.
        #[arg(long, value_parser = parse_network)]
        network: Network,

        /// Transaction hash.
        #[arg(long)]
        tx_hash: String,

        /// Payment id the transaction settles.
        #[arg(long)]
        payment_id: String,
    },

    /// Verify a receipt header against a challenge file.
    Verify {
        /// Path to the challenge JSON.
        #[arg(long)]
        challenge: PathBuf,

        /// Receipt header value.
        #[arg(long, env = "X402_PAYMENT_RECEIPT")]
        receipt: String,
    },
}

/// Arguments for `challenge`.
#[derive(Args, Debug)]
pub struct ChallengeArgs {
    /// Network the payment must settle on.
    #[arg(long, value_parser = parse_network)]
    pub network: Network,

    /// Decimal amount.
    #[arg(long)]
    pub amount: String,

    /// Receiving account.
    #[arg(long)]
    pub destination: String,

    /// Payment id.
    #[arg(long)]
    pub payment_id: String,

    /// Issued currency code (omit for XRP).
    #[arg(long, requires = "issuer")]
    pub currency: Option<String>,

    /// Issued currency issuer (omit for XRP).
    #[arg(long, requires = "currency")]
    pub issuer: Option<String>,

    /// Challenge lifetime in seconds (defaults to the configured value).
    #[arg(long)]
    pub ttl_secs: Option<u64>,
}

fn parse_network(raw: &str) -> Result<Network, String> {
    raw.parse::<Network>().map_err(|e| e.to_string())
}

impl Cli {
    /// Load the configuration file, if any, and apply CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn load_config(&self) -> color_eyre::Result<VerifierConfig> {
        let mut config = match self.config {
            Some(ref path) => VerifierConfig::from_file(path)?,
            None => {
                let path = VerifierConfig::default_path();
                if path.exists() {
                    VerifierConfig::from_file(&path)?
                } else {
                    VerifierConfig::default()
                }
            }
        };

        // Override with CLI arguments
        if let Some(ref log_level) = self.log_level {
            config.log_level.clone_from(log_level);
        }
        Ok(config)
    }
}
