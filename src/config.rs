//! Configuration for x402-xrpl.

use crate::network::Network;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Ledger query configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Challenge issuing configuration.
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

/// Ledger JSON-RPC configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// JSON-RPC endpoint per network.
    #[serde(default)]
    pub endpoints: LedgerEndpoints,
}

/// JSON-RPC endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEndpoints {
    /// `xrpl:1` endpoint.
    #[serde(default = "default_mainnet_url")]
    pub mainnet: String,
    /// `xrpl:testnet` endpoint.
    #[serde(default = "default_testnet_url")]
    pub testnet: String,
    /// `xrpl:devnet` endpoint.
    #[serde(default = "default_devnet_url")]
    pub devnet: String,
}

/// Challenge issuing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Lifetime of a freshly issued challenge in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ledger: LedgerConfig::default(),
            challenge: ChallengeConfig::default(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            endpoints: LedgerEndpoints::default(),
        }
    }
}

impl Default for LedgerEndpoints {
    fn default() -> Self {
        Self {
            mainnet: default_mainnet_url(),
            testnet: default_testnet_url(),
            devnet: default_devnet_url(),
        }
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl LedgerConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LedgerEndpoints {
    /// Endpoint URL for `network`.
    #[must_use]
    pub fn url_for(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
            Network::Devnet => &self.devnet,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_mainnet_url() -> String {
    "https://s1.ripple.com:51234/".to_string()
}

fn default_testnet_url() -> String {
    "https://s.altnet.rippletest.net:51234/".to_string()
}

fn default_devnet_url() -> String {
    "https://s.devnet.rippletest.net:51234/".to_string()
}

impl VerifierConfig {
    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "x402-xrpl")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("x402-xrpl.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
