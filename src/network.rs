//! Supported XRP Ledger network identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An XRP Ledger network, identified by its CAIP-2 style string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Production ledger.
    #[serde(rename = "xrpl:1")]
    Mainnet,
    /// Public test ledger.
    #[serde(rename = "xrpl:testnet")]
    Testnet,
    /// Developer ledger with pre-release amendments.
    #[serde(rename = "xrpl:devnet")]
    Devnet,
}

impl Network {
    /// All supported networks.
    pub const ALL: [Self; 3] = [Self::Mainnet, Self::Testnet, Self::Devnet];

    /// The literal network identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "xrpl:1",
            Self::Testnet => "xrpl:testnet",
            Self::Devnet => "xrpl:devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a supported network identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported network: {0}")]
pub struct UnsupportedNetwork(pub String);

impl FromStr for Network {
    type Err = UnsupportedNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| UnsupportedNetwork(s.to_string()))
    }
}
