//! rippled JSON-RPC ledger client.

use crate::config::{LedgerConfig, LedgerEndpoints};
use crate::error::{Error, Result};
use crate::ledger::{LedgerClient, LedgerPaymentRecord};
use crate::network::Network;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// rippled error code for an unknown transaction.
const TXN_NOT_FOUND: &str = "txnNotFound";

/// Ledger client backed by the rippled `tx` JSON-RPC method.
pub struct XrplRpcClient {
    http: reqwest::Client,
    endpoints: LedgerEndpoints,
}

impl XrplRpcClient {
    /// Create a client for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Ledger(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
        })
    }
}

#[async_trait]
impl LedgerClient for XrplRpcClient {
    async fn fetch(&self, network: Network, tx_hash: &str) -> Result<Option<LedgerPaymentRecord>> {
        let url = self.endpoints.url_for(network);
        debug!("Querying {network} ledger at {url} for transaction {tx_hash}");

        let request = json!({
            "method": "tx",
            "params": [{ "transaction": tx_hash, "binary": false }],
        });

        let response = self.http.post(url).json(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Ledger query for {tx_hash} timed out");
                Error::Ledger("Ledger query timed out".to_string())
            } else {
                warn!("Ledger query for {tx_hash} failed: {e}");
                Error::Ledger(format!("Ledger query failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Ledger(format!("Ledger endpoint returned HTTP {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Ledger(format!("Ledger response is not JSON: {e}")))?;

        parse_tx_response(&payload)
    }
}

/// Interpret a rippled `tx` JSON-RPC response.
///
/// Handles both API v1 (fields at the top of `result`) and API v2 (fields
/// under `result.tx_json`, amount in `DeliverMax`).
///
/// # Errors
///
/// Returns [`Error::Ledger`] for RPC errors other than `txnNotFound` and for
/// responses that do not look like a transaction.
pub fn parse_tx_response(payload: &Value) -> Result<Option<LedgerPaymentRecord>> {
    let result = payload
        .get("result")
        .ok_or_else(|| Error::Ledger("Ledger response has no result".to_string()))?;

    if let Some(error) = result.get("error").and_then(Value::as_str) {
        if error == TXN_NOT_FOUND {
            return Ok(None);
        }
        return Err(Error::Ledger(format!("Ledger RPC error: {error}")));
    }

    let mut tx = match result.get("tx_json") {
        Some(Value::Object(tx_json)) => tx_json.clone(),
        _ => result
            .as_object()
            .cloned()
            .ok_or_else(|| Error::Ledger("Ledger result is not an object".to_string()))?,
    };

    if !tx.contains_key("Amount") {
        if let Some(deliver_max) = tx.get("DeliverMax").cloned() {
            tx.insert("Amount".to_string(), deliver_max);
        }
    }

    let validated = result
        .get("validated")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    tx.insert("validated".to_string(), Value::Bool(validated));

    serde_json::from_value(Value::Object(tx))
        .map(Some)
        .map_err(|e| Error::Ledger(format!("Unexpected transaction shape: {e}")))
}
