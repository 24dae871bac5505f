//! RPC client for Ethereum nodes.
//!
//! This module provides a real implementation of `ChainClient` that talks to
//! a node via JSON-RPC. Transactions are signed by the node (`eth_sendTransaction`),
//! so `from` must be an account the node manages, as with a dev node or a
//! wallet-backed endpoint.

use crate::client::traits::{ChainClient, ChainError, TransactionReceipt, TransactionRequest, TxHash};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`RpcChainClient`]
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// Node JSON-RPC URL
    pub rpc_url: String,
    /// Delay between `eth_getTransactionReceipt` polls
    pub poll_interval: Duration,
    /// How long to wait for a transaction to be mined
    pub receipt_timeout: Duration,
}

impl RpcConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            receipt_timeout: Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS),
        }
    }

    /// Read `RPSLS_RPC_URL`, `RPSLS_RECEIPT_POLL_MS` and `RPSLS_RECEIPT_TIMEOUT_SECS`.
    /// Returns `None` when no RPC URL is configured. Bad or zero timings are
    /// logged and replaced by the defaults.
    pub fn from_env() -> Option<Self> {
        let rpc_url = std::env::var("RPSLS_RPC_URL").ok()?;
        let poll_ms = positive_or(
            "RPSLS_RECEIPT_POLL_MS",
            std::env::var("RPSLS_RECEIPT_POLL_MS").ok().as_deref(),
            DEFAULT_POLL_INTERVAL_MS,
        );
        let timeout_secs = positive_or(
            "RPSLS_RECEIPT_TIMEOUT_SECS",
            std::env::var("RPSLS_RECEIPT_TIMEOUT_SECS").ok().as_deref(),
            DEFAULT_RECEIPT_TIMEOUT_SECS,
        );

        Some(Self {
            rpc_url,
            poll_interval: Duration::from_millis(poll_ms),
            receipt_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn positive_or(var: &str, raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!(var, default, "ignoring zero setting");
            default
        }
        Ok(value) => value,
        Err(e) => {
            warn!(var, value = %raw, error = %e, default, "ignoring invalid setting");
            default
        }
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    block_number: Option<String>,
    status: Option<String>,
    contract_address: Option<Address>,
}

impl RpcReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt, ChainError> {
        let block_number = match self.block_number.as_deref() {
            Some(n) => parse_quantity(n)?,
            None => 0,
        };
        // Pre-Byzantium receipts carry no status; treat them as successful.
        let status = match self.status.as_deref() {
            Some(s) => parse_quantity(s)? == 1,
            None => true,
        };
        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_number,
            status,
            contract_address: self.contract_address,
        })
    }
}

fn parse_quantity(s: &str) -> Result<u64, ChainError> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Decode(format!("bad quantity {s}: {e}")))
}

/// RPC client for an Ethereum node
pub struct RpcChainClient {
    /// HTTP client
    client: Client,
    config: RpcConfig,
}

impl RpcChainClient {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Make a JSON-RPC call
    async fn call_rpc(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method, request = %request, "rpc request");

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::NetworkError(e.to_string()))?;

        let result: Value = response
            .json()
            .await
            .map_err(|e| ChainError::NetworkError(e.to_string()))?;

        debug!(method, response = %result, "rpc response");

        if let Some(error) = result.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            // Geth and anvil report reverts as code 3 or with "revert" in the message
            let is_revert = error.get("code").and_then(|c| c.as_i64()) == Some(3)
                || msg.contains("revert");
            return Err(if is_revert {
                ChainError::Reverted(msg.to_string())
            } else {
                ChainError::NetworkError(msg.to_string())
            });
        }

        result
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::NetworkError("No result in response".to_string()))
    }

    async fn get_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, ChainError> {
        let result = self
            .call_rpc("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: RpcReceipt =
            serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))?;
        receipt.into_receipt().map(Some)
    }
}

fn request_object(request: &TransactionRequest) -> Value {
    let mut obj = Map::new();
    obj.insert("from".to_string(), json!(request.from));
    if let Some(to) = request.to {
        obj.insert("to".to_string(), json!(to));
    }
    obj.insert("data".to_string(), json!(request.data));
    if !request.value.is_zero() {
        obj.insert("value".to_string(), json!(format!("0x{:x}", request.value)));
    }
    if let Some(gas) = request.gas {
        obj.insert("gas".to_string(), json!(format!("0x{:x}", gas)));
    }
    Value::Object(obj)
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, ChainError> {
        let result = self
            .call_rpc("eth_call", json!([request_object(request), "latest"]))
            .await?;
        serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, ChainError> {
        let result = self
            .call_rpc("eth_sendTransaction", json!([request_object(request)]))
            .await?;
        serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))
    }

    /// Poll for the receipt until it shows up or `receipt_timeout` elapses
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.get_receipt(tx_hash).await? {
                    return Ok::<_, ChainError>(receipt);
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        tokio::time::timeout(self.config.receipt_timeout, poll)
            .await
            .map_err(|_| ChainError::Timeout(tx_hash))?
    }
}
