//! Chain client trait definition.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction hash
pub type TxHash = B256;

/// Errors from chain operations
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TxHash),

    #[error("Timed out waiting for transaction {0}")]
    Timeout(TxHash),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// A call or transaction against the chain.
///
/// `to == None` is a contract creation; `data` then holds the init code
/// followed by the ABI-encoded constructor arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    pub gas: Option<u64>,
}

impl TransactionRequest {
    /// A message call to `to`
    pub fn call(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to: Some(to),
            data: data.into(),
            value: U256::ZERO,
            gas: None,
        }
    }

    /// A contract creation with the given init code
    pub fn deploy(from: Address, init_code: impl Into<Bytes>) -> Self {
        Self {
            from,
            to: None,
            data: init_code.into(),
            value: U256::ZERO,
            gas: None,
        }
    }

    /// A read-only call that does not care about the sender
    pub fn read(to: Address, data: impl Into<Bytes>) -> Self {
        Self::call(Address::ZERO, to, data)
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

/// Receipt of a mined transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `false` if the transaction reverted
    pub status: bool,
    /// Set for successful contract creations
    pub contract_address: Option<Address>,
}

/// Trait for chain operations
///
/// This trait abstracts the node operations needed by the game client.
/// Implementations can be:
/// - MockChainClient for testing
/// - RpcChainClient for a real node
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute a call against current state without submitting it (eth_call).
    /// Used for view functions and for dry-running writes.
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, ChainError>;

    /// Submit a transaction and return its hash without waiting for it to be mined
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, ChainError>;

    /// Wait until the transaction is mined and return its receipt
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError>;
}
