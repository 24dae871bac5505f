//! Chain client abstraction.
//!
//! Re-exports from rpsls-chain.

pub use rpsls_chain::abi::{ArtifactError, Hasher, RPS};
pub use rpsls_chain::{
    ChainClient, ChainError, ContractArtifacts, MockChainClient, RpcChainClient, RpcConfig,
    TransactionReceipt, TransactionRequest, TxHash,
};
