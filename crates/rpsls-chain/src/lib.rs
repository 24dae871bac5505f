//! RPSLS Chain Library
//!
//! Chain access for the RPSLS commit-reveal game:
//! - ChainClient trait, RpcChainClient and MockChainClient
//! - ABI bindings for the game and hasher contracts

pub mod abi;
pub mod client;

pub use abi::{ArtifactError, ContractArtifacts};
pub use client::{
    ChainClient, ChainError, MockChainClient, RpcChainClient, RpcConfig, TransactionReceipt,
    TransactionRequest, TxHash,
};
