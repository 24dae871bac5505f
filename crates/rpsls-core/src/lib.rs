//! RPSLS Game Core Library
//!
//! This crate provides the commit-reveal lifecycle for Rock-Paper-Scissors-
//! Lizard-Spock wagers played through on-chain contracts: move resolution,
//! salted commitments, the two-contract deployment pipeline, game status and
//! timeout derivation, and the reveal and timeout-claim engines.

pub mod chain;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod games;
pub mod protocol;
pub mod store;
pub mod units;

pub use chain::{ChainClient, ChainError, ContractArtifacts, MockChainClient, RpcChainClient};
pub use config::GameConfig;
pub use crypto::{generate_commitment, Commitment, CommitmentHasher, Salt};
pub use engine::GameClient;
pub use error::{DeploymentTarget, GameError, ValidationErrors};
pub use games::{resolve, GameOutcome, Move};
pub use protocol::{DeploymentProgress, DeploymentStep, GameStatus, TimeoutPhase, TimeoutState};
pub use store::{FileSecretStore, MemorySecretStore, SecretRecord, SecretStore};
