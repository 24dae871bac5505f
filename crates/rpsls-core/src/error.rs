//! Error types for game operations.

use crate::chain::ChainError;
use crate::protocol::GameStatus;
use crate::store::StoreError;
use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Which of the two per-game contracts a deployment error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentTarget {
    Hasher,
    Game,
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentTarget::Hasher => f.write_str("hasher"),
            DeploymentTarget::Game => f.write_str("game"),
        }
    }
}

/// Per-field validation messages, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors surfaced by the game engines
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Failed to fetch game info. Invalid contract address or network issue: {0}")]
    Fetch(#[source] ChainError),

    #[error("Failed to deploy {target} contract: {reason}")]
    Deployment {
        target: DeploymentTarget,
        reason: String,
    },

    #[error("Failed to generate commitment: {0}")]
    Commitment(#[source] ChainError),

    #[error("Selected move is not correct. Please select the move you originally played.")]
    IncorrectMove,

    #[error("Game data not found for {0}. Make sure you created this game.")]
    SecretNotFound(Address),

    #[error("Only the game creator can reveal their move")]
    NotCreator,

    #[error("The opponent hasn't played yet")]
    OpponentNotReady,

    #[error("You are not a participant in this game")]
    NotParticipant,

    #[error("Game is {0}, not waiting for a second player")]
    NotJoinable(GameStatus),

    #[error("Only the invited opponent can join this game")]
    NotOpponent,

    #[error("Stake amount must match the game stake: {expected} ETH")]
    StakeMismatch { expected: String },

    #[error("Transaction failed: {0}")]
    Transaction(#[source] ChainError),

    #[error("Secret store error: {0}")]
    Store(#[from] StoreError),
}
