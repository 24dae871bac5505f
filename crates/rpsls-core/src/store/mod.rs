//! Local storage for the creator's move and salt.
//!
//! Without the stored salt the creator cannot reveal, so records are only
//! ever removed explicitly.

mod file;
mod memory;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

use crate::crypto::{Commitment, Salt};
use crate::games::Move;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Namespace for game records among other keys in the same storage
pub const KEY_PREFIX: &str = "game_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// What the creator needs to reveal later
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    #[serde(rename = "move")]
    pub mv: Move,
    pub salt: Salt,
    pub commitment: Commitment,
    /// Unix milliseconds at creation
    pub timestamp: u64,
}

impl SecretRecord {
    pub fn new(mv: Move, salt: Salt, commitment: Commitment) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            mv,
            salt,
            commitment,
            timestamp,
        }
    }
}

/// Storage key for a game contract
pub fn storage_key(contract: &Address) -> String {
    format!("{KEY_PREFIX}0x{}", hex::encode(contract.as_slice()))
}

/// Inverse of [`storage_key`]; `None` for keys outside the namespace
pub fn parse_storage_key(key: &str) -> Option<Address> {
    key.strip_prefix(KEY_PREFIX)?.parse().ok()
}

/// Persistent map from game contract to [`SecretRecord`]
pub trait SecretStore: Send + Sync {
    fn store(&self, contract: Address, record: &SecretRecord) -> Result<(), StoreError>;

    /// `Ok(None)` if absent or unreadable
    fn get(&self, contract: Address) -> Result<Option<SecretRecord>, StoreError>;

    fn remove(&self, contract: Address) -> Result<(), StoreError>;

    /// Contracts with a stored record
    fn list_keys(&self) -> Result<Vec<Address>, StoreError>;
}
