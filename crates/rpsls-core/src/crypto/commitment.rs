//! Commitment and Salt for commit-reveal scheme.

use crate::chain::ChainError;
use crate::error::GameError;
use crate::games::Move;
use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// Salt for commitment scheme: a uniformly random 256-bit integer.
///
/// Serialized as a decimal string so stored records stay readable by
/// tooling that treats the salt as a big integer.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(U256);

impl Salt {
    /// Create a new random salt from the thread-local CSPRNG
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(U256::from_be_bytes(bytes))
    }

    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes::<32>();
        write!(f, "Salt({}..)", hex::encode(&bytes[..4]))
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10)
            .map(Salt)
            .map_err(|e| de::Error::custom(format!("invalid salt {s:?}: {e}")))
    }
}

/// Commitment = keccak256(abi.encodePacked(uint8 move, uint256 salt))
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(B256);

impl Commitment {
    pub fn from_b256(hash: B256) -> Self {
        Self(hash)
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<Commitment> for B256 {
    fn from(commitment: Commitment) -> B256 {
        commitment.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Oracle that computes the commitment for a move and salt.
///
/// In production this is a read-only call to a deployed hasher contract.
#[async_trait]
pub trait CommitmentHasher: Send + Sync {
    async fn hash(&self, mv: Move, salt: &Salt) -> Result<B256, ChainError>;
}

/// Ask the hasher for the commitment of `mv` under `salt`.
///
/// Any failure of the underlying call, including a malformed response, is
/// reported as [`GameError::Commitment`].
pub async fn generate_commitment(
    hasher: &dyn CommitmentHasher,
    mv: Move,
    salt: &Salt,
) -> Result<Commitment, GameError> {
    let hash = hasher
        .hash(mv, salt)
        .await
        .map_err(GameError::Commitment)?;
    debug!(mv = mv.name(), commitment = %hash, "commitment generated");
    Ok(Commitment(hash))
}
