//! ABI bindings for the hasher and game contracts.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::sol;
use std::path::Path;
use thiserror::Error;

sol! {
    interface Hasher {
        function hash(uint8 _c, uint256 _salt) external pure returns (bytes32);
    }

    interface RPS {
        function j1() external view returns (address);
        function j2() external view returns (address);
        function c2() external view returns (uint8);
        function stake() external view returns (uint256);
        function lastAction() external view returns (uint256);
        function TIMEOUT() external view returns (uint256);
        function play(uint8 _c2) external payable;
        function solve(uint8 _c1, uint256 _salt) external;
        function j1Timeout() external;
        function j2Timeout() external;
    }
}

/// Errors loading contract bytecode
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bytecode hex in {path}: {source}")]
    Hex {
        path: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Bytecode in {0} is empty")]
    Empty(String),
}

/// Creation bytecode for the two contracts deployed per game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractArtifacts {
    pub hasher: Bytes,
    pub game: Bytes,
}

impl ContractArtifacts {
    pub fn new(hasher: impl Into<Bytes>, game: impl Into<Bytes>) -> Self {
        Self {
            hasher: hasher.into(),
            game: game.into(),
        }
    }

    /// Load both bytecodes from hex files (an optional `0x` prefix is accepted)
    pub fn from_hex_files(
        hasher: impl AsRef<Path>,
        game: impl AsRef<Path>,
    ) -> Result<Self, ArtifactError> {
        Ok(Self {
            hasher: read_bytecode(hasher.as_ref())?,
            game: read_bytecode(game.as_ref())?,
        })
    }

    /// Init code for the hasher contract, which takes no constructor arguments
    pub fn hasher_init_code(&self) -> Bytes {
        self.hasher.clone()
    }

    /// Init code for the game contract: `constructor(bytes32 c1Hash, address j2)`
    pub fn game_init_code(&self, commitment: B256, opponent: Address) -> Bytes {
        let mut code = Vec::with_capacity(self.game.len() + 64);
        code.extend_from_slice(&self.game);
        code.extend_from_slice(commitment.as_slice());
        code.extend_from_slice(opponent.into_word().as_slice());
        code.into()
    }
}

fn read_bytecode(path: &Path) -> Result<Bytes, ArtifactError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    let trimmed = raw.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).map_err(|source| ArtifactError::Hex {
        path: display.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ArtifactError::Empty(display));
    }
    Ok(bytes.into())
}
