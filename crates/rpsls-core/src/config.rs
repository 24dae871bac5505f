//! Game client configuration.

use crate::chain::{ArtifactError, ContractArtifacts};
use crate::units::parse_ether;
use alloy_primitives::U256;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Gas limit for the hasher deployment
pub const DEFAULT_HASHER_GAS: u64 = 570_560;
/// Gas limit for the game deployment
pub const DEFAULT_GAME_GAS: u64 = 5_705_600;
/// Interval between status polls when watching a game
pub const DEFAULT_STATUS_POLL: Duration = Duration::from_secs(5);

/// Limits and gas settings for game creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Inclusive, in wei
    pub min_stake: U256,
    /// Inclusive, in wei
    pub max_stake: U256,
    pub hasher_gas: u64,
    pub game_gas: u64,
    pub status_poll_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // 0.0001 ETH
            min_stake: U256::from(100_000_000_000_000u64),
            // 100 ETH
            max_stake: U256::from(100_000_000_000_000_000_000u128),
            hasher_gas: DEFAULT_HASHER_GAS,
            game_gas: DEFAULT_GAME_GAS,
            status_poll_interval: DEFAULT_STATUS_POLL,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `RPSLS_MIN_STAKE`, `RPSLS_MAX_STAKE` (ether),
    /// `RPSLS_HASHER_GAS`, `RPSLS_GAME_GAS` and `RPSLS_STATUS_POLL_SECS`.
    /// Unparseable values, and a poll interval of zero, are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_stake: env_ether("RPSLS_MIN_STAKE").unwrap_or(defaults.min_stake),
            max_stake: env_ether("RPSLS_MAX_STAKE").unwrap_or(defaults.max_stake),
            hasher_gas: env_parse("RPSLS_HASHER_GAS").unwrap_or(defaults.hasher_gas),
            game_gas: env_parse("RPSLS_GAME_GAS").unwrap_or(defaults.game_gas),
            status_poll_interval: poll_interval(env_parse("RPSLS_STATUS_POLL_SECS"))
                .unwrap_or(defaults.status_poll_interval),
        }
    }
}

fn env_ether(var: &str) -> Option<U256> {
    let raw = std::env::var(var).ok()?;
    match parse_ether(&raw) {
        Ok(wei) => Some(wei),
        Err(e) => {
            warn!(var, error = %e, "ignoring invalid ether amount");
            None
        }
    }
}

fn env_parse(var: &str) -> Option<u64> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(var, value = %raw, error = %e, "ignoring invalid number");
            None
        }
    }
}

fn poll_interval(secs: Option<u64>) -> Option<Duration> {
    match secs? {
        0 => {
            warn!("ignoring zero status poll interval");
            None
        }
        secs => Some(Duration::from_secs(secs)),
    }
}

/// Load contract bytecode from `RPSLS_HASHER_BYTECODE` and `RPSLS_GAME_BYTECODE`.
///
/// Returns `Ok(None)` unless both are set.
pub fn artifacts_from_env() -> Result<Option<ContractArtifacts>, ArtifactError> {
    match (
        std::env::var("RPSLS_HASHER_BYTECODE"),
        std::env::var("RPSLS_GAME_BYTECODE"),
    ) {
        (Ok(hasher), Ok(game)) => ContractArtifacts::from_hex_files(hasher, game).map(Some),
        _ => Ok(None),
    }
}

/// Path of the JSON secret store from `RPSLS_SECRET_STORE`
pub fn secret_store_path_from_env() -> Option<PathBuf> {
    std::env::var_os("RPSLS_SECRET_STORE").map(PathBuf::from)
}
