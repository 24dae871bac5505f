//! Protocol types.

use crate::chain::TxHash;
use crate::crypto::Commitment;
use crate::games::{GameOutcome, Move};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status as seen from the join side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Deployed, opponent has not played
    Waiting,
    /// Opponent has played, creator has not revealed
    Joined,
    /// Stake paid out (reveal or timeout)
    Completed,
    /// The last status poll failed
    Error,
}

impl GameStatus {
    /// Derive the status from on-chain fields
    pub fn derive(opponent: Address, opponent_move: u8, stake: U256) -> Self {
        if stake.is_zero() {
            GameStatus::Completed
        } else if opponent.is_zero() || opponent_move == 0 {
            GameStatus::Waiting
        } else {
            GameStatus::Joined
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Joined => "joined",
            GameStatus::Completed => "completed",
            GameStatus::Error => "error",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase used by the timeout view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPhase {
    Created,
    Joined,
    Revealed,
}

impl TimeoutPhase {
    pub fn derive(opponent_move: u8, stake: U256) -> Self {
        if stake.is_zero() {
            TimeoutPhase::Revealed
        } else if opponent_move == 0 {
            TimeoutPhase::Created
        } else {
            TimeoutPhase::Joined
        }
    }
}

/// Countdown state for a caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutState {
    /// Seconds until the timeout elapses, never negative
    pub time_remaining: u64,
    /// The caller is a participant and the timeout has elapsed
    pub can_claim: bool,
}

/// Stages of game creation, in the order they are reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStep {
    Idle,
    DeployingHasher,
    WaitingHasher,
    GeneratingCommitment,
    DeployingRps,
    WaitingRps,
    StoringData,
    Completed,
}

impl DeploymentStep {
    pub fn message(&self) -> &'static str {
        match self {
            DeploymentStep::Idle => "",
            DeploymentStep::DeployingHasher => "Deploying Hasher Contract...",
            DeploymentStep::WaitingHasher => "Waiting for Hasher Contract confirmation...",
            DeploymentStep::GeneratingCommitment => "Generating commitment hash...",
            DeploymentStep::DeployingRps => "Deploying RPS Game Contract...",
            DeploymentStep::WaitingRps => "Waiting for Game Contract confirmation...",
            DeploymentStep::StoringData => "Storing game data...",
            DeploymentStep::Completed => "Game created successfully!",
        }
    }
}

/// A progress notification emitted during game creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentProgress {
    pub step: DeploymentStep,
    pub message: String,
    /// Set on the waiting steps
    pub tx_hash: Option<TxHash>,
}

impl DeploymentProgress {
    pub fn new(step: DeploymentStep, tx_hash: Option<TxHash>) -> Self {
        Self {
            step,
            message: step.message().to_string(),
            tx_hash,
        }
    }
}

/// Raw input for game creation, as typed by the user
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameInput {
    /// Move number; 0 means "not selected"
    pub mv: u8,
    /// Stake in ether, decimal
    pub stake: String,
    pub opponent: String,
}

/// Result of a successful game creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGame {
    pub contract_address: Address,
    pub hasher_address: Address,
    pub commitment: Commitment,
    /// Hash of the game deployment transaction
    pub transaction_hash: TxHash,
}

/// Snapshot of a game as returned by `fetch_status`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub contract_address: Address,
    pub creator: Address,
    pub opponent: Address,
    /// Stake held by the contract, in wei
    pub stake: U256,
    pub status: GameStatus,
    /// Unix seconds of the last state-changing call
    pub last_action: u64,
}

/// Raw input for joining a game
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGameInput {
    pub contract_address: String,
    pub mv: u8,
    /// Stake in ether, decimal; must equal the game stake
    pub stake: String,
}

/// Result of a successful join
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedGame {
    pub contract_address: Address,
    pub mv: Move,
    pub transaction_hash: TxHash,
}

/// Contract fields needed to decide whether the creator can reveal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimData {
    pub creator: Address,
    pub opponent: Address,
    /// 0 until the opponent plays
    pub opponent_move: u8,
    /// In wei
    pub stake: U256,
}

/// Outcome of a successful reveal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    pub contract_address: Address,
    pub your_move: Move,
    pub opponent_move: Move,
    pub result: GameOutcome,
    /// Stake that was at play, in ether
    pub stake: String,
    pub transaction_hash: TxHash,
}

/// Contract fields needed for the timeout view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutData {
    pub creator: Address,
    pub opponent: Address,
    /// In wei
    pub stake: U256,
    pub opponent_move: u8,
    /// Unix seconds
    pub last_action: u64,
    /// Seconds
    pub timeout: u64,
}

impl TimeoutData {
    pub fn phase(&self) -> TimeoutPhase {
        TimeoutPhase::derive(self.opponent_move, self.stake)
    }

    pub fn is_participant(&self, caller: Address) -> bool {
        !caller.is_zero() && (caller == self.creator || caller == self.opponent)
    }
}

/// Everything the timeout view shows for one game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutGameInfo {
    pub contract_address: Address,
    pub creator: Address,
    pub opponent: Address,
    /// In ether
    pub stake: String,
    pub last_action: u64,
    pub phase: TimeoutPhase,
    pub timeout_duration: u64,
    pub time_remaining: u64,
    pub can_claim: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const OPPONENT: Address = address!("00000000000000000000000000000000000000b2");

    #[test]
    fn test_status_derivation() {
        let stake = U256::from(1000u64);

        assert_eq!(GameStatus::derive(OPPONENT, 0, stake), GameStatus::Waiting);
        assert_eq!(GameStatus::derive(Address::ZERO, 0, stake), GameStatus::Waiting);
        assert_eq!(GameStatus::derive(OPPONENT, 3, stake), GameStatus::Joined);
        assert_eq!(GameStatus::derive(OPPONENT, 3, U256::ZERO), GameStatus::Completed);
        assert_eq!(GameStatus::derive(OPPONENT, 0, U256::ZERO), GameStatus::Completed);
    }

    #[test]
    fn test_timeout_phase_derivation() {
        let stake = U256::from(1u64);

        assert_eq!(TimeoutPhase::derive(0, stake), TimeoutPhase::Created);
        assert_eq!(TimeoutPhase::derive(2, stake), TimeoutPhase::Joined);
        assert_eq!(TimeoutPhase::derive(2, U256::ZERO), TimeoutPhase::Revealed);
    }

    #[test]
    fn test_deployment_steps_are_ordered() {
        assert!(DeploymentStep::Idle < DeploymentStep::DeployingHasher);
        assert!(DeploymentStep::WaitingHasher < DeploymentStep::GeneratingCommitment);
        assert!(DeploymentStep::StoringData < DeploymentStep::Completed);
        assert_eq!(
            serde_json::to_string(&DeploymentStep::DeployingRps).unwrap(),
            "\"deploying-rps\""
        );
    }

    #[test]
    fn test_zero_address_is_never_a_participant() {
        let data = TimeoutData {
            creator: address!("00000000000000000000000000000000000000a1"),
            opponent: Address::ZERO,
            stake: U256::from(1u64),
            opponent_move: 0,
            last_action: 0,
            timeout: 300,
        };
        assert!(!data.is_participant(Address::ZERO));
        assert!(data.is_participant(data.creator));
    }
}
