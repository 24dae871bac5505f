//! Joining a game as the invited opponent.

use super::GameClient;
use crate::error::{GameError, ValidationErrors};
use crate::games::Move;
use crate::protocol::{GameStatus, JoinGameInput, JoinedGame};
use crate::units::{format_ether, parse_address, parse_ether};
use alloy_primitives::{Address, U256};
use tracing::{info, warn};

/// Join input that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedJoin {
    pub contract_address: Address,
    pub mv: Move,
    /// In wei
    pub stake: U256,
}

pub fn validate_join_game(input: &JoinGameInput) -> Result<ValidatedJoin, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let contract_address = if input.contract_address.trim().is_empty() {
        errors.insert("contract_address", "Contract address is required");
        None
    } else {
        let parsed = parse_address(&input.contract_address);
        if parsed.is_none() {
            errors.insert("contract_address", "Invalid contract address");
        }
        parsed
    };

    let mv = match input.mv {
        0 => {
            errors.insert("move", "Please select a move");
            None
        }
        n => Move::try_from(n)
            .map_err(|_| errors.insert("move", "Invalid move selection"))
            .ok(),
    };

    let stake = if input.stake.trim().is_empty() {
        errors.insert("stake_amount", "Stake amount is required");
        None
    } else {
        parse_ether(&input.stake)
            .map_err(|_| errors.insert("stake_amount", "Invalid stake amount"))
            .ok()
    };

    match (contract_address, mv, stake) {
        (Some(contract_address), Some(mv), Some(stake)) => Ok(ValidatedJoin {
            contract_address,
            mv,
            stake,
        }),
        _ => Err(errors),
    }
}

impl GameClient {
    /// Play the opponent's move, matching the creator's stake exactly.
    ///
    /// The game must still be waiting and `player` must be the invited
    /// opponent.
    pub async fn join_game(
        &self,
        player: Address,
        input: &JoinGameInput,
    ) -> Result<JoinedGame, GameError> {
        let join = validate_join_game(input).map_err(GameError::Validation)?;

        let result = self.submit_join(player, &join).await;
        if let Err(e) = &result {
            warn!(
                contract_address = %join.contract_address,
                %player,
                error = %e,
                "join failed"
            );
        }
        result
    }

    async fn submit_join(
        &self,
        player: Address,
        join: &ValidatedJoin,
    ) -> Result<JoinedGame, GameError> {
        let info = self.fetch_status(join.contract_address).await?;
        if info.status != GameStatus::Waiting {
            return Err(GameError::NotJoinable(info.status));
        }
        if player != info.opponent {
            return Err(GameError::NotOpponent);
        }
        if join.stake != info.stake {
            return Err(GameError::StakeMismatch {
                expected: format_ether(info.stake),
            });
        }

        let transaction_hash = self
            .contract(join.contract_address)
            .play(player, join.mv, join.stake)
            .await
            .map_err(GameError::Transaction)?;
        self.confirm(transaction_hash).await?;

        info!(contract_address = %join.contract_address, %player, "joined game");
        Ok(JoinedGame {
            contract_address: join.contract_address,
            mv: join.mv,
            transaction_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_validation() {
        let errors = validate_join_game(&JoinGameInput {
            contract_address: "0x12".to_string(),
            mv: 7,
            stake: String::new(),
        })
        .unwrap_err();

        assert_eq!(errors.get("contract_address"), Some("Invalid contract address"));
        assert_eq!(errors.get("move"), Some("Invalid move selection"));
        assert_eq!(errors.get("stake_amount"), Some("Stake amount is required"));
    }

    #[test]
    fn test_valid_join() {
        let join = validate_join_game(&JoinGameInput {
            contract_address: "0x00000000000000000000000000000000000000c3".to_string(),
            mv: 2,
            stake: "0.5".to_string(),
        })
        .unwrap();

        assert_eq!(join.mv, Move::Paper);
        assert_eq!(join.stake, parse_ether("0.5").unwrap());
    }
}
