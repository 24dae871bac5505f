//! Game deployment orchestration.
//!
//! Creating a game takes two confirmed deployments: a hasher contract that
//! computes the commitment, then the game contract seeded with that
//! commitment and the stake. Progress is reported through a callback.

use super::GameClient;
use crate::chain::{ChainError, TransactionRequest, TxHash};
use crate::config::GameConfig;
use crate::contract::HasherContract;
use crate::crypto::{generate_commitment, Salt};
use crate::error::{DeploymentTarget, GameError, ValidationErrors};
use crate::games::Move;
use crate::protocol::{CreateGameInput, CreatedGame, DeploymentProgress, DeploymentStep};
use crate::store::SecretRecord;
use crate::units::{format_ether, parse_address, parse_ether};
use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

/// Creation input that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedGame {
    pub mv: Move,
    /// In wei
    pub stake: U256,
    pub opponent: Address,
}

/// Check move, stake and opponent, collecting one message per bad field
pub fn validate_create_game(
    config: &GameConfig,
    creator: Address,
    input: &CreateGameInput,
) -> Result<ValidatedGame, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let mv = match input.mv {
        0 => {
            errors.insert("move", "Please select a move");
            None
        }
        n => match Move::try_from(n) {
            Ok(mv) => Some(mv),
            Err(_) => {
                errors.insert("move", "Invalid move selection");
                None
            }
        },
    };

    let stake = validate_stake(config, &input.stake, &mut errors);

    let opponent = if input.opponent.trim().is_empty() {
        errors.insert("opponent_address", "Opponent address is required");
        None
    } else {
        match parse_address(&input.opponent) {
            None => {
                errors.insert("opponent_address", "Invalid Ethereum address");
                None
            }
            Some(addr) if addr == creator => {
                errors.insert("opponent_address", "You cannot play against yourself");
                None
            }
            Some(addr) => Some(addr),
        }
    };

    match (mv, stake, opponent) {
        (Some(mv), Some(stake), Some(opponent)) if errors.is_empty() => Ok(ValidatedGame {
            mv,
            stake,
            opponent,
        }),
        _ => Err(errors),
    }
}

fn validate_stake(config: &GameConfig, raw: &str, errors: &mut ValidationErrors) -> Option<U256> {
    if raw.trim().is_empty() {
        errors.insert("stake_amount", "Stake amount is required");
        return None;
    }
    let Ok(stake) = parse_ether(raw) else {
        errors.insert("stake_amount", "Invalid stake amount");
        return None;
    };
    if stake.is_zero() {
        errors.insert("stake_amount", "Stake amount must be greater than 0");
        None
    } else if stake < config.min_stake {
        errors.insert(
            "stake_amount",
            format!("Minimum stake amount is {} ETH", format_ether(config.min_stake)),
        );
        None
    } else if stake > config.max_stake {
        errors.insert(
            "stake_amount",
            format!("Maximum stake amount is {} ETH", format_ether(config.max_stake)),
        );
        None
    } else {
        Some(stake)
    }
}

/// Emits steps in strictly increasing order
struct ProgressReporter<F> {
    last: DeploymentStep,
    on_progress: F,
}

impl<F: FnMut(&DeploymentProgress)> ProgressReporter<F> {
    fn new(on_progress: F) -> Self {
        Self {
            last: DeploymentStep::Idle,
            on_progress,
        }
    }

    fn emit(&mut self, step: DeploymentStep, tx_hash: Option<TxHash>) {
        debug_assert!(step > self.last, "{step:?} reported after {:?}", self.last);
        self.last = step;
        debug!(?step, "deployment progress");
        (self.on_progress)(&DeploymentProgress::new(step, tx_hash));
    }
}

impl GameClient {
    /// Validate the input, deploy the hasher and game contracts, and store
    /// the creator's move and salt under the game address.
    ///
    /// Validation failures are reported before anything touches the chain.
    /// Any later failure aborts the remaining steps; `Completed` is only
    /// reported once the secret is stored.
    pub async fn create_game<F>(
        &self,
        creator: Address,
        input: &CreateGameInput,
        on_progress: F,
    ) -> Result<CreatedGame, GameError>
    where
        F: FnMut(&DeploymentProgress) + Send,
    {
        let game =
            validate_create_game(&self.config, creator, input).map_err(GameError::Validation)?;

        let result = self
            .deploy_game(creator, &game, ProgressReporter::new(on_progress))
            .await;
        if let Err(e) = &result {
            warn!(creator = %creator, error = %e, "game creation failed");
        }
        result
    }

    async fn deploy_game<F>(
        &self,
        creator: Address,
        game: &ValidatedGame,
        mut progress: ProgressReporter<F>,
    ) -> Result<CreatedGame, GameError>
    where
        F: FnMut(&DeploymentProgress) + Send,
    {
        let salt = Salt::random();

        progress.emit(DeploymentStep::DeployingHasher, None);
        let request = TransactionRequest::deploy(creator, self.artifacts.hasher_init_code())
            .with_gas(self.config.hasher_gas);
        let tx_hash = self
            .chain
            .send_transaction(&request)
            .await
            .map_err(|e| deployment_failed(DeploymentTarget::Hasher, e))?;

        progress.emit(DeploymentStep::WaitingHasher, Some(tx_hash));
        let hasher_address = self
            .await_deployment(tx_hash, DeploymentTarget::Hasher)
            .await?;
        info!(%hasher_address, "hasher deployed");

        progress.emit(DeploymentStep::GeneratingCommitment, None);
        let hasher = HasherContract::new(self.chain.as_ref(), hasher_address);
        let commitment = generate_commitment(&hasher, game.mv, &salt).await?;

        progress.emit(DeploymentStep::DeployingRps, None);
        let init_code = self
            .artifacts
            .game_init_code(commitment.as_b256(), game.opponent);
        let request = TransactionRequest::deploy(creator, init_code)
            .with_value(game.stake)
            .with_gas(self.config.game_gas);
        let tx_hash = self
            .chain
            .send_transaction(&request)
            .await
            .map_err(|e| deployment_failed(DeploymentTarget::Game, e))?;

        progress.emit(DeploymentStep::WaitingRps, Some(tx_hash));
        let contract_address = self
            .await_deployment(tx_hash, DeploymentTarget::Game)
            .await?;

        progress.emit(DeploymentStep::StoringData, None);
        self.store
            .store(contract_address, &SecretRecord::new(game.mv, salt, commitment))?;

        info!(
            %contract_address,
            opponent = %game.opponent,
            stake = %format_ether(game.stake),
            "game created"
        );
        progress.emit(DeploymentStep::Completed, None);

        Ok(CreatedGame {
            contract_address,
            hasher_address,
            commitment,
            transaction_hash: tx_hash,
        })
    }

    async fn await_deployment(
        &self,
        tx_hash: TxHash,
        target: DeploymentTarget,
    ) -> Result<Address, GameError> {
        let receipt = self
            .chain
            .wait_for_receipt(tx_hash)
            .await
            .map_err(GameError::Transaction)?;
        if !receipt.status {
            return Err(GameError::Deployment {
                target,
                reason: format!("transaction {tx_hash} reverted"),
            });
        }
        receipt.contract_address.ok_or_else(|| GameError::Deployment {
            target,
            reason: "no contract address in receipt".to_string(),
        })
    }
}

/// A deployment the node refused to accept
fn deployment_failed(target: DeploymentTarget, error: ChainError) -> GameError {
    GameError::Deployment {
        target,
        reason: error.to_string(),
    }
}
