//! Reveal and claim: the creator discloses the committed move and the
//! contract pays out.

use super::GameClient;
use crate::chain::ChainError;
use crate::error::GameError;
use crate::games::Move;
use crate::protocol::{ClaimData, RevealResult};
use crate::units::format_ether;
use alloy_primitives::Address;
use tracing::{info, warn};

impl GameClient {
    /// Read what the reveal view needs: participants, opponent move, stake
    pub async fn fetch_claim_data(&self, contract_address: Address) -> Result<ClaimData, GameError> {
        let result = self.read_claim_data(contract_address).await;
        if let Err(e) = &result {
            warn!(%contract_address, error = %e, "failed to fetch claim data");
        }
        result
    }

    async fn read_claim_data(&self, contract_address: Address) -> Result<ClaimData, GameError> {
        let rps = self.contract(contract_address);
        let (creator, opponent, opponent_move, stake) =
            tokio::try_join!(rps.j1(), rps.j2(), rps.c2(), rps.stake())
                .map_err(GameError::Fetch)?;

        Ok(ClaimData {
            creator,
            opponent,
            opponent_move,
            stake,
        })
    }

    /// Reveal the creator's move and settle the game.
    ///
    /// Preconditions are checked in order: a stored secret exists for the
    /// game, `caller` is the creator, the opponent has played. A claimed
    /// move other than the stored one is rejected before anything is sent.
    /// The call is dry-run first so a bad reveal fails without spending gas.
    ///
    /// The stake is read before submitting because the contract zeroes it on
    /// payout. The outcome is computed from the stored move, never from
    /// `claimed_move`.
    pub async fn reveal_move(
        &self,
        contract_address: Address,
        caller: Address,
        claim: &ClaimData,
        claimed_move: Move,
    ) -> Result<RevealResult, GameError> {
        let result = self
            .reveal_and_settle(contract_address, caller, claim, claimed_move)
            .await;
        if let Err(e) = &result {
            warn!(%contract_address, %caller, error = %e, "reveal failed");
        }
        result
    }

    async fn reveal_and_settle(
        &self,
        contract_address: Address,
        caller: Address,
        claim: &ClaimData,
        claimed_move: Move,
    ) -> Result<RevealResult, GameError> {
        let secret = self
            .store
            .get(contract_address)?
            .ok_or(GameError::SecretNotFound(contract_address))?;
        if caller != claim.creator {
            return Err(GameError::NotCreator);
        }
        if claim.opponent_move == 0 {
            return Err(GameError::OpponentNotReady);
        }
        let opponent_move = Move::try_from(claim.opponent_move)
            .map_err(|e| GameError::Fetch(ChainError::Decode(e.to_string())))?;
        if claimed_move != secret.mv {
            return Err(GameError::IncorrectMove);
        }

        let rps = self.contract(contract_address);
        let stake = rps.stake().await.map_err(GameError::Fetch)?;

        if let Err(e) = rps.simulate_solve(caller, secret.mv, &secret.salt).await {
            warn!(%contract_address, error = %e, "reveal simulation failed");
            return Err(GameError::IncorrectMove);
        }

        let transaction_hash = rps
            .solve(caller, secret.mv, &secret.salt)
            .await
            .map_err(GameError::Transaction)?;
        self.confirm(transaction_hash).await?;

        let result = secret.mv.resolve(opponent_move);
        info!(
            %contract_address,
            your_move = secret.mv.name(),
            opponent_move = opponent_move.name(),
            %result,
            "move revealed"
        );

        Ok(RevealResult {
            contract_address,
            your_move: secret.mv,
            opponent_move,
            result,
            stake: format_ether(stake),
            transaction_hash,
        })
    }
}
