//! Timeout countdown and claims.
//!
//! If a player stalls for longer than the contract's timeout, the other
//! participant can settle: the creator reclaims the stake when nobody
//! joined, the opponent takes the pot when the creator never reveals.

use super::GameClient;
use crate::chain::TxHash;
use crate::error::GameError;
use crate::protocol::{TimeoutData, TimeoutGameInfo, TimeoutState};
use crate::units::format_ether;
use alloy_primitives::Address;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Seconds left before the timeout elapses, and whether `caller` may claim.
///
/// A clock behind `last_action` counts as no time elapsed.
pub fn derive_timeout(data: &TimeoutData, caller: Address, now: u64) -> TimeoutState {
    let elapsed = now.saturating_sub(data.last_action);
    let time_remaining = data.timeout.saturating_sub(elapsed);
    TimeoutState {
        time_remaining,
        can_claim: data.is_participant(caller) && time_remaining == 0,
    }
}

/// Combine contract data with the caller's countdown
pub fn game_timeout_info(
    contract_address: Address,
    data: &TimeoutData,
    caller: Address,
    now: u64,
) -> TimeoutGameInfo {
    let state = derive_timeout(data, caller, now);
    TimeoutGameInfo {
        contract_address,
        creator: data.creator,
        opponent: data.opponent,
        stake: format_ether(data.stake),
        last_action: data.last_action,
        phase: data.phase(),
        timeout_duration: data.timeout,
        time_remaining: state.time_remaining,
        can_claim: state.can_claim,
    }
}

/// Recompute the countdown once a second and report it.
///
/// Stops when the timeout elapses or `on_tick` returns `false`, and
/// returns the last state.
pub async fn countdown<C, F>(
    data: &TimeoutData,
    caller: Address,
    clock: C,
    mut on_tick: F,
) -> TimeoutState
where
    C: Fn() -> u64,
    F: FnMut(&TimeoutState) -> bool,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let state = derive_timeout(data, caller, clock());
        let keep_going = on_tick(&state);
        if state.time_remaining == 0 || !keep_going {
            return state;
        }
    }
}

impl GameClient {
    /// Read the six contract fields the timeout view needs
    pub async fn fetch_timeout_data(
        &self,
        contract_address: Address,
    ) -> Result<TimeoutData, GameError> {
        let result = self.read_timeout_data(contract_address).await;
        if let Err(e) = &result {
            warn!(%contract_address, error = %e, "failed to fetch timeout data");
        }
        result
    }

    async fn read_timeout_data(&self, contract_address: Address) -> Result<TimeoutData, GameError> {
        let rps = self.contract(contract_address);
        let (creator, opponent, stake, opponent_move, last_action, timeout) = tokio::try_join!(
            rps.j1(),
            rps.j2(),
            rps.stake(),
            rps.c2(),
            rps.last_action(),
            rps.timeout()
        )
        .map_err(GameError::Fetch)?;

        Ok(TimeoutData {
            creator,
            opponent,
            stake,
            opponent_move,
            last_action,
            timeout,
        })
    }

    /// Claim the stake after a timeout.
    ///
    /// The creator calls `j2Timeout` (opponent never joined); the opponent
    /// calls `j1Timeout` (creator never revealed). Anyone else is rejected
    /// before a transaction is sent.
    pub async fn claim_timeout(
        &self,
        contract_address: Address,
        caller: Address,
        creator: Address,
        opponent: Address,
    ) -> Result<TxHash, GameError> {
        let result = self
            .submit_timeout_claim(contract_address, caller, creator, opponent)
            .await;
        if let Err(e) = &result {
            warn!(%contract_address, %caller, error = %e, "timeout claim failed");
        }
        result
    }

    async fn submit_timeout_claim(
        &self,
        contract_address: Address,
        caller: Address,
        creator: Address,
        opponent: Address,
    ) -> Result<TxHash, GameError> {
        if caller.is_zero() || (caller != creator && caller != opponent) {
            return Err(GameError::NotParticipant);
        }

        let rps = self.contract(contract_address);
        let tx_hash = if caller == creator {
            rps.j2_timeout(caller).await
        } else {
            rps.j1_timeout(caller).await
        }
        .map_err(GameError::Transaction)?;
        self.confirm(tx_hash).await?;

        info!(%contract_address, %caller, "timeout claimed");
        Ok(tx_hash)
    }
}
