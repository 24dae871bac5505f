//! Game state reads.

use super::GameClient;
use crate::config::DEFAULT_STATUS_POLL;
use crate::error::GameError;
use crate::protocol::{GameInfo, GameStatus};
use alloy_primitives::Address;
use std::time::Duration;
use tracing::{debug, warn};

impl GameClient {
    /// Read the game's participants, stake and progress in one round of
    /// concurrent calls and derive its status.
    pub async fn fetch_status(&self, contract_address: Address) -> Result<GameInfo, GameError> {
        let result = self.read_status(contract_address).await;
        if let Err(e) = &result {
            warn!(%contract_address, error = %e, "failed to fetch game status");
        }
        result
    }

    async fn read_status(&self, contract_address: Address) -> Result<GameInfo, GameError> {
        let rps = self.contract(contract_address);
        let (creator, opponent, opponent_move, stake, last_action) = tokio::try_join!(
            rps.j1(),
            rps.j2(),
            rps.c2(),
            rps.stake(),
            rps.last_action()
        )
        .map_err(GameError::Fetch)?;

        let status = GameStatus::derive(opponent, opponent_move, stake);
        debug!(%contract_address, %status, "fetched game status");

        Ok(GameInfo {
            contract_address,
            creator,
            opponent,
            stake,
            status,
            last_action,
        })
    }

    /// Poll the game every `interval` and report each status.
    ///
    /// A zero interval polls at [`DEFAULT_STATUS_POLL`] instead.
    /// A failed poll is reported as [`GameStatus::Error`] with no info.
    /// Polling stops when the game completes or `on_update` returns `false`;
    /// the last status seen is returned.
    pub async fn watch_status<F>(
        &self,
        contract_address: Address,
        interval: Duration,
        mut on_update: F,
    ) -> GameStatus
    where
        F: FnMut(GameStatus, Option<&GameInfo>) -> bool + Send,
    {
        let interval = if interval.is_zero() {
            warn!(%contract_address, "zero poll interval, using the default");
            DEFAULT_STATUS_POLL
        } else {
            interval
        };
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let (status, keep_going) = match self.fetch_status(contract_address).await {
                Ok(info) => (info.status, on_update(info.status, Some(&info))),
                Err(e) => {
                    debug!(%contract_address, error = %e, "status poll failed");
                    (GameStatus::Error, on_update(GameStatus::Error, None))
                }
            };
            if status == GameStatus::Completed || !keep_going {
                return status;
            }
        }
    }
}
