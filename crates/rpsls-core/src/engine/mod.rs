//! Game engines: creation, status, join, reveal and timeout claims.
//!
//! All engines hang off [`GameClient`], which owns the chain client, the
//! secret store and the deployment settings.

mod create;
mod join;
mod reveal;
mod status;
mod timeout;

pub use create::{validate_create_game, ValidatedGame};
pub use join::{validate_join_game, ValidatedJoin};
pub use timeout::{countdown, derive_timeout, game_timeout_info, unix_now};

use crate::chain::{ChainClient, ChainError, ContractArtifacts, TxHash};
use crate::config::GameConfig;
use crate::contract::RpsContract;
use crate::error::GameError;
use crate::store::SecretStore;
use alloy_primitives::Address;
use std::sync::Arc;
use tracing::warn;

/// Entry point for every game operation
pub struct GameClient {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn SecretStore>,
    artifacts: ContractArtifacts,
    config: GameConfig,
}

impl GameClient {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn SecretStore>,
        artifacts: ContractArtifacts,
        config: GameConfig,
    ) -> Self {
        Self {
            chain,
            store,
            artifacts,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn SecretStore {
        self.store.as_ref()
    }

    fn contract(&self, address: Address) -> RpsContract<'_> {
        RpsContract::new(self.chain.as_ref(), address)
    }

    /// Wait for a submitted transaction and fail if it reverted
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), GameError> {
        let receipt = self
            .chain
            .wait_for_receipt(tx_hash)
            .await
            .map_err(GameError::Transaction)?;
        if !receipt.status {
            warn!(%tx_hash, "transaction reverted");
            return Err(GameError::Transaction(ChainError::Reverted(format!(
                "transaction {tx_hash} reverted"
            ))));
        }
        Ok(())
    }
}
