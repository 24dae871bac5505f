//! RPSLS Demo
//!
//! Plays a full game between two accounts: create, join, reveal. Runs
//! against an in-process mock chain unless `RPSLS_RPC_URL` points at a node,
//! in which case `RPSLS_HASHER_BYTECODE`, `RPSLS_GAME_BYTECODE`,
//! `RPSLS_CREATOR` and `RPSLS_OPPONENT` must also be set. The accounts must
//! be unlocked on the node.
//!
//! Against the mock chain the demo also plays out both timeout paths.

use alloy_primitives::{address, Address, U256};
use rpsls_core::chain::{ChainClient, ContractArtifacts, MockChainClient, RpcChainClient, RpcConfig};
use rpsls_core::config::{artifacts_from_env, secret_store_path_from_env};
use rpsls_core::engine::{derive_timeout, unix_now};
use rpsls_core::protocol::{CreateGameInput, JoinGameInput};
use rpsls_core::units::{format_ether, format_time_remaining, parse_address, shorten_address};
use rpsls_core::{FileSecretStore, GameClient, GameConfig, MemorySecretStore, Move, SecretStore};
use std::error::Error;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MOCK_CREATOR: Address = address!("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
const MOCK_OPPONENT: Address = address!("b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2");

fn env_address(var: &str) -> Result<Address, Box<dyn Error>> {
    let raw = std::env::var(var).map_err(|_| format!("{var} is not set"))?;
    parse_address(&raw).ok_or_else(|| format!("{var} is not a valid address: {raw}").into())
}

async fn play_round(
    client: &GameClient,
    creator: Address,
    opponent: Address,
    creator_move: Move,
    opponent_move: Move,
    stake: &str,
) -> Result<(), Box<dyn Error>> {
    info!(
        "{} plays {} against {}",
        shorten_address(&creator),
        creator_move,
        shorten_address(&opponent)
    );

    let created = client
        .create_game(
            creator,
            &CreateGameInput {
                mv: creator_move.as_u8(),
                stake: stake.to_string(),
                opponent: opponent.to_checksum(None),
            },
            |progress| info!(step = ?progress.step, "{}", progress.message),
        )
        .await?;
    let game = created.contract_address;
    info!("Game deployed at {} (commitment {})", game, created.commitment);

    client
        .join_game(
            opponent,
            &JoinGameInput {
                contract_address: game.to_checksum(None),
                mv: opponent_move.as_u8(),
                stake: stake.to_string(),
            },
        )
        .await?;
    let status = client.fetch_status(game).await?;
    info!("{} joined with {}, game is {}", shorten_address(&opponent), opponent_move, status.status);

    let claim = client.fetch_claim_data(game).await?;
    let result = client.reveal_move(game, creator, &claim, creator_move).await?;
    info!(
        "{} vs {}: creator {} ({} ETH at stake)",
        result.your_move, result.opponent_move, result.result, result.stake
    );

    let status = client
        .watch_status(game, client.config().status_poll_interval, |status, _| {
            info!(%status, "game status");
            true
        })
        .await;
    info!("Game {} finished as {}", shorten_address(&game), status);

    Ok(())
}

async fn play_timeouts(
    client: &GameClient,
    chain: &MockChainClient,
    creator: Address,
    opponent: Address,
) -> Result<(), Box<dyn Error>> {
    // Nobody joins: the creator takes the stake back
    let created = client
        .create_game(
            creator,
            &CreateGameInput {
                mv: Move::Lizard.as_u8(),
                stake: "0.01".to_string(),
                opponent: opponent.to_checksum(None),
            },
            |_| {},
        )
        .await?;
    let game = created.contract_address;

    let data = client.fetch_timeout_data(game).await?;
    let state = derive_timeout(&data, creator, chain.now());
    info!("Waiting on opponent: {}", format_time_remaining(state.time_remaining));

    chain.advance_time(data.timeout + 1);
    let state = derive_timeout(&data, creator, chain.now());
    info!("{} (can claim: {})", format_time_remaining(state.time_remaining), state.can_claim);
    client
        .claim_timeout(game, creator, data.creator, data.opponent)
        .await?;
    info!("Creator reclaimed stake, balance {} ETH", format_ether(chain.balance_of(creator)));

    // The creator never reveals: the opponent takes the pot
    let created = client
        .create_game(
            creator,
            &CreateGameInput {
                mv: Move::Rock.as_u8(),
                stake: "0.01".to_string(),
                opponent: opponent.to_checksum(None),
            },
            |_| {},
        )
        .await?;
    let game = created.contract_address;
    client
        .join_game(
            opponent,
            &JoinGameInput {
                contract_address: game.to_checksum(None),
                mv: Move::Paper.as_u8(),
                stake: "0.01".to_string(),
            },
        )
        .await?;

    chain.advance_time(301);
    let data = client.fetch_timeout_data(game).await?;
    client
        .claim_timeout(game, opponent, data.creator, data.opponent)
        .await?;
    info!("Opponent claimed the pot, balance {} ETH", format_ether(chain.balance_of(opponent)));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GameConfig::from_env();
    let store: Arc<dyn SecretStore> = match secret_store_path_from_env() {
        Some(path) => {
            info!("Storing secrets in {}", path.display());
            Arc::new(FileSecretStore::new(path))
        }
        None => Arc::new(MemorySecretStore::new()),
    };

    if let Some(rpc_config) = RpcConfig::from_env() {
        info!("Using node at {}", rpc_config.rpc_url);
        let artifacts: ContractArtifacts = artifacts_from_env()?
            .ok_or("RPSLS_HASHER_BYTECODE and RPSLS_GAME_BYTECODE must be set")?;
        let creator = env_address("RPSLS_CREATOR")?;
        let opponent = env_address("RPSLS_OPPONENT")?;

        let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(rpc_config));
        let client = GameClient::new(chain, store.clone(), artifacts, config);
        play_round(&client, creator, opponent, Move::Spock, Move::Scissors, "0.001").await?;
    } else {
        info!("Using MockChainClient (set RPSLS_RPC_URL to play against a node)");
        let chain = Arc::new(MockChainClient::with_time(unix_now()));
        let funds = U256::from(10u64).pow(U256::from(18u64));
        chain.fund(MOCK_CREATOR, funds);
        chain.fund(MOCK_OPPONENT, funds);

        let client = GameClient::new(
            chain.clone(),
            store.clone(),
            MockChainClient::artifacts(),
            config,
        );
        play_round(&client, MOCK_CREATOR, MOCK_OPPONENT, Move::Spock, Move::Scissors, "0.1").await?;
        play_round(&client, MOCK_CREATOR, MOCK_OPPONENT, Move::Paper, Move::Lizard, "0.1").await?;
        play_timeouts(&client, &chain, MOCK_CREATOR, MOCK_OPPONENT).await?;
    }

    let games = store.list_keys()?;
    if !games.is_empty() {
        info!("{} game secrets kept in the store", games.len());
    }
    Ok(())
}
