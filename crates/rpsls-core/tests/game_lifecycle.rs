//! Integration tests for the full game lifecycle against the mock chain.
//!
//! Run with: cargo test -p rpsls-core --test game_lifecycle

use alloy_primitives::{address, Address, B256, U256};
use rpsls_core::engine::{derive_timeout, game_timeout_info};
use rpsls_core::protocol::{
    CreateGameInput, CreatedGame, DeploymentProgress, DeploymentStep, GameStatus, JoinGameInput,
    TimeoutPhase,
};
use rpsls_core::config::DEFAULT_STATUS_POLL;
use rpsls_core::units::parse_ether;
use rpsls_core::{
    ChainError, Commitment, DeploymentTarget, GameClient, GameConfig, GameError, GameOutcome,
    MemorySecretStore, MockChainClient, Move, Salt, SecretRecord, SecretStore,
};
use std::sync::Arc;
use std::time::Duration;

const CREATOR: Address = address!("1000000000000000000000000000000000000001");
const OPPONENT: Address = address!("2000000000000000000000000000000000000002");
const STRANGER: Address = address!("3000000000000000000000000000000000000003");

const START_TIME: u64 = 1_700_000_000;

struct Harness {
    chain: Arc<MockChainClient>,
    store: Arc<MemorySecretStore>,
    client: GameClient,
}

fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

fn setup() -> Harness {
    let chain = Arc::new(MockChainClient::with_time(START_TIME));
    chain.fund(CREATOR, ether("10"));
    chain.fund(OPPONENT, ether("10"));
    let store = Arc::new(MemorySecretStore::new());
    let client = GameClient::new(
        chain.clone(),
        store.clone(),
        MockChainClient::artifacts(),
        GameConfig::default(),
    );
    Harness {
        chain,
        store,
        client,
    }
}

fn create_input(mv: Move, stake: &str) -> CreateGameInput {
    CreateGameInput {
        mv: mv.as_u8(),
        stake: stake.to_string(),
        opponent: OPPONENT.to_checksum(None),
    }
}

async fn create(h: &Harness, mv: Move, stake: &str) -> CreatedGame {
    h.client
        .create_game(CREATOR, &create_input(mv, stake), |_| {})
        .await
        .unwrap()
}

async fn join(h: &Harness, game: Address, mv: Move, stake: &str) {
    h.client
        .join_game(
            OPPONENT,
            &JoinGameInput {
                contract_address: game.to_checksum(None),
                mv: mv.as_u8(),
                stake: stake.to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_game_reports_every_step_in_order() {
    let h = setup();
    let mut progress: Vec<DeploymentProgress> = Vec::new();

    let created = h
        .client
        .create_game(CREATOR, &create_input(Move::Spock, "0.1"), |p| {
            progress.push(p.clone())
        })
        .await
        .unwrap();

    let steps: Vec<DeploymentStep> = progress.iter().map(|p| p.step).collect();
    assert_eq!(
        steps,
        vec![
            DeploymentStep::DeployingHasher,
            DeploymentStep::WaitingHasher,
            DeploymentStep::GeneratingCommitment,
            DeploymentStep::DeployingRps,
            DeploymentStep::WaitingRps,
            DeploymentStep::StoringData,
            DeploymentStep::Completed,
        ]
    );
    assert!(progress[1].tx_hash.is_some());
    assert_eq!(progress[4].tx_hash, Some(created.transaction_hash));
    assert_eq!(progress[6].message, "Game created successfully!");

    let record = h.store.get(created.contract_address).unwrap().unwrap();
    assert_eq!(record.mv, Move::Spock);
    assert_eq!(record.commitment, created.commitment);
    assert!(h.chain.has_contract(created.hasher_address));

    let info = h.client.fetch_status(created.contract_address).await.unwrap();
    assert_eq!(info.status, GameStatus::Waiting);
    assert_eq!(info.creator, CREATOR);
    assert_eq!(info.opponent, OPPONENT);
    assert_eq!(info.stake, ether("0.1"));
    assert_eq!(info.last_action, START_TIME);
    assert_eq!(h.chain.balance_of(CREATOR), ether("9.9"));
}

#[tokio::test]
async fn test_invalid_input_never_touches_the_chain() {
    let h = setup();
    let mut steps = 0;

    let err = h
        .client
        .create_game(
            CREATOR,
            &CreateGameInput {
                mv: 0,
                stake: "0.00001".to_string(),
                opponent: CREATOR.to_checksum(None),
            },
            |_| steps += 1,
        )
        .await
        .unwrap_err();

    let errors = match err {
        GameError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(errors.len(), 3);
    assert_eq!(steps, 0);
    assert!(h.chain.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_missing_hasher_address_aborts_creation() {
    let h = setup();
    h.chain.drop_contract_address_on_deployment(0);
    let mut steps = Vec::new();

    let err = h
        .client
        .create_game(CREATOR, &create_input(Move::Rock, "0.1"), |p| steps.push(p.step))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GameError::Deployment {
            target: DeploymentTarget::Hasher,
            ..
        }
    ));
    assert_eq!(steps.last(), Some(&DeploymentStep::WaitingHasher));
    assert_eq!(h.chain.sent_transactions().len(), 1);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_missing_game_address_stores_nothing() {
    let h = setup();
    h.chain.drop_contract_address_on_deployment(1);
    let mut steps = Vec::new();

    let err = h
        .client
        .create_game(CREATOR, &create_input(Move::Rock, "0.1"), |p| steps.push(p.step))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GameError::Deployment {
            target: DeploymentTarget::Game,
            ..
        }
    ));
    assert!(!steps.contains(&DeploymentStep::StoringData));
    assert!(!steps.contains(&DeploymentStep::Completed));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_unfunded_game_deployment_is_a_deployment_error() {
    let h = setup();
    let mut steps = Vec::new();

    // STRANGER has no balance: the hasher costs nothing, the stake cannot be paid
    let err = h
        .client
        .create_game(STRANGER, &create_input(Move::Paper, "0.1"), |p| steps.push(p.step))
        .await
        .unwrap_err();

    match err {
        GameError::Deployment { target, reason } => {
            assert_eq!(target, DeploymentTarget::Game);
            assert!(reason.contains("insufficient funds"));
        }
        other => panic!("expected a deployment error, got {other:?}"),
    }
    assert_eq!(steps.last(), Some(&DeploymentStep::DeployingRps));
    assert_eq!(h.chain.sent_transactions().len(), 1);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_offline_node_fails_hasher_deployment() {
    let h = setup();
    h.chain.set_offline(true);

    let err = h
        .client
        .create_game(CREATOR, &create_input(Move::Rock, "0.1"), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GameError::Deployment {
            target: DeploymentTarget::Hasher,
            ..
        }
    ));
}

#[tokio::test]
async fn test_malformed_commitment_stops_before_game_deployment() {
    let h = setup();
    h.chain.set_malformed_hasher_output(true);
    let mut steps = Vec::new();

    let err = h
        .client
        .create_game(CREATOR, &create_input(Move::Spock, "0.1"), |p| steps.push(p.step))
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::Commitment(_)));
    assert_eq!(steps.last(), Some(&DeploymentStep::GeneratingCommitment));
    // only the hasher went out
    assert_eq!(h.chain.sent_transactions().len(), 1);
    assert_eq!(h.chain.balance_of(CREATOR), ether("10"));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_creator_wins_and_takes_the_pot() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Scissors, "0.1").await;

    let info = h.client.fetch_status(game).await.unwrap();
    assert_eq!(info.status, GameStatus::Joined);

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    assert_eq!(claim.opponent_move, Move::Scissors.as_u8());

    let result = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Rock)
        .await
        .unwrap();

    assert_eq!(result.result, GameOutcome::Win);
    assert_eq!(result.your_move, Move::Rock);
    assert_eq!(result.opponent_move, Move::Scissors);
    // read before payout zeroed it
    assert_eq!(result.stake, "0.1");

    assert_eq!(h.chain.balance_of(CREATOR), ether("10.1"));
    assert_eq!(h.chain.balance_of(OPPONENT), ether("9.9"));
    let info = h.client.fetch_status(game).await.unwrap();
    assert_eq!(info.status, GameStatus::Completed);
    assert!(info.stake.is_zero());
}

#[tokio::test]
async fn test_opponent_wins() {
    let h = setup();
    let game = create(&h, Move::Paper, "1").await.contract_address;
    join(&h, game, Move::Lizard, "1").await;

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let result = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Paper)
        .await
        .unwrap();

    assert_eq!(result.result, GameOutcome::Loss);
    assert_eq!(h.chain.balance_of(CREATOR), ether("9"));
    assert_eq!(h.chain.balance_of(OPPONENT), ether("11"));
}

#[tokio::test]
async fn test_draw_refunds_both() {
    let h = setup();
    let game = create(&h, Move::Spock, "0.5").await.contract_address;
    join(&h, game, Move::Spock, "0.5").await;

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let result = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Spock)
        .await
        .unwrap();

    assert_eq!(result.result, GameOutcome::Draw);
    assert_eq!(h.chain.balance_of(CREATOR), ether("10"));
    assert_eq!(h.chain.balance_of(OPPONENT), ether("10"));
}

#[tokio::test]
async fn test_reveal_without_stored_secret() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Paper, "0.1").await;
    h.store.remove(game).unwrap();

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let err = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Rock)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::SecretNotFound(addr) if addr == game));
}

#[tokio::test]
async fn test_only_creator_can_reveal() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Paper, "0.1").await;

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let err = h
        .client
        .reveal_move(game, OPPONENT, &claim, Move::Rock)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::NotCreator));
}

#[tokio::test]
async fn test_reveal_before_opponent_plays() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let err = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Rock)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::OpponentNotReady));
}

#[tokio::test]
async fn test_wrong_claimed_move_sends_nothing() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Paper, "0.1").await;
    let sent = h.chain.sent_transactions().len();

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let err = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Lizard)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::IncorrectMove));
    assert_eq!(h.chain.sent_transactions().len(), sent);
    assert_eq!(
        h.client.fetch_status(game).await.unwrap().status,
        GameStatus::Joined
    );
}

#[tokio::test]
async fn test_failed_simulation_is_incorrect_move() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Paper, "0.1").await;

    // Same move, wrong salt: only the contract can tell
    h.store
        .store(
            game,
            &SecretRecord::new(
                Move::Rock,
                Salt::from_u256(U256::from(1u64)),
                Commitment::from_b256(B256::ZERO),
            ),
        )
        .unwrap();
    let sent = h.chain.sent_transactions().len();

    let claim = h.client.fetch_claim_data(game).await.unwrap();
    let err = h
        .client
        .reveal_move(game, CREATOR, &claim, Move::Rock)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::IncorrectMove));
    assert_eq!(h.chain.sent_transactions().len(), sent);
}

#[tokio::test]
async fn test_join_requires_exact_stake() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let err = h
        .client
        .join_game(
            OPPONENT,
            &JoinGameInput {
                contract_address: game.to_checksum(None),
                mv: Move::Paper.as_u8(),
                stake: "0.2".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::StakeMismatch { ref expected } if expected == "0.1"));
}

#[tokio::test]
async fn test_join_by_stranger_or_twice_is_rejected() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    let input = JoinGameInput {
        contract_address: game.to_checksum(None),
        mv: Move::Paper.as_u8(),
        stake: "0.1".to_string(),
    };

    let err = h.client.join_game(STRANGER, &input).await.unwrap_err();
    assert!(matches!(err, GameError::NotOpponent));

    h.client.join_game(OPPONENT, &input).await.unwrap();
    let err = h.client.join_game(OPPONENT, &input).await.unwrap_err();
    assert!(matches!(err, GameError::NotJoinable(GameStatus::Joined)));
}

#[tokio::test]
async fn test_fetch_status_failures() {
    let h = setup();

    let err = h
        .client
        .fetch_status(address!("00000000000000000000000000000000000000ee"))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Fetch(ChainError::Decode(_))));

    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    h.chain.set_offline(true);
    let err = h.client.fetch_status(game).await.unwrap_err();
    assert!(matches!(err, GameError::Fetch(ChainError::NetworkError(_))));
}

#[tokio::test]
async fn test_creator_reclaims_stake_when_nobody_joins() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let data = h.client.fetch_timeout_data(game).await.unwrap();
    assert_eq!(data.phase(), TimeoutPhase::Created);
    assert_eq!(data.timeout, 300);
    assert!(!derive_timeout(&data, CREATOR, h.chain.now()).can_claim);

    h.chain.advance_time(301);
    let info = game_timeout_info(game, &data, CREATOR, h.chain.now());
    assert_eq!(info.time_remaining, 0);
    assert!(info.can_claim);

    h.client
        .claim_timeout(game, CREATOR, data.creator, data.opponent)
        .await
        .unwrap();

    assert_eq!(h.chain.balance_of(CREATOR), ether("10"));
    let data = h.client.fetch_timeout_data(game).await.unwrap();
    assert_eq!(data.phase(), TimeoutPhase::Revealed);
}

#[tokio::test]
async fn test_opponent_takes_pot_when_creator_stalls() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Paper, "0.1").await;

    h.chain.advance_time(301);
    let data = h.client.fetch_timeout_data(game).await.unwrap();
    assert_eq!(data.phase(), TimeoutPhase::Joined);
    assert!(derive_timeout(&data, OPPONENT, h.chain.now()).can_claim);

    h.client
        .claim_timeout(game, OPPONENT, data.creator, data.opponent)
        .await
        .unwrap();

    assert_eq!(h.chain.balance_of(OPPONENT), ether("10.1"));
    assert_eq!(h.chain.balance_of(CREATOR), ether("9.9"));
}

#[tokio::test]
async fn test_stranger_cannot_claim_timeout() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    h.chain.advance_time(301);
    let sent = h.chain.sent_transactions().len();

    let data = h.client.fetch_timeout_data(game).await.unwrap();
    assert!(!derive_timeout(&data, STRANGER, h.chain.now()).can_claim);

    let err = h
        .client
        .claim_timeout(game, STRANGER, data.creator, data.opponent)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::NotParticipant));
    assert_eq!(h.chain.sent_transactions().len(), sent);
}

#[tokio::test]
async fn test_early_timeout_claim_reverts() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let err = h
        .client
        .claim_timeout(game, CREATOR, CREATOR, OPPONENT)
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::Transaction(ChainError::Reverted(_))));
    assert_eq!(
        h.client.fetch_status(game).await.unwrap().status,
        GameStatus::Waiting
    );
}

#[tokio::test(start_paused = true)]
async fn test_watch_status_stops_on_completion() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;
    join(&h, game, Move::Scissors, "0.1").await;
    let claim = h.client.fetch_claim_data(game).await.unwrap();
    h.client
        .reveal_move(game, CREATOR, &claim, Move::Rock)
        .await
        .unwrap();

    let mut seen = Vec::new();
    let last = h
        .client
        .watch_status(game, Duration::from_secs(5), |status, _| {
            seen.push(status);
            true
        })
        .await;

    assert_eq!(last, GameStatus::Completed);
    assert_eq!(seen, vec![GameStatus::Completed]);
}

#[tokio::test(start_paused = true)]
async fn test_watch_status_reports_poll_errors() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let mut seen = Vec::new();
    let chain = h.chain.clone();
    let last = h
        .client
        .watch_status(game, Duration::from_secs(5), |status, info| {
            seen.push((status, info.is_some()));
            // take the node down after the first poll
            chain.set_offline(true);
            seen.len() < 2
        })
        .await;

    assert_eq!(last, GameStatus::Error);
    assert_eq!(
        seen,
        vec![(GameStatus::Waiting, true), (GameStatus::Error, false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_watch_status_with_zero_interval_uses_default() {
    let h = setup();
    let game = create(&h, Move::Rock, "0.1").await.contract_address;

    let started = tokio::time::Instant::now();
    let mut polls = 0;
    let last = h
        .client
        .watch_status(game, Duration::ZERO, |_, _| {
            polls += 1;
            polls < 2
        })
        .await;

    assert_eq!(last, GameStatus::Waiting);
    assert_eq!(polls, 2);
    assert_eq!(started.elapsed(), DEFAULT_STATUS_POLL);
}
