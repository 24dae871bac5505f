//! Mock chain client for testing.
//!
//! Simulates the hasher and game contracts in memory, with a controllable
//! clock, account balances and failure injection.

use super::traits::{ChainClient, ChainError, TransactionReceipt, TransactionRequest, TxHash};
use crate::abi::{ContractArtifacts, Hasher, RPS};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolInterface};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Init code the mock recognises as the hasher contract
pub const MOCK_HASHER_CODE: &[u8] = b"mock:hasher";
/// Init code the mock recognises as the game contract
pub const MOCK_GAME_CODE: &[u8] = b"mock:rps";
/// Timeout of the simulated game contract, in seconds
pub const MOCK_TIMEOUT_SECS: u64 = 300;

/// State of a simulated game contract
#[derive(Clone, Debug)]
struct MockGame {
    j1: Address,
    j2: Address,
    c1_hash: B256,
    c2: u8,
    stake: U256,
    last_action: u64,
}

#[derive(Clone, Debug)]
enum MockContract {
    Hasher,
    Game(MockGame),
}

/// Result of executing a transaction against the mock state
struct Execution {
    output: Vec<u8>,
    created: Option<Address>,
}

#[derive(Clone, Debug)]
struct MockState {
    now: u64,
    block_number: u64,
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, MockContract>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    deployments: usize,
    /// Deployment indices that confirm without producing a contract
    drop_address_on: HashSet<usize>,
    /// Hasher calls answer with bytes that do not decode as a `bytes32`
    malformed_hasher: bool,
    offline: bool,
    sent: Vec<TransactionRequest>,
}

/// In-memory mock chain for testing
#[derive(Clone)]
pub struct MockChainClient {
    state: Arc<Mutex<MockState>>,
}

impl MockChainClient {
    /// Create a new mock chain whose clock starts at the current wall-clock time
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::with_time(now)
    }

    /// Create a new mock chain with the clock set to `now` (unix seconds)
    pub fn with_time(now: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                now,
                block_number: 1,
                nonces: HashMap::new(),
                balances: HashMap::new(),
                contracts: HashMap::new(),
                receipts: HashMap::new(),
                deployments: 0,
                drop_address_on: HashSet::new(),
                malformed_hasher: false,
                offline: false,
                sent: Vec::new(),
            })),
        }
    }

    /// Artifacts whose init code this mock knows how to deploy
    pub fn artifacts() -> ContractArtifacts {
        ContractArtifacts::new(MOCK_HASHER_CODE.to_vec(), MOCK_GAME_CODE.to_vec())
    }

    /// Credit `amount` wei to `account`
    pub fn fund(&self, account: Address, amount: U256) {
        let mut state = self.state.lock().unwrap();
        let balance = state.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Get the balance of `account`
    pub fn balance_of(&self, account: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    /// Current simulated block time
    pub fn now(&self) -> u64 {
        self.state.lock().unwrap().now
    }

    /// Advance the simulated clock by `seconds`
    pub fn advance_time(&self, seconds: u64) {
        self.state.lock().unwrap().now += seconds;
    }

    /// Make the `index`-th deployment on this chain (0-based) confirm without
    /// a contract address
    pub fn drop_contract_address_on_deployment(&self, index: usize) {
        self.state.lock().unwrap().drop_address_on.insert(index);
    }

    /// Number of deployment transactions mined so far
    pub fn deployment_count(&self) -> usize {
        self.state.lock().unwrap().deployments
    }

    /// Every transaction submitted so far, in order
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Make every hasher call return a truncated word
    pub fn set_malformed_hasher_output(&self, malformed: bool) {
        self.state.lock().unwrap().malformed_hasher = malformed;
    }

    /// When offline, every request fails with a network error
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Whether a contract lives at `address`
    pub fn has_contract(&self, address: Address) -> bool {
        self.state.lock().unwrap().contracts.contains_key(&address)
    }
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

fn address_word(address: Address) -> Vec<u8> {
    address.into_word().to_vec()
}

fn uint_word(value: U256) -> Vec<u8> {
    value.to_be_bytes::<32>().to_vec()
}

/// keccak256(abi.encodePacked(uint8 c, uint256 salt))
fn packed_hash(c: u8, salt: U256) -> B256 {
    let mut buf = Vec::with_capacity(33);
    buf.push(c);
    buf.extend_from_slice(&salt.to_be_bytes::<32>());
    keccak256(&buf)
}

/// The game contract's own winner rule
fn wins(c1: u8, c2: u8) -> bool {
    if c1 == c2 || c1 == 0 {
        false
    } else if c1 % 2 == c2 % 2 {
        c1 < c2
    } else {
        c1 > c2
    }
}

fn require(condition: bool, reason: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

impl MockState {
    fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), String> {
        let balance = self.balances.entry(account).or_default();
        if *balance < amount {
            return Err("insufficient funds".to_string());
        }
        *balance -= amount;
        Ok(())
    }

    fn execute(&mut self, request: &TransactionRequest, nonce: u64) -> Result<Execution, String> {
        self.debit(request.from, request.value)?;

        let Some(to) = request.to else {
            return self.deploy(request, nonce);
        };

        let now = self.now;
        let malformed_hasher = self.malformed_hasher;
        let mut payouts = Vec::new();
        let output = match self.contracts.get_mut(&to) {
            // Calls to an account without code succeed and return nothing
            None => Vec::new(),
            Some(MockContract::Hasher) => {
                let call = Hasher::hashCall::abi_decode(&request.data, true)
                    .map_err(|e| e.to_string())?;
                let hash = packed_hash(call._c, call._salt);
                if malformed_hasher {
                    hash[..7].to_vec()
                } else {
                    hash.to_vec()
                }
            }
            Some(MockContract::Game(game)) => {
                let call =
                    RPS::RPSCalls::abi_decode(&request.data, true).map_err(|e| e.to_string())?;
                execute_game(game, call, request, now, &mut payouts)?
            }
        };
        for (account, amount) in payouts {
            self.credit(account, amount);
        }

        Ok(Execution {
            output,
            created: None,
        })
    }

    fn deploy(&mut self, request: &TransactionRequest, nonce: u64) -> Result<Execution, String> {
        let index = self.deployments;
        self.deployments += 1;

        let contract = if request.data[..] == *MOCK_HASHER_CODE {
            MockContract::Hasher
        } else if let Some(args) = request.data.strip_prefix(MOCK_GAME_CODE) {
            require(args.len() == 64, "bad constructor arguments")?;
            MockContract::Game(MockGame {
                j1: request.from,
                j2: Address::from_slice(&args[44..64]),
                c1_hash: B256::from_slice(&args[..32]),
                c2: 0,
                stake: request.value,
                last_action: self.now,
            })
        } else {
            return Err("unknown init code".to_string());
        };

        if self.drop_address_on.contains(&index) {
            debug!(index, "mock deployment confirmed without contract address");
            return Ok(Execution {
                output: Vec::new(),
                created: None,
            });
        }

        let address = request.from.create(nonce);
        self.contracts.insert(address, contract);
        Ok(Execution {
            output: Vec::new(),
            created: Some(address),
        })
    }
}

fn execute_game(
    game: &mut MockGame,
    call: RPS::RPSCalls,
    request: &TransactionRequest,
    now: u64,
    payouts: &mut Vec<(Address, U256)>,
) -> Result<Vec<u8>, String> {
    let timed_out = now > game.last_action + MOCK_TIMEOUT_SECS;
    let output = match call {
        RPS::RPSCalls::j1(_) => address_word(game.j1),
        RPS::RPSCalls::j2(_) => address_word(game.j2),
        RPS::RPSCalls::c2(_) => uint_word(U256::from(game.c2)),
        RPS::RPSCalls::stake(_) => uint_word(game.stake),
        RPS::RPSCalls::lastAction(_) => uint_word(U256::from(game.last_action)),
        RPS::RPSCalls::TIMEOUT(_) => uint_word(U256::from(MOCK_TIMEOUT_SECS)),
        RPS::RPSCalls::play(play) => {
            require(game.c2 == 0, "already played")?;
            require((1..=5).contains(&play._c2), "invalid move")?;
            require(request.value == game.stake, "stake mismatch")?;
            require(request.from == game.j2, "not j2")?;
            game.c2 = play._c2;
            game.last_action = now;
            Vec::new()
        }
        RPS::RPSCalls::solve(solve) => {
            require((1..=5).contains(&solve._c1), "invalid move")?;
            require(game.c2 != 0, "j2 has not played")?;
            require(request.from == game.j1, "not j1")?;
            require(
                packed_hash(solve._c1, solve._salt) == game.c1_hash,
                "commitment mismatch",
            )?;
            let pot = game.stake * U256::from(2u8);
            if wins(solve._c1, game.c2) {
                payouts.push((game.j1, pot));
            } else if wins(game.c2, solve._c1) {
                payouts.push((game.j2, pot));
            } else {
                payouts.push((game.j1, game.stake));
                payouts.push((game.j2, game.stake));
            }
            game.stake = U256::ZERO;
            Vec::new()
        }
        RPS::RPSCalls::j1Timeout(_) => {
            require(game.c2 != 0, "j2 has not played")?;
            require(timed_out, "timeout not reached")?;
            payouts.push((game.j2, game.stake * U256::from(2u8)));
            game.stake = U256::ZERO;
            Vec::new()
        }
        RPS::RPSCalls::j2Timeout(_) => {
            require(game.c2 == 0, "j2 already played")?;
            require(timed_out, "timeout not reached")?;
            payouts.push((game.j1, game.stake));
            game.stake = U256::ZERO;
            Vec::new()
        }
    };
    Ok(output)
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, ChainError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(ChainError::NetworkError("mock chain offline".to_string()));
        }

        let nonce = state.nonces.get(&request.from).copied().unwrap_or_default();
        let mut scratch = state.clone();
        scratch
            .execute(request, nonce)
            .map(|execution| Bytes::from(execution.output))
            .map_err(ChainError::Reverted)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(ChainError::NetworkError("mock chain offline".to_string()));
        }

        let balance = state.balances.get(&request.from).copied().unwrap_or_default();
        if balance < request.value {
            return Err(ChainError::Reverted(
                "insufficient funds for transfer".to_string(),
            ));
        }

        let nonce = state.nonces.get(&request.from).copied().unwrap_or_default();
        state.nonces.insert(request.from, nonce + 1);

        let mut preimage = request.from.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(&request.data);
        let tx_hash = keccak256(&preimage);

        // Execute against a copy so a revert leaves no trace besides the nonce
        let mut scratch = state.clone();
        let (status, contract_address) = match scratch.execute(request, nonce) {
            Ok(execution) => {
                *state = scratch;
                (true, execution.created)
            }
            Err(reason) => {
                debug!(%tx_hash, reason = %reason, "mock transaction reverted");
                (false, None)
            }
        };

        let block_number = state.block_number;
        state.block_number += 1;
        state.receipts.insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number,
                status,
                contract_address,
            },
        );
        state.sent.push(request.clone());

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(ChainError::NetworkError("mock chain offline".to_string()));
        }
        state
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or(ChainError::TransactionNotFound(tx_hash))
    }
}
