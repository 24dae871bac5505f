//! Typed wrappers over the hasher and game contracts.

use crate::chain::{ChainClient, ChainError, Hasher, TransactionRequest, TxHash, RPS};
use crate::crypto::{CommitmentHasher, Salt};
use crate::games::Move;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

fn decode_error(e: alloy_sol_types::Error) -> ChainError {
    ChainError::Decode(e.to_string())
}

fn to_u64(value: U256, field: &str) -> Result<u64, ChainError> {
    u64::try_from(value).map_err(|_| ChainError::Decode(format!("{field} out of range: {value}")))
}

/// A deployed hasher contract, used as the commitment oracle
pub struct HasherContract<'a> {
    chain: &'a dyn ChainClient,
    address: Address,
}

impl<'a> HasherContract<'a> {
    pub fn new(chain: &'a dyn ChainClient, address: Address) -> Self {
        Self { chain, address }
    }
}

#[async_trait]
impl CommitmentHasher for HasherContract<'_> {
    async fn hash(&self, mv: Move, salt: &Salt) -> Result<B256, ChainError> {
        let call = Hasher::hashCall {
            _c: mv.as_u8(),
            _salt: salt.as_u256(),
        };
        let out = self
            .chain
            .call(&TransactionRequest::read(self.address, call.abi_encode()))
            .await?;
        let ret = Hasher::hashCall::abi_decode_returns(&out, true).map_err(decode_error)?;
        Ok(ret._0)
    }
}

/// A deployed game contract
pub struct RpsContract<'a> {
    chain: &'a dyn ChainClient,
    address: Address,
}

impl<'a> RpsContract<'a> {
    pub fn new(chain: &'a dyn ChainClient, address: Address) -> Self {
        Self { chain, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let out = self
            .chain
            .call(&TransactionRequest::read(self.address, call.abi_encode()))
            .await?;
        C::abi_decode_returns(&out, true).map_err(decode_error)
    }

    async fn submit<C: SolCall>(
        &self,
        from: Address,
        call: C,
        value: U256,
    ) -> Result<TxHash, ChainError> {
        let request =
            TransactionRequest::call(from, self.address, call.abi_encode()).with_value(value);
        self.chain.send_transaction(&request).await
    }

    /// Creator
    pub async fn j1(&self) -> Result<Address, ChainError> {
        Ok(self.read(RPS::j1Call {}).await?._0)
    }

    /// Invited opponent
    pub async fn j2(&self) -> Result<Address, ChainError> {
        Ok(self.read(RPS::j2Call {}).await?._0)
    }

    /// Opponent's move, 0 until played
    pub async fn c2(&self) -> Result<u8, ChainError> {
        Ok(self.read(RPS::c2Call {}).await?._0)
    }

    /// Wei held by the game; zero once paid out
    pub async fn stake(&self) -> Result<U256, ChainError> {
        Ok(self.read(RPS::stakeCall {}).await?._0)
    }

    pub async fn last_action(&self) -> Result<u64, ChainError> {
        to_u64(self.read(RPS::lastActionCall {}).await?._0, "lastAction")
    }

    pub async fn timeout(&self) -> Result<u64, ChainError> {
        to_u64(self.read(RPS::TIMEOUTCall {}).await?._0, "TIMEOUT")
    }

    /// Opponent plays `mv`, matching the stake with `value`
    pub async fn play(&self, from: Address, mv: Move, value: U256) -> Result<TxHash, ChainError> {
        self.submit(from, RPS::playCall { _c2: mv.as_u8() }, value)
            .await
    }

    fn solve_call(mv: Move, salt: &Salt) -> RPS::solveCall {
        RPS::solveCall {
            _c1: mv.as_u8(),
            _salt: salt.as_u256(),
        }
    }

    /// Dry-run `solve` against current state; an error means it would revert
    pub async fn simulate_solve(&self, from: Address, mv: Move, salt: &Salt) -> Result<(), ChainError> {
        let call = Self::solve_call(mv, salt);
        self.chain
            .call(&TransactionRequest::call(from, self.address, call.abi_encode()))
            .await?;
        Ok(())
    }

    /// Creator reveals and the contract pays out
    pub async fn solve(&self, from: Address, mv: Move, salt: &Salt) -> Result<TxHash, ChainError> {
        self.submit(from, Self::solve_call(mv, salt), U256::ZERO).await
    }

    /// Opponent takes the pot because the creator never revealed
    pub async fn j1_timeout(&self, from: Address) -> Result<TxHash, ChainError> {
        self.submit(from, RPS::j1TimeoutCall {}, U256::ZERO).await
    }

    /// Creator takes back the stake because nobody joined
    pub async fn j2_timeout(&self, from: Address) -> Result<TxHash, ChainError> {
        self.submit(from, RPS::j2TimeoutCall {}, U256::ZERO).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainClient;
    use alloy_primitives::{address, keccak256};

    const CREATOR: Address = address!("00000000000000000000000000000000000000a1");

    #[tokio::test]
    async fn test_hasher_contract_returns_packed_keccak() {
        let chain = MockChainClient::new();
        chain.fund(CREATOR, U256::from(10u64).pow(U256::from(18u64)));
        let artifacts = MockChainClient::artifacts();
        let tx = chain
            .send_transaction(&TransactionRequest::deploy(CREATOR, artifacts.hasher_init_code()))
            .await
            .unwrap();
        let hasher_address = chain.wait_for_receipt(tx).await.unwrap().contract_address.unwrap();

        let salt = Salt::from_u256(U256::from(99u64));
        let hash = HasherContract::new(&chain, hasher_address)
            .hash(Move::Lizard, &salt)
            .await
            .unwrap();

        let mut packed = vec![5u8];
        packed.extend_from_slice(&U256::from(99u64).to_be_bytes::<32>());
        assert_eq!(hash, keccak256(&packed));
    }

    #[tokio::test]
    async fn test_hasher_call_to_missing_contract_fails() {
        let chain = MockChainClient::new();
        let result = HasherContract::new(&chain, address!("00000000000000000000000000000000000000ee"))
            .hash(Move::Rock, &Salt::random())
            .await;

        assert!(result.is_err());
    }
}
