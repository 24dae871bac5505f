//! Ethereum JSON-RPC client abstraction.

mod mock;
mod rpc;
mod traits;

pub use mock::MockChainClient;
pub use rpc::{RpcChainClient, RpcConfig};
pub use traits::{ChainClient, ChainError, TransactionReceipt, TransactionRequest, TxHash};
