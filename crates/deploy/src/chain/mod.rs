//! Transaction submission layer.
//!
//! The orchestration core talks to the network exclusively through
//! [`ChainClient`]. Two implementations ship with the crate:
//! - [`HttpChain`]: JSON-RPC over HTTP, signing locally with a [`Wallet`].
//! - [`InMemoryChain`]: an instant-confirmation chain used for dry runs and tests.

mod http;
mod memory;
mod wallet;

use std::future::Future;

use alloy_core::primitives::{Address, B256, Bytes};

pub use http::{HttpChain, HttpChainConfig};
pub use memory::{InMemoryChain, RecordedTx};
pub use wallet::Wallet;

/// A transaction to be signed and submitted by the deployer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Call target. `None` creates a contract.
    pub to: Option<Address>,
    /// Calldata, or init code for a creation.
    pub input: Bytes,
}

impl TxRequest {
    pub fn create(init_code: Bytes) -> Self {
        Self {
            to: None,
            input: init_code,
        }
    }

    pub fn call(to: Address, calldata: Bytes) -> Self {
        Self {
            to: Some(to),
            input: calldata,
        }
    }

    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// The confirmed outcome of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// Whether execution succeeded.
    pub success: bool,
    /// Set for successful contract creations.
    pub contract_address: Option<Address>,
}

/// An authenticated connection to a single network, bound to a single signer.
///
/// Nonce sequencing for transactions from the signer is the responsibility of
/// the implementation.
pub trait ChainClient: Send + Sync {
    /// The signer's address.
    fn deployer(&self) -> Address;

    /// The chain ID of the connected network.
    fn chain_id(&self) -> u64;

    /// Sign and submit a transaction, returning its hash once accepted by the node.
    fn send_transaction(&self, tx: TxRequest) -> impl Future<Output = anyhow::Result<B256>> + Send;

    /// Wait until the transaction is included and return its receipt.
    fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = anyhow::Result<Receipt>> + Send;

    /// The current block height.
    fn block_number(&self) -> impl Future<Output = anyhow::Result<u64>> + Send;
}
