//! An in-process chain with instant confirmations.
//!
//! Every transaction is mined into its own block as soon as it is sent.
//! Contract addresses follow the regular `CREATE` derivation from the deployer
//! address and nonce, so two chains with different deployers never share an
//! address. Used by `--dry-run` and by the test-suite, which also relies on the
//! recorded transaction trace and on failure injection.

use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_core::primitives::{Address, B256, keccak256};
use anyhow::Result;

use super::{ChainClient, Receipt, TxRequest};

/// A transaction as seen by the [`InMemoryChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTx {
    /// Position in the chain's transaction log.
    pub index: usize,
    pub request: TxRequest,
    pub receipt: Receipt,
}

#[derive(Debug, Default)]
struct State {
    nonce: u64,
    block_number: u64,
    transactions: Vec<RecordedTx>,
    fail_at: Option<usize>,
    revert_at: Option<usize>,
}

/// A [`ChainClient`] that keeps everything in memory.
#[derive(Debug)]
pub struct InMemoryChain {
    deployer: Address,
    chain_id: u64,
    state: Mutex<State>,
}

impl InMemoryChain {
    /// Chain ID reported by default (the usual dev-node chain ID).
    pub const DEFAULT_CHAIN_ID: u64 = 31337;

    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            chain_id: Self::DEFAULT_CHAIN_ID,
            state: Mutex::new(State::default()),
        }
    }

    /// A chain with a random deployer address.
    pub fn random() -> Self {
        Self::new(Address::from(rand::random::<[u8; 20]>()))
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Start the chain at the given height.
    pub fn with_block_number(self, block_number: u64) -> Self {
        self.lock().block_number = block_number;
        self
    }

    /// Make the `index`-th submitted transaction fail at submission time.
    pub fn fail_transaction(self, index: usize) -> Self {
        self.lock().fail_at = Some(index);
        self
    }

    /// Make the `index`-th submitted transaction get mined with a failed status.
    pub fn revert_transaction(self, index: usize) -> Self {
        self.lock().revert_at = Some(index);
        self
    }

    /// All transactions accepted so far, in submission order.
    pub fn transactions(&self) -> Vec<RecordedTx> {
        self.lock().transactions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChainClient for InMemoryChain {
    fn deployer(&self) -> Address {
        self.deployer
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256> {
        let mut state = self.lock();
        let index = state.transactions.len();

        if state.fail_at == Some(index) {
            anyhow::bail!("Transaction #{} rejected by the network", index);
        }

        let nonce = state.nonce;
        state.nonce += 1;
        state.block_number += 1;

        let success = state.revert_at != Some(index);
        let contract_address = (tx.is_create() && success).then(|| self.deployer.create(nonce));

        let mut preimage = self.deployer.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let transaction_hash = keccak256(preimage);

        let receipt = Receipt {
            transaction_hash,
            block_number: state.block_number,
            success,
            contract_address,
        };

        state.transactions.push(RecordedTx {
            index,
            request: tx,
            receipt,
        });

        Ok(transaction_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt> {
        self.lock()
            .transactions
            .iter()
            .find(|tx| tx.receipt.transaction_hash == tx_hash)
            .map(|tx| tx.receipt.clone())
            .ok_or_else(|| anyhow::anyhow!("Unknown transaction {}", tx_hash))
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.lock().block_number)
    }
}
