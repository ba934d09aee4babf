//! JSON-RPC chain client signing with a local key.

use std::time::Duration;

use alloy_consensus::TxLegacy;
use alloy_core::primitives::{Address, B256, Bytes, U64, U128, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use url::Url;

use super::{ChainClient, Receipt, TxRequest, Wallet};
use crate::rpc;

/// Tuning knobs for [`HttpChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpChainConfig {
    /// Delay between two receipt polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up waiting for a receipt after this many seconds. Waits forever when unset.
    pub confirmation_timeout_secs: Option<u64>,
    /// Gas limit applied on top of `eth_estimateGas`, in percent.
    pub gas_limit_multiplier_percent: u64,
    /// Timeout of a single RPC request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpChainConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            confirmation_timeout_secs: None,
            gas_limit_multiplier_percent: 120,
            request_timeout_secs: rpc::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    block_number: U64,
    /// Absent on pre-Byzantium chains.
    status: Option<U64>,
    contract_address: Option<Address>,
}

impl From<RpcReceipt> for Receipt {
    fn from(receipt: RpcReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.to(),
            success: receipt.status.is_none_or(|status| status == U64::from(1)),
            contract_address: receipt.contract_address,
        }
    }
}

/// A [`ChainClient`] talking to a JSON-RPC node over HTTP.
///
/// Transactions are signed locally and submitted with `eth_sendRawTransaction`.
/// The nonce is tracked locally, seeded from the pending transaction count.
#[derive(Debug)]
pub struct HttpChain {
    client: reqwest::Client,
    url: Url,
    wallet: Wallet,
    chain_id: u64,
    nonce: Mutex<u64>,
    config: HttpChainConfig,
}

impl HttpChain {
    /// Connect to the node at `url` and prepare to send transactions from `wallet`.
    pub async fn connect(url: Url, wallet: Wallet, config: HttpChainConfig) -> Result<Self> {
        let client = rpc::create_client(Duration::from_secs(config.request_timeout_secs))?;

        let chain_id: U64 = rpc::json_rpc_call(&client, url.as_str(), "eth_chainId", vec![])
            .await
            .with_context(|| format!("Failed to fetch chain ID from {}", url))?;

        let nonce: U64 = rpc::json_rpc_call(
            &client,
            url.as_str(),
            "eth_getTransactionCount",
            vec![json!(wallet.address()), json!("pending")],
        )
        .await
        .context("Failed to fetch deployer nonce")?;

        tracing::info!(
            rpc_url = %url,
            chain_id = %chain_id,
            deployer = %wallet.address(),
            nonce = %nonce,
            "Connected to network"
        );

        Ok(Self {
            client,
            url,
            wallet,
            chain_id: chain_id.to(),
            nonce: Mutex::new(nonce.to()),
            config,
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        rpc::json_rpc_call(&self.client, self.url.as_str(), method, params).await
    }

    async fn estimate_gas(&self, tx: &TxRequest) -> Result<u64> {
        let mut request = json!({
            "from": self.wallet.address(),
            "data": tx.input,
        });
        if let Some(to) = tx.to {
            request["to"] = json!(to);
        }

        let estimate: U64 = self.call("eth_estimateGas", vec![request]).await?;
        let estimate: u64 = estimate.to();

        Ok(estimate.saturating_mul(self.config.gas_limit_multiplier_percent) / 100)
    }
}

impl ChainClient for HttpChain {
    fn deployer(&self) -> Address {
        self.wallet.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256> {
        // Held until the node accepted the transaction so nonces stay gapless.
        let mut nonce = self.nonce.lock().await;

        let gas_price: U128 = self.call("eth_gasPrice", vec![]).await?;
        let gas_limit = self
            .estimate_gas(&tx)
            .await
            .context("Failed to estimate gas (would the transaction revert?)")?;

        let create = tx.is_create();
        let raw: Bytes = self.wallet.sign_transaction(TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: *nonce,
            gas_price: gas_price.to(),
            gas_limit,
            to: tx.to.into(),
            value: U256::ZERO,
            input: tx.input,
        })?;

        let tx_hash: B256 = self
            .call("eth_sendRawTransaction", vec![json!(raw)])
            .await?;

        tracing::debug!(
            tx_hash = %tx_hash,
            nonce = *nonce,
            gas_limit,
            create,
            "Transaction submitted"
        );

        *nonce += 1;

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt> {
        let receipt: RpcReceipt = rpc::poll_until(
            &format!("receipt of {}", tx_hash),
            Duration::from_millis(self.config.poll_interval_ms),
            self.config.confirmation_timeout_secs.map(Duration::from_secs),
            || self.call::<Option<RpcReceipt>>("eth_getTransactionReceipt", vec![json!(tx_hash)]),
        )
        .await?;

        Ok(receipt.into())
    }

    async fn block_number(&self) -> Result<u64> {
        let block: U64 = self.call("eth_blockNumber", vec![]).await?;
        Ok(block.to())
    }
}
