//! Deployment steps and configuration actions.
//!
//! These are the only two ways the sequencers touch the chain, and both wait
//! for the network to confirm the transaction before returning.

use alloy_core::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    ContractKind,
    chain::{ChainClient, Receipt, TxRequest},
    factory::ContractFactory,
};

/// A contract whose creation has been confirmed on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub contract: ContractKind,
    pub address: Address,
    /// ABI-encoded constructor arguments used for the deployment.
    pub constructor_args: Bytes,
    /// `<file>:<contract>` identifier used for source verification.
    pub source_path: String,
}

impl DeployedContract {
    pub fn has_constructor_args(&self) -> bool {
        !self.constructor_args.is_empty()
    }
}

/// Deploy a new instance through `factory` and wait for its confirmation.
pub async fn deploy_contract<C: ChainClient>(
    factory: &ContractFactory<'_, C>,
    args: &[DynSolValue],
) -> Result<DeployedContract> {
    let contract = factory.contract();
    tracing::info!(contract = %contract, "Deploying {}..", contract);

    let pending = factory.deploy(args).await?;

    let receipt = factory
        .client()
        .wait_for_receipt(pending.tx_hash)
        .await
        .with_context(|| format!("Failed to confirm deployment of {}", contract))?;

    if !receipt.success {
        anyhow::bail!(
            "Deployment of {} reverted (tx {})",
            contract,
            receipt.transaction_hash
        );
    }

    let address = receipt.contract_address.with_context(|| {
        format!(
            "Receipt for the deployment of {} has no contract address (tx {})",
            contract, receipt.transaction_hash
        )
    })?;

    tracing::info!(
        contract = %contract,
        address = %address,
        tx_hash = %receipt.transaction_hash,
        block = receipt.block_number,
        "Deployed {} to: {}",
        contract,
        address
    );

    Ok(DeployedContract {
        contract,
        address,
        constructor_args: pending.constructor_args,
        source_path: contract.source_path().to_string(),
    })
}

/// Apply one configuration action to a deployed contract and wait for it to be mined.
pub async fn configure<C: ChainClient, T: SolCall>(
    client: &C,
    target: &DeployedContract,
    call: T,
) -> Result<Receipt> {
    let action = T::SIGNATURE;

    let tx_hash = client
        .send_transaction(TxRequest::call(target.address, call.abi_encode().into()))
        .await
        .with_context(|| format!("Failed to send {} to {}", action, target.contract))?;

    let receipt = client
        .wait_for_receipt(tx_hash)
        .await
        .with_context(|| format!("Failed to confirm {} on {}", action, target.contract))?;

    if !receipt.success {
        anyhow::bail!(
            "{} on {} ({}) reverted (tx {})",
            action,
            target.contract,
            target.address,
            tx_hash
        );
    }

    tracing::debug!(
        contract = %target.contract,
        address = %target.address,
        action,
        tx_hash = %tx_hash,
        "Configuration action applied"
    );

    Ok(receipt)
}
