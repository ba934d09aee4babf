//! Contract factories: an artifact bound to a signer.

use alloy_core::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    primitives::{B256, Bytes},
};
use anyhow::{Context, Result};

use crate::{
    ContractKind,
    artifacts::{Artifact, ArtifactLoader},
    chain::{ChainClient, TxRequest},
};

/// A submitted, not yet confirmed, contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    pub contract: ContractKind,
    pub tx_hash: B256,
    /// ABI-encoded constructor arguments, empty when the constructor takes none.
    pub constructor_args: Bytes,
}

/// Deploys new instances of one contract from one signer.
#[derive(Debug)]
pub struct ContractFactory<'a, C> {
    contract: ContractKind,
    artifact: Artifact,
    client: &'a C,
}

impl<'a, C: ChainClient> ContractFactory<'a, C> {
    pub fn new(contract: ContractKind, artifact: Artifact, client: &'a C) -> Self {
        Self {
            contract,
            artifact,
            client,
        }
    }

    /// Load the contract's artifact and bind it to `client`.
    pub fn load(
        contract: ContractKind,
        artifacts: &dyn ArtifactLoader,
        client: &'a C,
    ) -> Result<Self> {
        let artifact = artifacts
            .load(contract)
            .with_context(|| format!("Failed to load artifact for {}", contract))?;
        Ok(Self::new(contract, artifact, client))
    }

    pub fn contract(&self) -> ContractKind {
        self.contract
    }

    pub fn client(&self) -> &'a C {
        self.client
    }

    /// ABI-encode constructor arguments, checking them against the artifact's constructor.
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> Result<Bytes> {
        match &self.artifact.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map(Bytes::from)
                .with_context(|| {
                    format!(
                        "Constructor arguments do not match the {} constructor \
                         ({} expected, {} given)",
                        self.contract,
                        constructor.inputs.len(),
                        args.len()
                    )
                }),
            None if args.is_empty() => Ok(Bytes::new()),
            None => anyhow::bail!(
                "{} has no constructor but {} arguments were given",
                self.contract,
                args.len()
            ),
        }
    }

    /// Submit a creation transaction for a new instance.
    ///
    /// Arguments are validated before anything is sent to the network.
    pub async fn deploy(&self, args: &[DynSolValue]) -> Result<PendingDeployment> {
        let constructor_args = self.encode_constructor_args(args)?;

        let mut init_code =
            Vec::with_capacity(self.artifact.bytecode.len() + constructor_args.len());
        init_code.extend_from_slice(&self.artifact.bytecode);
        init_code.extend_from_slice(&constructor_args);

        let tx_hash = self
            .client
            .send_transaction(TxRequest::create(init_code.into()))
            .await
            .with_context(|| format!("Failed to submit creation of {}", self.contract))?;

        Ok(PendingDeployment {
            contract: self.contract,
            tx_hash,
            constructor_args,
        })
    }
}
