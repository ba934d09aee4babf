use alloy_core::primitives::B256;
use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};

use super::{GroupOutput, Sequencer, SequencerContext, SequencerId};
use crate::{
    ContractKind,
    chain::ChainClient,
    factory::ContractFactory,
    solidity::{IMerkleDistributorV2, INation},
    step::{configure, deploy_contract},
    units,
};

/// Deploys one Merkle airdrop distributor and approves it to spend the
/// deployer's NATION.
#[derive(Debug, Clone)]
pub struct AirdropSequencer {
    index: usize,
    merkle_root: B256,
    /// Allowance granted to the distributor, in whole tokens.
    amount: u64,
}

impl AirdropSequencer {
    pub fn new(index: usize, merkle_root: B256, amount: u64) -> Self {
        Self {
            index,
            merkle_root,
            amount,
        }
    }

    async fn deploy<C: ChainClient>(&self, ctx: SequencerContext<'_, C>) -> Result<GroupOutput> {
        let token = ctx.deps.contract(SequencerId::Token, ContractKind::Nation)?;

        let factory =
            ContractFactory::load(ContractKind::MerkleDistributor, ctx.artifacts, ctx.client)?;
        let distributor = deploy_contract(&factory, &[]).await?;

        configure(
            ctx.client,
            &distributor,
            IMerkleDistributorV2::setUpCall {
                owner: ctx.client.deployer(),
                token: token.address,
                merkleRoot: self.merkle_root,
            },
        )
        .await?;

        let allowance = units::tokens(self.amount.into());
        configure(
            ctx.client,
            token,
            INation::approveCall {
                spender: distributor.address,
                amount: allowance,
            },
        )
        .await?;

        tracing::info!(
            airdrop = self.index,
            distributor = %distributor.address,
            merkle_root = %self.merkle_root,
            "Approved {} NATION for the airdrop",
            units::format_token(allowance)
        );

        Ok(GroupOutput::new(vec![distributor]))
    }
}

impl<C: ChainClient> Sequencer<C> for AirdropSequencer {
    fn id(&self) -> SequencerId {
        SequencerId::Airdrop(self.index)
    }

    fn requires(&self) -> Vec<SequencerId> {
        vec![SequencerId::Token]
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>> {
        self.deploy(ctx).boxed()
    }
}
