use alloy_core::dyn_abi::DynSolValue;
use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};

use super::{GroupOutput, Sequencer, SequencerContext, SequencerId};
use crate::{
    ContractKind, EscrowConfig, chain::ChainClient, factory::ContractFactory, step::deploy_contract,
};

/// Deploys the veNATION vote-escrow over the NATION token.
#[derive(Debug, Clone)]
pub struct EscrowSequencer {
    config: EscrowConfig,
}

impl EscrowSequencer {
    pub fn new(config: EscrowConfig) -> Self {
        Self { config }
    }

    async fn deploy<C: ChainClient>(&self, ctx: SequencerContext<'_, C>) -> Result<GroupOutput> {
        let token = ctx.deps.contract(SequencerId::Token, ContractKind::Nation)?;

        let factory = ContractFactory::load(ContractKind::VotingEscrow, ctx.artifacts, ctx.client)?;
        let escrow = deploy_contract(
            &factory,
            &[
                DynSolValue::Address(token.address),
                DynSolValue::String(self.config.name.clone()),
                DynSolValue::String(self.config.symbol.clone()),
                DynSolValue::String(self.config.version.clone()),
            ],
        )
        .await?;

        Ok(GroupOutput::new(vec![escrow]))
    }
}

impl<C: ChainClient> Sequencer<C> for EscrowSequencer {
    fn id(&self) -> SequencerId {
        SequencerId::Escrow
    }

    fn requires(&self) -> Vec<SequencerId> {
        vec![SequencerId::Token]
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>> {
        self.deploy(ctx).boxed()
    }
}
