use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};

use super::{GroupOutput, Sequencer, SequencerContext, SequencerId};
use crate::{
    ContractKind, TokenConfig,
    chain::ChainClient,
    factory::ContractFactory,
    solidity::INation,
    step::{configure, deploy_contract},
    units,
};

/// Deploys NATION and mints the initial supply to the deployer.
#[derive(Debug, Clone)]
pub struct TokenSequencer {
    config: TokenConfig,
}

impl TokenSequencer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    async fn deploy<C: ChainClient>(&self, ctx: SequencerContext<'_, C>) -> Result<GroupOutput> {
        let factory = ContractFactory::load(ContractKind::Nation, ctx.artifacts, ctx.client)?;
        let token = deploy_contract(&factory, &[]).await?;

        let deployer = ctx.client.deployer();
        let supply = units::tokens(self.config.total_supply.into());
        configure(
            ctx.client,
            &token,
            INation::mintCall {
                to: deployer,
                amount: supply,
            },
        )
        .await?;

        tracing::info!(
            to = %deployer,
            amount = %supply,
            "Minted {} NATION",
            units::format_token(supply)
        );

        Ok(GroupOutput::new(vec![token]))
    }
}

impl<C: ChainClient> Sequencer<C> for TokenSequencer {
    fn id(&self) -> SequencerId {
        SequencerId::Token
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>> {
        self.deploy(ctx).boxed()
    }
}
