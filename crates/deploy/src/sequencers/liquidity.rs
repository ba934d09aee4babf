use alloy_core::{dyn_abi::DynSolValue, primitives::U256};
use anyhow::{Context, Result};
use futures::{FutureExt, future::BoxFuture};

use super::{GroupOutput, Sequencer, SequencerContext, SequencerId};
use crate::{
    ContractKind, LiquidityConfig,
    chain::ChainClient,
    factory::ContractFactory,
    solidity::{IBoostedLiquidityDistributor, INation},
    step::{configure, deploy_contract},
    units,
};

/// Block window of a rewards program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardsSchedule {
    pub start_block: u64,
    pub end_block: u64,
}

impl RewardsSchedule {
    /// A program starting `offset` blocks after `current_block` and lasting `period` blocks.
    pub fn after(current_block: u64, offset: u64, period: u64) -> Result<Self> {
        let start_block = current_block
            .checked_add(offset)
            .context("Rewards start block overflows")?;
        let end_block = start_block
            .checked_add(period)
            .context("Rewards end block overflows")?;
        Ok(Self {
            start_block,
            end_block,
        })
    }
}

/// Deploys the pool token and the boosted liquidity rewards distributor, then
/// funds and schedules the rewards.
#[derive(Debug, Clone)]
pub struct LiquiditySequencer {
    config: LiquidityConfig,
}

impl LiquiditySequencer {
    pub fn new(config: LiquidityConfig) -> Self {
        Self { config }
    }

    async fn deploy<C: ChainClient>(&self, ctx: SequencerContext<'_, C>) -> Result<GroupOutput> {
        let token = ctx.deps.contract(SequencerId::Token, ContractKind::Nation)?;
        let escrow = ctx.deps.contract(SequencerId::Escrow, ContractKind::VotingEscrow)?;

        let factory =
            ContractFactory::load(ContractKind::LiquidityPoolToken, ctx.artifacts, ctx.client)?;
        let pool_token = deploy_contract(
            &factory,
            &[
                DynSolValue::String(self.config.pool_token_name.clone()),
                DynSolValue::String(self.config.pool_token_name.clone()),
                DynSolValue::Uint(units::tokens(self.config.pool_token_supply.into()), 256),
            ],
        )
        .await?;

        let factory =
            ContractFactory::load(ContractKind::LiquidityDistributor, ctx.artifacts, ctx.client)?;
        let distributor = deploy_contract(&factory, &[]).await?;

        configure(
            ctx.client,
            &distributor,
            IBoostedLiquidityDistributor::initializeCall {
                rewardsToken: token.address,
                lpToken: pool_token.address,
                boostToken: escrow.address,
            },
        )
        .await?;

        let current_block = ctx
            .client
            .block_number()
            .await
            .context("Failed to read the current block")?;

        let rewards = units::tokens(self.config.rewards.into());
        configure(
            ctx.client,
            token,
            INation::mintCall {
                to: distributor.address,
                amount: rewards,
            },
        )
        .await?;

        let schedule = RewardsSchedule::after(
            current_block,
            self.config.start_block_offset,
            self.config.rewards_period_blocks,
        )?;
        configure(
            ctx.client,
            &distributor,
            IBoostedLiquidityDistributor::setRewardsCall {
                amount: rewards,
                startBlock: U256::from(schedule.start_block),
                endBlock: U256::from(schedule.end_block),
            },
        )
        .await?;

        tracing::info!(
            distributor = %distributor.address,
            start_block = schedule.start_block,
            end_block = schedule.end_block,
            "Scheduled {} NATION of liquidity rewards",
            units::format_token(rewards)
        );

        Ok(GroupOutput::new(vec![pool_token, distributor]))
    }
}

impl<C: ChainClient> Sequencer<C> for LiquiditySequencer {
    fn id(&self) -> SequencerId {
        SequencerId::Liquidity
    }

    fn requires(&self) -> Vec<SequencerId> {
        vec![SequencerId::Token, SequencerId::Escrow]
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>> {
        self.deploy(ctx).boxed()
    }
}
