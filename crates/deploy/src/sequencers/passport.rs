use alloy_core::{dyn_abi::DynSolValue, primitives::U256};
use anyhow::Result;
use futures::{FutureExt, future::BoxFuture};

use super::{GroupOutput, PassportAgreement, Sequencer, SequencerContext, SequencerId};
use crate::{
    ContractKind, PassportConfig,
    chain::ChainClient,
    factory::ContractFactory,
    solidity::{IPassport, IPassportIssuer},
    step::{configure, deploy_contract},
};

/// Deploys the passport NFT and its issuer, hands control of the NFT to the
/// issuer and opens issuance.
#[derive(Debug, Clone)]
pub struct PassportSequencer {
    config: PassportConfig,
}

impl PassportSequencer {
    pub fn new(config: PassportConfig) -> Self {
        Self { config }
    }

    async fn deploy<C: ChainClient>(&self, ctx: SequencerContext<'_, C>) -> Result<GroupOutput> {
        let escrow = ctx.deps.contract(SequencerId::Escrow, ContractKind::VotingEscrow)?;

        let factory = ContractFactory::load(ContractKind::Passport, ctx.artifacts, ctx.client)?;
        let passport = deploy_contract(
            &factory,
            &[
                DynSolValue::String(self.config.name.clone()),
                DynSolValue::String(self.config.symbol.clone()),
            ],
        )
        .await?;

        let factory =
            ContractFactory::load(ContractKind::PassportIssuer, ctx.artifacts, ctx.client)?;
        let issuer = deploy_contract(&factory, &[]).await?;

        configure(
            ctx.client,
            &passport,
            IPassport::transferControlCall {
                newController: issuer.address,
            },
        )
        .await?;

        configure(
            ctx.client,
            &issuer,
            IPassportIssuer::initializeCall {
                claimToken: escrow.address,
                passport: passport.address,
                maxIssuances: U256::from(self.config.max_issuances),
            },
        )
        .await?;

        configure(
            ctx.client,
            &issuer,
            IPassportIssuer::setParamsCall {
                revokeUnderBalance: U256::from(self.config.revoke_under_balance),
                claimRequiredBalance: U256::from(self.config.claim_required_balance),
            },
        )
        .await?;

        configure(
            ctx.client,
            &issuer,
            IPassportIssuer::setStatementCall {
                statement: self.config.statement.clone(),
            },
        )
        .await?;

        configure(
            ctx.client,
            &issuer,
            IPassportIssuer::setTermsURICall {
                termsURI: self.config.terms_uri.clone(),
            },
        )
        .await?;

        configure(
            ctx.client,
            &issuer,
            IPassportIssuer::setEnabledCall { enabled: true },
        )
        .await?;

        tracing::info!(
            passport = %passport.address,
            issuer = %issuer.address,
            max_issuances = self.config.max_issuances,
            "Passport issuance enabled"
        );

        Ok(GroupOutput {
            contracts: vec![passport, issuer],
            agreement: Some(PassportAgreement {
                statement: self.config.statement.clone(),
                terms_uri: self.config.terms_uri.clone(),
            }),
        })
    }
}

impl<C: ChainClient> Sequencer<C> for PassportSequencer {
    fn id(&self) -> SequencerId {
        SequencerId::Passport
    }

    fn requires(&self) -> Vec<SequencerId> {
        vec![SequencerId::Escrow]
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>> {
        self.deploy(ctx).boxed()
    }
}
