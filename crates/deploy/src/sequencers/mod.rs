//! Configuration sequencers.
//!
//! A sequencer owns one logical group of contracts: it deploys them, wires
//! them together and funds them. Sequencers declare the groups whose outputs
//! they need; the [`DeploymentPlan`](crate::DeploymentPlan) runs them in
//! dependency order and hands each one the outputs it asked for, and nothing
//! else.

mod airdrop;
mod escrow;
mod liquidity;
mod passport;
mod token;

use std::collections::HashMap;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use airdrop::AirdropSequencer;
pub use escrow::EscrowSequencer;
pub use liquidity::{LiquiditySequencer, RewardsSchedule};
pub use passport::PassportSequencer;
pub use token::TokenSequencer;

use crate::{ContractKind, artifacts::ArtifactLoader, chain::ChainClient, step::DeployedContract};

/// Identifier of a sequencer within a plan.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum SequencerId {
    #[display("token")]
    Token,
    #[display("escrow")]
    Escrow,
    #[display("liquidity")]
    Liquidity,
    /// One per configured Merkle root, numbered from zero.
    #[display("airdrop-{_0}")]
    Airdrop(usize),
    #[display("passport")]
    Passport,
}

/// Terms a passport holder agrees to when claiming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportAgreement {
    pub statement: String,
    pub terms_uri: String,
}

/// What a sequencer leaves behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOutput {
    /// Contracts deployed by the group, in deployment order.
    pub contracts: Vec<DeployedContract>,
    pub agreement: Option<PassportAgreement>,
}

impl GroupOutput {
    pub fn new(contracts: Vec<DeployedContract>) -> Self {
        Self {
            contracts,
            agreement: None,
        }
    }

    /// The first contract of the given kind deployed by the group.
    pub fn contract(&self, kind: ContractKind) -> Result<&DeployedContract> {
        self.contracts
            .iter()
            .find(|contract| contract.contract == kind)
            .with_context(|| format!("Group did not deploy {}", kind))
    }
}

/// Outputs of the sequencers a sequencer declared as requirements.
#[derive(Debug, Default)]
pub struct Dependencies<'a> {
    outputs: HashMap<SequencerId, &'a GroupOutput>,
}

impl<'a> Dependencies<'a> {
    pub fn new(outputs: HashMap<SequencerId, &'a GroupOutput>) -> Self {
        Self { outputs }
    }

    /// Output of a declared dependency.
    pub fn get(&self, id: SequencerId) -> Result<&'a GroupOutput> {
        self.outputs
            .get(&id)
            .copied()
            .with_context(|| format!("{} is not a declared dependency", id))
    }

    /// A contract deployed by a declared dependency.
    pub fn contract(&self, id: SequencerId, kind: ContractKind) -> Result<&'a DeployedContract> {
        self.get(id)?.contract(kind)
    }
}

/// Everything a sequencer may use while running.
pub struct SequencerContext<'a, C> {
    pub client: &'a C,
    pub artifacts: &'a dyn ArtifactLoader,
    pub deps: Dependencies<'a>,
}

/// A logical group of contracts with its deployment and configuration steps.
pub trait Sequencer<C>: Send + Sync {
    fn id(&self) -> SequencerId;

    /// Sequencers whose outputs must exist before this one runs.
    fn requires(&self) -> Vec<SequencerId> {
        Vec::new()
    }

    fn run<'a>(&'a self, ctx: SequencerContext<'a, C>) -> BoxFuture<'a, Result<GroupOutput>>;
}

/// The sequencers of a standard Nation3 deployment, in registration order.
pub fn nation3_sequencers<C: ChainClient>(
    config: &crate::DeployConfig,
) -> Vec<Box<dyn Sequencer<C>>> {
    let mut sequencers: Vec<Box<dyn Sequencer<C>>> = vec![
        Box::new(TokenSequencer::new(config.token.clone())),
        Box::new(EscrowSequencer::new(config.escrow.clone())),
        Box::new(LiquiditySequencer::new(config.liquidity.clone())),
    ];

    for (index, root) in config.airdrop.merkle_roots.iter().enumerate() {
        sequencers.push(Box::new(AirdropSequencer::new(
            index,
            *root,
            config.airdrop.amount,
        )));
    }

    sequencers.push(Box::new(PassportSequencer::new(config.passport.clone())));
    sequencers
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::{Address, Bytes};

    use super::*;

    fn deployed(contract: ContractKind, byte: u8) -> DeployedContract {
        DeployedContract {
            contract,
            address: Address::repeat_byte(byte),
            constructor_args: Bytes::new(),
            source_path: contract.source_path().to_string(),
        }
    }

    #[test]
    fn test_sequencer_id_display() {
        assert_eq!(SequencerId::Token.to_string(), "token");
        assert_eq!(SequencerId::Airdrop(1).to_string(), "airdrop-1");
    }

    #[test]
    fn test_undeclared_dependency_is_an_error() {
        let token = GroupOutput::new(vec![deployed(ContractKind::Nation, 1)]);
        let deps = Dependencies::new(HashMap::from([(SequencerId::Token, &token)]));

        assert_eq!(
            deps.contract(SequencerId::Token, ContractKind::Nation).unwrap().address,
            Address::repeat_byte(1)
        );
        assert!(deps.get(SequencerId::Escrow).is_err());
        assert!(deps.contract(SequencerId::Token, ContractKind::VotingEscrow).is_err());
    }

    #[test]
    fn test_default_sequencers_follow_airdrop_roots() {
        let config = crate::DeployConfig::default();
        let ids: Vec<_> = nation3_sequencers::<crate::chain::InMemoryChain>(&config)
            .iter()
            .map(|s| s.id())
            .collect();

        assert_eq!(
            ids,
            vec![
                SequencerId::Token,
                SequencerId::Escrow,
                SequencerId::Liquidity,
                SequencerId::Airdrop(0),
                SequencerId::Airdrop(1),
                SequencerId::Passport,
            ]
        );
    }
}
