//! nation3-deploy - Deployment library for the Nation3 contracts.
//!
//! This crate deploys the Nation3 token, governance, liquidity, airdrop and
//! passport contracts to a network, wires them together, records where they
//! landed and triggers source verification.

pub mod artifacts;
pub mod chain;
mod config;
mod contracts;
pub mod factory;
pub mod manifest;
mod orchestrator;
pub mod plan;
pub mod rpc;
pub mod sequencers;
pub mod solidity;
pub mod step;
pub mod units;
pub mod verify;

pub use artifacts::{Artifact, ArtifactLoader, ForgeArtifacts, StaticArtifacts};
pub use chain::{ChainClient, HttpChain, HttpChainConfig, InMemoryChain, Wallet};
pub use config::{
    AirdropConfig, DEFAULT_AIRDROP_ROOTS, DEFAULT_MANIFEST_PATH, DEFAULT_PASSPORT_STATEMENT,
    DEFAULT_PASSPORT_TERMS_URI, DeployConfig, EscrowConfig, LiquidityConfig, PassportConfig,
    TokenConfig, VerificationConfig,
};
pub use contracts::ContractKind;
pub use manifest::DeploymentManifest;
pub use orchestrator::{Deployment, DeploymentOutcome, DeploymentReport, Orchestrator};
pub use plan::DeploymentPlan;
pub use sequencers::SequencerId;
pub use step::DeployedContract;
pub use verify::{VerificationQueue, VerificationSummary, Verifier};
