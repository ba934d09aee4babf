//! The deployment manifest: where every contract of a run ended up.

use std::path::Path;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{ContractKind, sequencers::GroupOutput};

/// Addresses and passport metadata of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    #[serde(rename = "nationToken")]
    pub nation_token: Address,
    #[serde(rename = "veNationToken")]
    pub ve_nation_token: Address,
    #[serde(rename = "balancerLPToken")]
    pub balancer_lp_token: Address,
    #[serde(rename = "lpRewardsContract")]
    pub lp_rewards_contract: Address,
    /// One distributor per airdrop, in plan order.
    #[serde(rename = "nationDropContracts")]
    pub nation_drop_contracts: Vec<Address>,
    #[serde(rename = "nationPassportNFT")]
    pub nation_passport_nft: Address,
    #[serde(rename = "nationPassportNFTIssuer")]
    pub nation_passport_nft_issuer: Address,
    #[serde(rename = "nationPassportAgreementStatement")]
    pub nation_passport_agreement_statement: String,
    #[serde(rename = "nationPassportAgreementURI")]
    pub nation_passport_agreement_uri: String,
}

#[derive(Default)]
struct ManifestBuilder {
    nation_token: Option<Address>,
    ve_nation_token: Option<Address>,
    balancer_lp_token: Option<Address>,
    lp_rewards_contract: Option<Address>,
    nation_drop_contracts: Vec<Address>,
    nation_passport_nft: Option<Address>,
    nation_passport_nft_issuer: Option<Address>,
    agreement: Option<(String, String)>,
}

fn set_once(slot: &mut Option<Address>, kind: ContractKind, address: Address) -> Result<()> {
    if slot.replace(address).is_some() {
        anyhow::bail!("{} was deployed more than once", kind);
    }
    Ok(())
}

fn required<T>(slot: Option<T>, name: &str) -> Result<T> {
    slot.with_context(|| format!("Deployment did not produce {}", name))
}

impl DeploymentManifest {
    /// Assemble the manifest from group outputs given in execution order.
    pub fn from_outputs<'a>(outputs: impl IntoIterator<Item = &'a GroupOutput>) -> Result<Self> {
        let mut builder = ManifestBuilder::default();

        for output in outputs {
            for deployed in &output.contracts {
                let slot = match deployed.contract {
                    ContractKind::Nation => &mut builder.nation_token,
                    ContractKind::VotingEscrow => &mut builder.ve_nation_token,
                    ContractKind::LiquidityPoolToken => &mut builder.balancer_lp_token,
                    ContractKind::LiquidityDistributor => &mut builder.lp_rewards_contract,
                    ContractKind::Passport => &mut builder.nation_passport_nft,
                    ContractKind::PassportIssuer => &mut builder.nation_passport_nft_issuer,
                    ContractKind::MerkleDistributor => {
                        builder.nation_drop_contracts.push(deployed.address);
                        continue;
                    }
                };
                set_once(slot, deployed.contract, deployed.address)?;
            }

            if let Some(agreement) = &output.agreement {
                builder.agreement =
                    Some((agreement.statement.clone(), agreement.terms_uri.clone()));
            }
        }

        let (statement, terms_uri) = required(builder.agreement, "a passport agreement")?;

        Ok(Self {
            nation_token: required(builder.nation_token, "nationToken")?,
            ve_nation_token: required(builder.ve_nation_token, "veNationToken")?,
            balancer_lp_token: required(builder.balancer_lp_token, "balancerLPToken")?,
            lp_rewards_contract: required(builder.lp_rewards_contract, "lpRewardsContract")?,
            nation_drop_contracts: builder.nation_drop_contracts,
            nation_passport_nft: required(builder.nation_passport_nft, "nationPassportNFT")?,
            nation_passport_nft_issuer: required(
                builder.nation_passport_nft_issuer,
                "nationPassportNFTIssuer",
            )?,
            nation_passport_agreement_statement: statement,
            nation_passport_agreement_uri: terms_uri,
        })
    }

    /// Every address in the manifest.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses = vec![
            self.nation_token,
            self.ve_nation_token,
            self.balancer_lp_token,
            self.lp_rewards_contract,
        ];
        addresses.extend(&self.nation_drop_contracts);
        addresses.push(self.nation_passport_nft);
        addresses.push(self.nation_passport_nft_issuer);
        addresses
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize deployment manifest")
    }

    /// Write the manifest as pretty JSON, creating parent directories and
    /// replacing any previous manifest at `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write deployment manifest to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Deployment manifest saved");
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Deployment manifest does not exist: {}", path.display());
        }

        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read deployment manifest from {}", path.display())
        })?;

        serde_json::from_str(&content).context("Failed to parse deployment manifest JSON")
    }
}
