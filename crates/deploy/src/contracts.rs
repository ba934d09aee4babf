//! The set of contracts deployed by a Nation3 run.

use serde::{Deserialize, Serialize};

/// Every contract the deployment knows how to build.
///
/// The `Display` form is the name used in log lines.
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
    strum::Display,
    strum::EnumIter,
)]
pub enum ContractKind {
    /// The NATION governance token.
    #[strum(serialize = "NATION")]
    Nation,
    /// The veNATION vote-escrow contract.
    #[strum(serialize = "veNATION")]
    VotingEscrow,
    /// The mock 80NATION-20WETH pool token.
    #[strum(serialize = "lpToken")]
    LiquidityPoolToken,
    /// The boosted liquidity rewards distributor.
    #[strum(serialize = "lpRewardsContract")]
    LiquidityDistributor,
    /// A Merkle airdrop distributor.
    #[strum(serialize = "nationDropContract")]
    MerkleDistributor,
    /// The passport NFT.
    #[strum(serialize = "Passport")]
    Passport,
    /// The passport issuer.
    #[strum(serialize = "PassportIssuer")]
    PassportIssuer,
}

impl ContractKind {
    /// Artifact location relative to the forge `out` directory.
    pub fn artifact_path(&self) -> &'static str {
        match self {
            ContractKind::Nation => "NATION.sol/NATION.json",
            ContractKind::VotingEscrow => "VotingEscrow.vy/VotingEscrow.json",
            ContractKind::LiquidityPoolToken => "MockERC20.sol/MockERC20.json",
            ContractKind::LiquidityDistributor => {
                "BoostedLiquidityDistributor.sol/BoostedLiquidityDistributor.json"
            }
            ContractKind::MerkleDistributor => "MerkleDistributorV2.sol/MerkleDistributorV2.json",
            ContractKind::Passport => "Passport.sol/Passport.json",
            ContractKind::PassportIssuer => "PassportIssuer.sol/PassportIssuer.json",
        }
    }

    /// `<file>:<contract>` identifier passed to the verifier.
    pub fn source_path(&self) -> &'static str {
        match self {
            ContractKind::Nation => "src/tokens/NATION.sol:NATION",
            ContractKind::VotingEscrow => "src/governance/VotingEscrow.vy:VotingEscrow",
            ContractKind::LiquidityPoolToken => "src/test/utils/mocks/MockERC20.sol:MockERC20",
            ContractKind::LiquidityDistributor => {
                "src/distributors/BoostedLiquidityDistributor.sol:BoostedLiquidityDistributor"
            }
            ContractKind::MerkleDistributor => {
                "src/distributors/MerkleDistributorV2.sol:MerkleDistributorV2"
            }
            ContractKind::Passport => "src/passport/Passport.sol:Passport",
            ContractKind::PassportIssuer => "src/passport/PassportIssuer.sol:PassportIssuer",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_artifact_and_source_paths_are_unique() {
        let artifacts: HashSet<_> = ContractKind::iter().map(|k| k.artifact_path()).collect();
        let sources: HashSet<_> = ContractKind::iter().map(|k| k.source_path()).collect();

        assert_eq!(artifacts.len(), ContractKind::iter().count());
        assert_eq!(sources.len(), ContractKind::iter().count());
    }

    #[test]
    fn test_source_path_names_the_contract() {
        for kind in ContractKind::iter() {
            let (_, contract) = kind.source_path().split_once(':').unwrap();
            assert!(kind.artifact_path().ends_with(&format!("/{contract}.json")));
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ContractKind::Nation.to_string(), "NATION");
        assert_eq!(ContractKind::VotingEscrow.to_string(), "veNATION");
        assert_eq!(ContractKind::MerkleDistributor.to_string(), "nationDropContract");
    }
}
