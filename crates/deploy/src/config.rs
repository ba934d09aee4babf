//! Deployment parameters.
//!
//! Amounts are expressed in whole tokens and scaled to 18 decimals when used.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{B256, b256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chain::HttpChainConfig;

/// Default location of the deployment manifest.
pub const DEFAULT_MANIFEST_PATH: &str = "deployments/local.json";

/// Merkle roots of the two airdrops created by a default deployment.
pub const DEFAULT_AIRDROP_ROOTS: [B256; 2] = [
    b256!("ed145aa219b18aa3f2dc56afb2c4e0b148e429ca93b9c5f2c7a29d2101685aee"),
    b256!("b8d662135979ae3791167c967cba4bf6fb681c665d0c03372745c483fe5089f8"),
];

pub const DEFAULT_PASSPORT_STATEMENT: &str =
    "By claiming a Nation3 passport I agree to the terms defined in the following URL";

pub const DEFAULT_PASSPORT_TERMS_URI: &str =
    "https://bafkreiadlf3apu3u7blxw7t2yxi7oyumeuzhoasq7gqmcbaaycq342xq74.ipfs.dweb.link";

/// Configuration of the NATION token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Amount minted to the deployer, in whole tokens.
    pub total_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            total_supply: 42_069,
        }
    }
}

/// Configuration of the vote-escrow contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    pub name: String,
    pub symbol: String,
    pub version: String,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            name: "Vote-escrowed NATION".to_string(),
            symbol: "veNATION".to_string(),
            version: "veNATION_1.0.0".to_string(),
        }
    }
}

/// Configuration of the liquidity pool token and its rewards distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityConfig {
    /// Name and symbol of the mock pool token.
    pub pool_token_name: String,
    /// Supply of the mock pool token, in whole tokens.
    pub pool_token_supply: u64,
    /// NATION minted to the distributor and scheduled as rewards, in whole tokens.
    pub rewards: u64,
    /// Blocks between the current block and the first rewarded block.
    pub start_block_offset: u64,
    /// Length of the rewards program, in blocks.
    pub rewards_period_blocks: u64,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            pool_token_name: "80NATION-20WETH".to_string(),
            pool_token_supply: 314,
            rewards: 500,
            start_block_offset: 5,
            rewards_period_blocks: 1_196_308,
        }
    }
}

/// Configuration of the Merkle airdrops. One distributor is deployed per root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    /// NATION approved to each distributor, in whole tokens.
    pub amount: u64,
    pub merkle_roots: Vec<B256>,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            amount: 314,
            merkle_roots: DEFAULT_AIRDROP_ROOTS.to_vec(),
        }
    }
}

/// Configuration of the passport NFT and its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportConfig {
    pub name: String,
    pub symbol: String,
    pub max_issuances: u64,
    /// Minimum veNATION balance under which a passport can be revoked.
    pub revoke_under_balance: u64,
    /// veNATION balance required to claim a passport.
    pub claim_required_balance: u64,
    pub statement: String,
    pub terms_uri: String,
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            name: "Nation3 Passport".to_string(),
            symbol: "PASS3".to_string(),
            max_issuances: 420,
            revoke_under_balance: 0,
            claim_required_balance: 0,
            statement: DEFAULT_PASSPORT_STATEMENT.to_string(),
            terms_uri: DEFAULT_PASSPORT_TERMS_URI.to_string(),
        }
    }
}

/// Configuration of the source verification subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub enabled: bool,
    pub program: String,
    /// Arguments placed before the per-contract ones.
    pub args: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "forge".to_string(),
            args: vec!["verify-contract".to_string()],
        }
    }
}

/// Every parameter of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Where the manifest is written.
    pub manifest_path: PathBuf,
    pub token: TokenConfig,
    pub escrow: EscrowConfig,
    pub liquidity: LiquidityConfig,
    pub airdrop: AirdropConfig,
    pub passport: PassportConfig,
    pub verification: VerificationConfig,
    pub chain: HttpChainConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            token: TokenConfig::default(),
            escrow: EscrowConfig::default(),
            liquidity: LiquidityConfig::default(),
            airdrop: AirdropConfig::default(),
            passport: PassportConfig::default(),
            verification: VerificationConfig::default(),
            chain: HttpChainConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployment config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file. Missing fields take their default value.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file as TOML")?;

        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
