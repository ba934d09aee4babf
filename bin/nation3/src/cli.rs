use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use nation3_deploy::{DeployConfig, ForgeArtifacts, Wallet};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Configuration file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Nation3.toml";

/// Prefix of the environment variables overriding configuration fields.
///
/// Nested fields are separated by a double underscore, e.g.
/// `NATION3_LIQUIDITY__REWARDS=1000`.
pub const ENV_PREFIX: &str = "NATION3_";

#[derive(Debug, Parser)]
#[command(name = "nation3")]
#[command(
    author,
    version,
    about = "Deploy and wire up the Nation3 contracts on a network"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "NATION3_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The URL of the JSON-RPC endpoint of the target network.
    #[arg(long, env = "RPC_URL", required_unless_present = "dry_run")]
    pub rpc_url: Option<Url>,

    /// Hex-encoded private key of the deployer.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, conflicts_with = "mnemonic")]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic of the deployer.
    #[arg(long, env = "MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Index of the deployer account derived from the mnemonic.
    #[arg(long, env = "NATION3_MNEMONIC_INDEX", default_value_t = 0)]
    pub mnemonic_index: u32,

    /// The forge output directory holding the compiled contracts.
    #[arg(long, env = "NATION3_ARTIFACTS", default_value = ForgeArtifacts::DEFAULT_OUT_DIR)]
    pub artifacts: PathBuf,

    /// Where to write the deployment manifest.
    ///
    /// Defaults to deployments/local.json.
    #[arg(long, env = "NATION3_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// NATION minted to the deployer, in whole tokens.
    #[arg(long, env = "NATION_SUPPLY")]
    pub nation_supply: Option<u64>,

    /// NATION approved to each airdrop distributor, in whole tokens.
    #[arg(long, env = "AIRDROP_AMOUNT")]
    pub airdrop_amount: Option<u64>,

    /// Skip source verification of the deployed contracts.
    #[arg(long, env = "NATION3_NO_VERIFY")]
    pub no_verify: bool,

    /// Run the whole deployment against an in-memory chain.
    ///
    /// Prints the resulting manifest. Nothing is written and nothing is verified.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file.
    ///
    /// If not provided, ./Nation3.toml is used when it exists.
    #[arg(long, alias = "conf", env = "NATION3_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the resolved configuration to this path before deploying.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the deployment configuration.
    ///
    /// Precedence, lowest first: defaults, the TOML file, `NATION3_` environment
    /// variables, then command line flags.
    pub fn deploy_config(&self) -> Result<DeployConfig> {
        let mut figment = Figment::from(Serialized::defaults(DeployConfig::default()));

        match &self.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found: {}", path.display());
                }
                figment = figment.merge(Toml::file(path));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        let mut config: DeployConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to resolve deployment configuration")?;

        if let Some(manifest) = &self.manifest {
            config.manifest_path = manifest.clone();
        }
        if let Some(supply) = self.nation_supply {
            config.token.total_supply = supply;
        }
        if let Some(amount) = self.airdrop_amount {
            config.airdrop.amount = amount;
        }
        if self.no_verify {
            config.verification.enabled = false;
        }

        Ok(config)
    }

    /// The deployer's signing key.
    pub fn wallet(&self) -> Result<Wallet> {
        match (&self.private_key, &self.mnemonic) {
            (Some(key), _) => Wallet::from_private_key(key),
            (None, Some(phrase)) => Wallet::from_mnemonic(phrase, self.mnemonic_index),
            (None, None) => {
                anyhow::bail!("A deployer key is required: pass --private-key or --mnemonic")
            }
        }
    }
}
