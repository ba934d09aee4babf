//! nation3 deploys the Nation3 contracts to a network and records where they landed.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};

use cli::Cli;
use nation3_deploy::{
    ChainClient, DeployedContract, Deployment, ForgeArtifacts, HttpChain, InMemoryChain,
    Orchestrator,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "Deployment failed");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.deploy_config()?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
    }

    let artifacts = ForgeArtifacts::new(&cli.artifacts);

    if cli.dry_run {
        let chain = InMemoryChain::random();
        tracing::info!(
            deployer = %chain.deployer(),
            artifacts = %artifacts.out_dir().display(),
            "Dry run against an in-memory chain, nothing will be written or verified"
        );

        let outcome = Orchestrator::new(&chain, &artifacts, &config)?.run().await?;

        println!("{}", contracts_table(&outcome.contracts));
        println!("{}", outcome.manifest.to_json()?);
        return Ok(());
    }

    let rpc_url = cli
        .rpc_url
        .clone()
        .context("An RPC URL is required: pass --rpc-url or set RPC_URL")?;
    let wallet = cli.wallet()?;
    let chain = HttpChain::connect(rpc_url, wallet, config.chain.clone()).await?;

    let report = Deployment::new(&chain, &artifacts, &config)?.execute().await?;

    println!("{}", contracts_table(&report.outcome.contracts));
    tracing::info!(
        path = %report.manifest_path.display(),
        contracts = report.outcome.contracts.len(),
        "Deployment saved"
    );

    if let Some(queue) = report.verification {
        tracing::info!(pending = queue.pending(), "Waiting for source verification...");
        let summary = queue.drain().await;
        if summary.failed > 0 {
            tracing::warn!(
                failed = summary.failed,
                total = summary.total(),
                "Some contracts could not be verified"
            );
        }
    }

    Ok(())
}

fn contracts_table(contracts: &[DeployedContract]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Contract", "Address", "Source"]);

    for contract in contracts {
        table.add_row(vec![
            contract.contract.to_string(),
            contract.address.to_string(),
            contract.source_path.clone(),
        ]);
    }

    table
}
