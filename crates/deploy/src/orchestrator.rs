//! Runs a deployment plan end to end.

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};

use crate::{
    DeployConfig,
    artifacts::ArtifactLoader,
    chain::ChainClient,
    manifest::DeploymentManifest,
    plan::DeploymentPlan,
    sequencers::{Dependencies, GroupOutput, SequencerContext, SequencerId, nation3_sequencers},
    step::DeployedContract,
    verify::{VerificationQueue, VerificationRequest, Verifier},
};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub manifest: DeploymentManifest,
    /// Every deployed contract, in deployment order.
    pub contracts: Vec<DeployedContract>,
}

/// Drives the sequencers of a plan against one chain with one signer.
pub struct Orchestrator<'a, C> {
    client: &'a C,
    artifacts: &'a dyn ArtifactLoader,
    plan: DeploymentPlan<C>,
}

impl<'a, C: ChainClient> Orchestrator<'a, C> {
    /// An orchestrator running the standard Nation3 plan for `config`.
    pub fn new(
        client: &'a C,
        artifacts: &'a dyn ArtifactLoader,
        config: &DeployConfig,
    ) -> Result<Self> {
        let plan = DeploymentPlan::new(nation3_sequencers(config))?;
        Ok(Self::with_plan(client, artifacts, plan))
    }

    pub fn with_plan(
        client: &'a C,
        artifacts: &'a dyn ArtifactLoader,
        plan: DeploymentPlan<C>,
    ) -> Self {
        Self {
            client,
            artifacts,
            plan,
        }
    }

    pub fn plan(&self) -> &DeploymentPlan<C> {
        &self.plan
    }

    /// Run every sequencer in plan order and assemble the manifest.
    ///
    /// The first failure aborts the run.
    pub async fn run(&self) -> Result<DeploymentOutcome> {
        tracing::info!(
            deployer = %self.client.deployer(),
            chain_id = self.client.chain_id(),
            order = ?self.plan.order(),
            "Starting deployment"
        );

        let mut outputs: HashMap<SequencerId, GroupOutput> =
            HashMap::with_capacity(self.plan.len());
        let mut executed = Vec::with_capacity(self.plan.len());

        for sequencer in self.plan.iter() {
            let id = sequencer.id();

            let deps = sequencer
                .requires()
                .into_iter()
                .map(|dependency| {
                    outputs
                        .get(&dependency)
                        .map(|output| (dependency, output))
                        .with_context(|| format!("{} has not run before {}", dependency, id))
                })
                .collect::<Result<HashMap<_, _>>>()?;

            let ctx = SequencerContext {
                client: self.client,
                artifacts: self.artifacts,
                deps: Dependencies::new(deps),
            };

            tracing::debug!(sequencer = %id, "Running sequencer");
            let output = sequencer
                .run(ctx)
                .await
                .with_context(|| format!("Sequencer {} failed", id))?;

            outputs.insert(id, output);
            executed.push(id);
        }

        let ordered: Vec<&GroupOutput> = executed.iter().filter_map(|id| outputs.get(id)).collect();
        let manifest = DeploymentManifest::from_outputs(ordered.iter().copied())?;
        let contracts = ordered
            .iter()
            .flat_map(|output| output.contracts.iter().cloned())
            .collect();

        tracing::info!(
            nation_token = %manifest.nation_token,
            ve_nation_token = %manifest.ve_nation_token,
            "Deployment complete"
        );

        Ok(DeploymentOutcome {
            manifest,
            contracts,
        })
    }
}

/// Result of the full pipeline.
#[derive(Debug)]
pub struct DeploymentReport {
    pub outcome: DeploymentOutcome,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// Verifications still running, if verification is enabled.
    pub verification: Option<VerificationQueue>,
}

/// The full pipeline: run, save the manifest, then start verification.
pub struct Deployment<'a, C> {
    orchestrator: Orchestrator<'a, C>,
    config: &'a DeployConfig,
}

impl<'a, C: ChainClient> Deployment<'a, C> {
    pub fn new(
        client: &'a C,
        artifacts: &'a dyn ArtifactLoader,
        config: &'a DeployConfig,
    ) -> Result<Self> {
        Ok(Self {
            orchestrator: Orchestrator::new(client, artifacts, config)?,
            config,
        })
    }

    /// Deploy, then persist and verify what was deployed.
    ///
    /// When the run fails no manifest is written and nothing is verified.
    pub async fn execute(self) -> Result<DeploymentReport> {
        let outcome = self.orchestrator.run().await?;

        outcome.manifest.save_to_file(&self.config.manifest_path)?;

        let verification = self.config.verification.enabled.then(|| {
            let chain_id = self.orchestrator.client.chain_id();
            let verifier = Verifier::from_config(&self.config.verification);
            let mut queue = VerificationQueue::new(verifier);
            for contract in &outcome.contracts {
                queue.enqueue(VerificationRequest::for_contract(contract, chain_id));
            }
            queue
        });

        Ok(DeploymentReport {
            outcome,
            manifest_path: self.config.manifest_path.clone(),
            verification,
        })
    }
}
