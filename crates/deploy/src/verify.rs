//! Source verification of deployed contracts.
//!
//! Verification runs an external command per contract in the background.
//! Its outcome is only ever logged: a failed verification never fails a
//! deployment.

use std::process::Output;

use alloy_core::primitives::{Address, Bytes};
use anyhow::{Context, Result};
use tokio::{process::Command, task::JoinSet};

use crate::{VerificationConfig, step::DeployedContract};

/// One contract to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    pub source_path: String,
    /// ABI-encoded constructor arguments, if the constructor takes any.
    pub constructor_args: Option<Bytes>,
    pub chain_id: u64,
}

impl VerificationRequest {
    pub fn for_contract(contract: &DeployedContract, chain_id: u64) -> Self {
        Self {
            address: contract.address,
            source_path: contract.source_path.clone(),
            constructor_args: contract
                .has_constructor_args()
                .then(|| contract.constructor_args.clone()),
            chain_id,
        }
    }
}

/// Builds the verification command line for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier {
    program: String,
    args: Vec<String>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl Verifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &VerificationConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program for `request`:
    /// `<args...> <address> <source_path> [--constructor-args <hex>] --chain-id <id>`.
    pub fn command_args(&self, request: &VerificationRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(request.address.to_string());
        args.push(request.source_path.clone());

        if let Some(constructor_args) = &request.constructor_args {
            args.push("--constructor-args".to_string());
            args.push(constructor_args.to_string());
        }

        args.push("--chain-id".to_string());
        args.push(request.chain_id.to_string());
        args
    }

    pub fn command(&self, request: &VerificationRequest) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.command_args(request));
        command
    }
}

/// Tally of finished verification tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl VerificationSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Background queue of verification subprocesses.
#[derive(Debug)]
pub struct VerificationQueue {
    verifier: Verifier,
    tasks: JoinSet<bool>,
}

impl VerificationQueue {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier,
            tasks: JoinSet::new(),
        }
    }

    /// Start verifying `request` in the background.
    pub fn enqueue(&mut self, request: VerificationRequest) {
        let mut command = self.verifier.command(&request);
        tracing::info!(
            address = %request.address,
            source = %request.source_path,
            "Verifying contract"
        );

        self.tasks.spawn(async move {
            let output = command.output().await.context("Failed to spawn verifier");
            report(&request, output)
        });
    }

    /// Number of verifications still running.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every enqueued verification to finish.
    pub async fn drain(mut self) -> VerificationSummary {
        let mut summary = VerificationSummary::default();

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    tracing::error!(error = %e, "Verification task panicked");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Verification finished"
        );
        summary
    }
}

fn report(request: &VerificationRequest, output: Result<Output>) -> bool {
    let output = match output {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(
                address = %request.address,
                error = %format!("{e:#}"),
                "Verification failed"
            );
            return false;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.trim().is_empty() {
        tracing::info!(address = %request.address, stdout = %stdout.trim(), "Verifier output");
    }
    if !stderr.trim().is_empty() {
        tracing::warn!(
            address = %request.address,
            stderr = %stderr.trim(),
            "Verifier error output"
        );
    }

    if output.status.success() {
        tracing::info!(
            address = %request.address,
            source = %request.source_path,
            "Contract verified"
        );
        true
    } else {
        tracing::error!(
            address = %request.address,
            status = %output.status,
            "Verification failed"
        );
        false
    }
}
