//! Compiled contract artifacts.
//!
//! Artifacts are produced by `forge build` and live under the `out` directory,
//! one JSON file per contract holding the ABI and the creation bytecode.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ContractKind;

/// Interface definition and creation bytecode of a compiled contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// Source of compiled contract artifacts.
pub trait ArtifactLoader: Send + Sync {
    /// Load the artifact for the given contract.
    fn load(&self, contract: ContractKind) -> Result<Artifact>;
}

/// On-disk layout of a forge artifact. Only the fields we use are parsed.
#[derive(Debug, Deserialize)]
struct ForgeArtifactFile {
    abi: JsonAbi,
    bytecode: ForgeBytecode,
}

#[derive(Debug, Deserialize)]
struct ForgeBytecode {
    object: String,
}

impl ForgeArtifactFile {
    fn into_artifact(self) -> Result<Artifact> {
        let object = self.bytecode.object.trim();
        let object = object.strip_prefix("0x").unwrap_or(object);
        if object.is_empty() {
            anyhow::bail!("Artifact has empty bytecode (abstract contract or interface?)");
        }

        let bytecode = hex::decode(object).context("Artifact bytecode is not valid hex")?;

        Ok(Artifact {
            abi: self.abi,
            bytecode: bytecode.into(),
        })
    }
}

/// Loads artifacts from a forge `out` directory.
#[derive(Debug, Clone)]
pub struct ForgeArtifacts {
    out_dir: PathBuf,
}

impl ForgeArtifacts {
    /// Default forge output directory.
    pub const DEFAULT_OUT_DIR: &'static str = "out";

    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl ArtifactLoader for ForgeArtifacts {
    fn load(&self, contract: ContractKind) -> Result<Artifact> {
        let path = self.out_dir.join(contract.artifact_path());
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read artifact for {} at {} - did you run `forge build`?",
                contract,
                path.display()
            )
        })?;

        let file: ForgeArtifactFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        let artifact = file
            .into_artifact()
            .with_context(|| format!("Invalid artifact {}", path.display()))?;

        tracing::debug!(
            contract = %contract,
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "Loaded artifact"
        );

        Ok(artifact)
    }
}

/// Artifacts held in memory, keyed by contract.
#[derive(Debug, Clone, Default)]
pub struct StaticArtifacts {
    artifacts: HashMap<ContractKind, Artifact>,
}

impl StaticArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact, replacing any previous one for the same contract.
    pub fn with(mut self, contract: ContractKind, artifact: Artifact) -> Self {
        self.artifacts.insert(contract, artifact);
        self
    }
}

impl ArtifactLoader for StaticArtifacts {
    fn load(&self, contract: ContractKind) -> Result<Artifact> {
        self.artifacts
            .get(&contract)
            .cloned()
            .with_context(|| format!("No artifact registered for {}", contract))
    }
}
