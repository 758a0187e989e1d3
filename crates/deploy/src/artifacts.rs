//! Creation bytecode resolution from compiled contract artifacts.

use std::path::Path;

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde::Deserialize;

/// A compiled contract artifact. Only the fields the deployment pipeline
/// needs are read; everything else in the artifact JSON is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    /// Creation bytecode, 0x-prefixed.
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load the artifact for `name` from `<artifacts_dir>/<name>.json`.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self> {
        let path = artifacts_dir.join(format!("{}.json", name));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read artifact for {} at {}", name, path.display()))?;
        let artifact: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        if artifact.bytecode.is_empty() {
            anyhow::bail!("Artifact {} has no creation bytecode (abstract contract?)", name);
        }

        Ok(artifact)
    }
}
