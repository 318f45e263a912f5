//! Local developer configuration (`foundryconfig.json`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "foundryconfig.json";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FoundryConfig {
    /// Root of the Foundry VTT user data directory (the one containing `Data/`).
    #[serde(rename = "dataPath", default)]
    pub data_path: Option<PathBuf>,
}

impl FoundryConfig {
    /// Read and parse the config file. Called on every install path resolution.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }
}
