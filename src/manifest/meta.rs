//! The parts of `package.json` that go into a manifest.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::error::PackError;
use crate::runtime::Runtime;

/// Default location of the package metadata, relative to the working directory.
pub const DEFAULT_PACKAGE_FILE: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PackageMeta {
    /// Base version the distribution version is derived from.
    pub version: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub bugs: Option<Bugs>,
    #[serde(default)]
    pub license: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Bugs {
    #[serde(default)]
    pub url: Option<String>,
}

impl PackageMeta {
    /// Read `package.json`. A missing file, invalid JSON, or a missing
    /// `version` is a packaging error.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path).map_err(|e| {
            PackError::packaging(format!("Failed to read package metadata {:?}: {:#}", path, e))
        })?;
        let meta = serde_json::from_str(&content).map_err(|e| {
            PackError::packaging(format!("Invalid package metadata {:?}: {}", path, e))
        })?;
        Ok(meta)
    }

    pub fn bugs_url(&self) -> Option<&str> {
        self.bugs.as_ref().and_then(|b| b.url.as_deref())
    }
}
