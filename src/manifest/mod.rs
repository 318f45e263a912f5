//! Module/system manifests and their release-time assembly.

mod meta;

pub use meta::{Bugs, DEFAULT_PACKAGE_FILE, PackageMeta};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Component, Path};

use crate::ci::{CiEnv, LinkStrategy};
use crate::error::PackError;
use crate::runtime::Runtime;
use crate::version::resolve_version;

/// Suffix appended to the title of builds from the unstable branch.
pub const UNSTABLE_TITLE_SUFFIX: &str = "(unstable branch)";

/// Kind of package, decided by the manifest file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Module,
    System,
}

impl ManifestKind {
    /// Recognize `module.json` or `system.json` as the base name of `path`.
    pub fn from_path(path: &Path) -> Result<Self, PackError> {
        match path.file_name().and_then(|n| n.to_str()) {
            Some("module.json") => Ok(ManifestKind::Module),
            Some("system.json") => Ok(ManifestKind::System),
            _ => Err(PackError::configuration(format!(
                "Unrecognized manifest file {:?}, expected module.json or system.json",
                path
            ))),
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::Module => "module.json",
            ManifestKind::System => "system.json",
        }
    }

    /// Directory under `<dataPath>/Data` where packages of this kind live.
    pub fn data_dir(&self) -> &'static str {
        match self {
            ManifestKind::Module => "modules",
            ManifestKind::System => "systems",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A manifest as a JSON object. Unknown fields are carried through untouched
/// and keep their order.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    /// Parse manifest text. The document must be an object with a string `name`.
    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| PackError::packaging(format!("Manifest is not valid JSON: {}", e)))?;
        let Value::Object(fields) = value else {
            return Err(PackError::packaging("Manifest must be a JSON object").into());
        };
        let manifest = Self { fields };
        if manifest.name().is_none() {
            return Err(PackError::packaging("Manifest has no \"name\" field").into());
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path).map_err(|e| {
            PackError::packaging(format!("Failed to read manifest {:?}: {:#}", path, e))
        })?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {:?}", path))
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.get_str("version")
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// The `name` field, provided it can be used as a directory or file name:
    /// exactly one normal path component.
    pub fn package_name(&self) -> Result<&str, PackError> {
        let name = self.name().unwrap_or_default();
        if !is_single_component(name) {
            return Err(PackError::configuration(format!(
                "Manifest name {:?} is not a valid package name",
                name
            )));
        }
        Ok(name)
    }

    /// Archive file name: `<name>-v<version>.zip`.
    pub fn zip_name(&self) -> Result<String, PackError> {
        let zip_name = format!(
            "{}-v{}.zip",
            self.package_name()?,
            self.version().unwrap_or_default()
        );
        if !is_single_component(&zip_name) {
            return Err(PackError::configuration(format!(
                "Archive name {:?} is not a valid file name",
                zip_name
            )));
        }
        Ok(zip_name)
    }

    /// Pretty-printed JSON. Output is stable for equal manifests.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.fields).context("Failed to serialize manifest")
    }
}

/// Merge a source manifest with package metadata and CI links.
///
/// `version`, `url`, `readme`, `bugs` and `license` come from `meta`; package
/// fields that are absent are left out. In CI the manifest gains an update
/// URL that always points at the latest published manifest and a download
/// URL for this exact build. Unstable branch builds publish as artifacts and
/// get their title suffixed.
#[tracing::instrument(skip(source, meta, links))]
pub fn assemble(
    source: Manifest,
    kind: ManifestKind,
    meta: &PackageMeta,
    env: &CiEnv,
    links: &dyn LinkStrategy,
) -> Result<Manifest> {
    let bugs_url = meta
        .bugs_url()
        .ok_or_else(|| PackError::packaging("package.json has no \"bugs.url\" field"))?;

    let mut manifest = source;
    manifest.set("version", resolve_version(&meta.version, env));
    if let Some(homepage) = &meta.homepage {
        manifest.set("url", homepage.as_str());
        manifest.set("readme", homepage.as_str());
    }
    manifest.set("bugs", bugs_url);
    if let Some(license) = &meta.license {
        manifest.set("license", license.as_str());
    }

    if env.is_ci {
        let zip_name = manifest.zip_name()?;
        if env.is_unstable_branch() {
            manifest.set("manifest", links.artifact_link_latest(kind.file_name()));
            manifest.set("download", links.artifact_link(&zip_name));
            let title = manifest
                .title()
                .or(manifest.name())
                .unwrap_or_default()
                .to_string();
            manifest.set("title", format!("{}{}", title, UNSTABLE_TITLE_SUFFIX));
        } else {
            manifest.set("manifest", links.release_link_latest(kind.file_name()));
            manifest.set("download", links.release_link(&zip_name));
        }
    }

    Ok(manifest)
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}
