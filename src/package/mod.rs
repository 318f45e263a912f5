//! Baking release manifests and packaging builds for distribution.

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use crate::archive::ZipArchiver;
use crate::ci::{CiEnv, LinkStrategy};
use crate::error::PackError;
use crate::manifest::{self, DEFAULT_PACKAGE_FILE, Manifest, ManifestKind, PackageMeta};
use crate::runtime::Runtime;

pub const DEFAULT_OUT_DIR: &str = "dist";
pub const DEFAULT_PACK_DIR: &str = "package";

/// Where to read sources from and where to write artifacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Source manifest, named `module.json` or `system.json`.
    pub manifest: PathBuf,
    /// Build output directory; receives the baked manifest and gets archived.
    pub out_dir: PathBuf,
    /// Directory receiving the archives.
    pub pack_dir: PathBuf,
    /// `package.json` providing version, homepage, bugs and license.
    pub package_json: PathBuf,
}

impl PackageOptions {
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            pack_dir: PathBuf::from(DEFAULT_PACK_DIR),
            package_json: PathBuf::from(DEFAULT_PACKAGE_FILE),
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_pack_dir(mut self, pack_dir: impl Into<PathBuf>) -> Self {
        self.pack_dir = pack_dir.into();
        self
    }

    pub fn with_package_json(mut self, package_json: impl Into<PathBuf>) -> Self {
        self.package_json = package_json.into();
        self
    }
}

/// Outcome of [`PackageTool::package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Bakes manifests and packages builds for one source manifest.
pub struct PackageTool<'a, R: Runtime + ?Sized> {
    runtime: &'a R,
    options: PackageOptions,
    kind: ManifestKind,
    env: CiEnv,
    links: Box<dyn LinkStrategy>,
}

impl<'a, R: Runtime + ?Sized> PackageTool<'a, R> {
    /// Fails when the manifest file name is neither `module.json` nor `system.json`.
    pub fn new(
        runtime: &'a R,
        options: PackageOptions,
        env: CiEnv,
        links: Box<dyn LinkStrategy>,
    ) -> Result<Self> {
        let kind = ManifestKind::from_path(&options.manifest)?;
        Ok(Self {
            runtime,
            options,
            kind,
            env,
            links,
        })
    }

    pub fn options(&self) -> &PackageOptions {
        &self.options
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Read the source manifest and `package.json` and assemble the release
    /// manifest. Reads from disk on every call.
    #[tracing::instrument(skip(self))]
    pub async fn load_manifest(&self) -> Result<Manifest> {
        let source = Manifest::load(self.runtime, &self.options.manifest)?;
        let meta = PackageMeta::load(self.runtime, &self.options.package_json)?;
        manifest::assemble(source, self.kind, &meta, &self.env, self.links.as_ref())
    }

    /// Write the assembled manifest to `<out_dir>/<module|system>.json`,
    /// replacing any previous one. The source manifest is never touched.
    #[tracing::instrument(skip(self))]
    pub async fn build_manifest(&self) -> Result<Manifest> {
        self.runtime.create_dir_all(&self.options.out_dir)?;
        let manifest = self.load_manifest().await?;

        let dest = self.options.out_dir.join(self.kind.file_name());
        let json = manifest.to_json_pretty()?;
        self.runtime.write(&dest, json.as_bytes())?;

        info!(
            "Wrote {} {} to {:?}",
            self.kind,
            manifest.version().unwrap_or_default(),
            dest
        );
        Ok(manifest)
    }

    /// Assemble the manifest and archive the build output.
    #[tracing::instrument(skip(self))]
    pub async fn package(&self) -> Result<PackageReport> {
        let manifest = self.load_manifest().await?;
        self.package_manifest(&manifest).await
    }

    /// Archive the build output as `<pack_dir>/<name>-v<version>.zip` with all
    /// files below a `<name>/` folder, using an already assembled manifest.
    #[tracing::instrument(skip(self, manifest))]
    pub async fn package_manifest(&self, manifest: &Manifest) -> Result<PackageReport> {
        let name = manifest.package_name()?;
        let zip_name = manifest.zip_name()?;

        if !self.runtime.is_dir(&self.options.out_dir) {
            return Err(PackError::packaging(format!(
                "Build output {:?} does not exist, nothing to package",
                self.options.out_dir
            ))
            .into());
        }

        self.runtime.create_dir_all(&self.options.pack_dir)?;

        let path = self.options.pack_dir.join(zip_name);
        debug!("Packaging {:?} into {:?}", self.options.out_dir, path);
        let bytes = ZipArchiver.write(self.runtime, &self.options.out_dir, name, &path)?;

        println!("{} total bytes", bytes);
        println!("Zip file {} has been written", path.display());

        Ok(PackageReport { path, bytes })
    }
}
