use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::package::{PackageOptions, PackageTool};
use crate::runtime::Runtime;

pub mod config;
mod link;
mod unlink;

pub use link::link;
pub use unlink::unlink;

use config::Config;

fn tool<'a, R: Runtime>(config: &'a Config<R>, options: PackageOptions) -> Result<PackageTool<'a, R>> {
    let (env, links) = config.ci();
    debug!("Packaging with {:?} for {:?}", options, env);
    PackageTool::new(&config.runtime, options, env, links)
}

/// Write the release manifest into the build output
#[tracing::instrument(skip(config))]
pub async fn manifest<R: Runtime>(config: Config<R>, options: PackageOptions) -> Result<()> {
    let tool = tool(&config, options)?;
    let manifest = tool.build_manifest().await?;
    let dest: PathBuf = tool.options().out_dir.join(tool.kind().file_name());
    println!(
        "Built {} {} -> {}",
        manifest.name().unwrap_or_default(),
        manifest.version().unwrap_or_default(),
        dest.display()
    );
    Ok(())
}

/// Archive the build output
#[tracing::instrument(skip(config))]
pub async fn package<R: Runtime>(config: Config<R>, options: PackageOptions) -> Result<()> {
    let tool = tool(&config, options)?;
    tool.package().await?;
    Ok(())
}

/// Write the release manifest, then archive the build output with that same manifest
#[tracing::instrument(skip(config))]
pub async fn release<R: Runtime>(config: Config<R>, options: PackageOptions) -> Result<()> {
    let tool = tool(&config, options)?;
    let manifest = tool.build_manifest().await?;
    tool.package_manifest(&manifest).await?;
    Ok(())
}
