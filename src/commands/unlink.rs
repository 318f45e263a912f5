use anyhow::Result;
use std::path::Path;

use crate::runtime::Runtime;
use crate::userdata::{UnlinkOutcome, unlink_user_data};

use super::config::Config;

/// Remove the build from the Foundry user data directory
#[tracing::instrument(skip(config))]
pub async fn unlink<R: Runtime>(config: Config<R>, manifest: &Path) -> Result<()> {
    match unlink_user_data(&config.runtime, manifest, &config.config_path).await? {
        UnlinkOutcome::Removed(path) => println!("Removing build in {}", path.display()),
        UnlinkOutcome::NotPresent(path) => println!("No build found in {}", path.display()),
    }
    Ok(())
}
