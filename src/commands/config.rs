use std::path::PathBuf;

use crate::ci::{CiEnv, CiPlatform, LinkStrategy, link_strategy};
use crate::runtime::Runtime;

/// Settings shared by every command.
pub struct Config<R: Runtime> {
    pub runtime: R,
    /// Path of `foundryconfig.json`.
    pub config_path: PathBuf,
    pub ci_platform: CiPlatform,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, config_path: PathBuf, ci_platform: CiPlatform) -> Self {
        Self {
            runtime,
            config_path,
            ci_platform,
        }
    }

    /// Capture the CI environment and pick the matching link strategy.
    pub fn ci(&self) -> (CiEnv, Box<dyn LinkStrategy>) {
        let env = CiEnv::capture(&self.runtime, self.ci_platform);
        let links = link_strategy(self.ci_platform, &env);
        (env, links)
    }
}
