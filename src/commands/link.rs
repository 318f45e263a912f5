use anyhow::Result;
use std::path::Path;

use crate::runtime::Runtime;
use crate::userdata::{LinkOutcome, link_user_data};

use super::config::Config;

/// Link the build output into the Foundry user data directory
#[tracing::instrument(skip(config))]
pub async fn link<R: Runtime>(config: Config<R>, manifest: &Path, out_dir: &Path) -> Result<()> {
    let outcome =
        link_user_data(&config.runtime, manifest, out_dir, &config.config_path).await?;

    match outcome {
        LinkOutcome::Linked(path) => println!("Linking build to {}", path.display()),
        LinkOutcome::AlreadyPresent(path) => {
            println!("{} already exists, leaving it in place", path.display())
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CiPlatform;
    use crate::error::is_configuration_error;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_link_reports_configuration_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|path| match path.file_name().and_then(|n| n.to_str()) {
                Some("module.json") => Ok(r#"{"name": "foo"}"#.into()),
                _ => Ok("{}".into()),
            });
        runtime.expect_symlink().never();

        let config = Config::new(runtime, PathBuf::from("foundryconfig.json"), CiPlatform::Gitlab);
        let err = link(config, Path::new("src/module.json"), Path::new("dist"))
            .await
            .unwrap_err();
        assert!(is_configuration_error(&err));
    }
}
