//! Linking a build into the Foundry VTT user data directory for local testing.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::FoundryConfig;
use crate::error::PackError;
use crate::manifest::{Manifest, ManifestKind};
use crate::runtime::{Runtime, absolutize};

/// Result of [`link_user_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new symlink was created at this path.
    Linked(PathBuf),
    /// Something already occupies the install path; it was left alone.
    AlreadyPresent(PathBuf),
}

/// Result of [`unlink_user_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Removed(PathBuf),
    NotPresent(PathBuf),
}

/// Where the package described by `manifest_path` is installed:
/// `<dataPath>/Data/<modules|systems>/<name>`.
///
/// Reads the manifest and the config file on every call.
#[tracing::instrument(skip(runtime))]
pub fn install_path<R: Runtime + ?Sized>(
    runtime: &R,
    manifest_path: &Path,
    config_path: &Path,
) -> Result<PathBuf> {
    let manifest = Manifest::load(runtime, manifest_path)?;
    let config = FoundryConfig::load(runtime, config_path)?;
    let kind = ManifestKind::from_path(manifest_path)?;

    let data_path = config.data_path.ok_or_else(|| {
        PackError::configuration(format!("No User Data path defined in {:?}", config_path))
    })?;

    let data_dir = data_path.join("Data");
    if !runtime.exists(&data_dir) {
        return Err(PackError::configuration(format!(
            "User Data path invalid, no Data directory found in {:?}",
            data_path
        ))
        .into());
    }

    Ok(data_dir.join(kind.data_dir()).join(manifest.package_name()?))
}

/// Symlink `out_dir` into the user data directory.
///
/// Does nothing when the install path is already taken, including by a
/// dangling or outdated link.
#[tracing::instrument(skip(runtime))]
pub async fn link_user_data<R: Runtime + ?Sized>(
    runtime: &R,
    manifest_path: &Path,
    out_dir: &Path,
    config_path: &Path,
) -> Result<LinkOutcome> {
    let link_dir = install_path(runtime, manifest_path, config_path)?;

    if runtime.exists(&link_dir) || runtime.is_symlink(&link_dir) {
        debug!("{:?} already exists, leaving it in place", link_dir);
        return Ok(LinkOutcome::AlreadyPresent(link_dir));
    }

    let target = absolutize(&runtime.current_dir()?, out_dir);
    info!("Linking build {:?} to {:?}", target, link_dir);
    runtime
        .symlink(&target, &link_dir)
        .with_context(|| format!("Failed to link build to {:?}", link_dir))?;

    Ok(LinkOutcome::Linked(link_dir))
}

/// Remove whatever occupies the install path.
///
/// Removal is always attempted: symlinks are removed without following them,
/// directories recursively, anything else as a file. When nothing appears to
/// be there, a file removal is still tried and its failure ignored.
#[tracing::instrument(skip(runtime))]
pub async fn unlink_user_data<R: Runtime + ?Sized>(
    runtime: &R,
    manifest_path: &Path,
    config_path: &Path,
) -> Result<UnlinkOutcome> {
    let link_dir = install_path(runtime, manifest_path, config_path)?;

    if runtime.is_symlink(&link_dir) {
        info!("Removing link {:?}", link_dir);
        runtime.remove_symlink(&link_dir)?;
    } else if runtime.is_dir(&link_dir) {
        info!("Removing build directory {:?}", link_dir);
        runtime.remove_dir_all(&link_dir)?;
    } else if runtime.exists(&link_dir) {
        info!("Removing file {:?}", link_dir);
        runtime.remove_file(&link_dir)?;
    } else {
        debug!("Nothing to remove at {:?}", link_dir);
        if let Err(e) = runtime.remove_file(&link_dir) {
            debug!("Ignoring removal failure for {:?}: {:#}", link_dir, e);
        }
        return Ok(UnlinkOutcome::NotPresent(link_dir));
    }

    Ok(UnlinkOutcome::Removed(link_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_configuration_error;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::{test_cwd, test_data_path};
    use mockall::predicate::eq;

    fn manifest_path() -> PathBuf {
        PathBuf::from("src").join("module.json")
    }

    fn config_path() -> PathBuf {
        PathBuf::from("foundryconfig.json")
    }

    /// Mock returning the given manifest and config contents.
    fn runtime_with(manifest: &'static str, config: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(config_path()))
            .returning(move |_| Ok(config.to_string()));
        runtime
            .expect_read_to_string()
            .returning(move |_| Ok(manifest.to_string()));
        runtime
    }

    fn config_json() -> &'static str {
        #[cfg(not(windows))]
        {
            r#"{"dataPath": "/data"}"#
        }
        #[cfg(windows)]
        {
            r#"{"dataPath": "C:\\data"}"#
        }
    }

    #[test]
    fn test_install_path_module() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime
            .expect_exists()
            .with(eq(test_data_path().join("Data")))
            .returning(|_| true);

        let path = install_path(&runtime, &manifest_path(), &config_path()).unwrap();
        assert_eq!(path, test_data_path().join("Data").join("modules").join("foo"));
    }

    #[test]
    fn test_install_path_system() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime.expect_exists().returning(|_| true);

        let path = install_path(&runtime, Path::new("system.json"), &config_path()).unwrap();
        assert_eq!(path, test_data_path().join("Data").join("systems").join("foo"));
    }

    #[test]
    fn test_install_path_missing_data_path() {
        let runtime = runtime_with(r#"{"name": "foo"}"#, "{}");
        let err = install_path(&runtime, &manifest_path(), &config_path()).unwrap_err();
        assert!(is_configuration_error(&err));
        assert!(err.to_string().contains("No User Data path defined"));
    }

    #[test]
    fn test_install_path_missing_data_dir() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime.expect_exists().returning(|_| false);

        let err = install_path(&runtime, &manifest_path(), &config_path()).unwrap_err();
        assert!(is_configuration_error(&err));
        assert!(err.to_string().contains("no Data directory found"));
    }

    #[test]
    fn test_install_path_unrecognized_manifest_name() {
        let runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        let err = install_path(&runtime, Path::new("world.json"), &config_path()).unwrap_err();
        assert!(is_configuration_error(&err));
    }

    #[tokio::test]
    async fn test_link_creates_symlink_to_absolute_out_dir() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        let link = test_data_path().join("Data").join("modules").join("foo");

        runtime
            .expect_exists()
            .with(eq(test_data_path().join("Data")))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(link.clone()))
            .returning(|_| false);
        runtime
            .expect_is_symlink()
            .with(eq(link.clone()))
            .returning(|_| false);
        runtime.expect_current_dir().returning(|| Ok(test_cwd()));
        runtime
            .expect_symlink()
            .with(eq(test_cwd().join("dist")), eq(link.clone()))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = link_user_data(&runtime, &manifest_path(), Path::new("./dist"), &config_path())
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::Linked(link));
    }

    #[tokio::test]
    async fn test_link_is_noop_when_install_path_exists() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime.expect_exists().returning(|_| true);
        runtime.expect_symlink().never();

        let outcome = link_user_data(&runtime, &manifest_path(), Path::new("dist"), &config_path())
            .await
            .unwrap();
        assert!(matches!(outcome, LinkOutcome::AlreadyPresent(_)));
    }

    #[test]
    fn test_install_path_rejects_unusable_names() {
        for manifest in [
            r#"{"name": ""}"#,
            r#"{"name": ".."}"#,
            r#"{"name": "a/b"}"#,
        ] {
            let mut runtime = runtime_with(manifest, config_json());
            runtime.expect_exists().returning(|_| true);

            let err = install_path(&runtime, &manifest_path(), &config_path()).unwrap_err();
            assert!(is_configuration_error(&err), "{} should be rejected", manifest);
        }
    }

    #[tokio::test]
    async fn test_unlink_empty_name_touches_nothing() {
        let mut runtime = runtime_with(r#"{"name": ""}"#, config_json());
        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_dir().returning(|_| true);
        runtime.expect_is_symlink().returning(|_| false);
        runtime.expect_remove_dir_all().never();
        runtime.expect_remove_file().never();
        runtime.expect_remove_symlink().never();

        let err = unlink_user_data(&runtime, &manifest_path(), &config_path())
            .await
            .unwrap_err();
        assert!(is_configuration_error(&err));
    }

    #[tokio::test]
    async fn test_link_leaves_dangling_symlink_alone() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        let link = test_data_path().join("Data").join("modules").join("foo");
        runtime
            .expect_exists()
            .with(eq(test_data_path().join("Data")))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(link.clone()))
            .returning(|_| false);
        runtime
            .expect_is_symlink()
            .with(eq(link.clone()))
            .returning(|_| true);
        runtime.expect_symlink().never();

        let outcome = link_user_data(&runtime, &manifest_path(), Path::new("dist"), &config_path())
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::AlreadyPresent(link));
    }

    #[tokio::test]
    async fn test_unlink_absent_still_succeeds() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        let link = test_data_path().join("Data").join("modules").join("foo");
        runtime
            .expect_exists()
            .with(eq(test_data_path().join("Data")))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(link.clone()))
            .returning(|_| false);
        runtime.expect_is_symlink().returning(|_| false);
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_remove_file()
            .with(eq(link.clone()))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));
        runtime.expect_remove_dir_all().never();
        runtime.expect_remove_symlink().never();

        let outcome = unlink_user_data(&runtime, &manifest_path(), &config_path())
            .await
            .unwrap();
        assert_eq!(outcome, UnlinkOutcome::NotPresent(link));
    }

    #[tokio::test]
    async fn test_unlink_removes_symlink_without_following() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_symlink().returning(|_| true);
        runtime.expect_remove_dir_all().never();
        runtime.expect_remove_symlink().times(1).returning(|_| Ok(()));

        let outcome = unlink_user_data(&runtime, &manifest_path(), &config_path())
            .await
            .unwrap();
        assert!(matches!(outcome, UnlinkOutcome::Removed(_)));
    }

    #[tokio::test]
    async fn test_unlink_removes_real_directory() {
        let mut runtime = runtime_with(r#"{"name": "foo"}"#, config_json());
        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_symlink().returning(|_| false);
        runtime.expect_is_dir().returning(|_| true);
        runtime.expect_remove_dir_all().times(1).returning(|_| Ok(()));

        unlink_user_data(&runtime, &manifest_path(), &config_path())
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn test_link_and_unlink_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let data = root.join("userdata");
        std::fs::create_dir_all(data.join("Data").join("modules")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("dist")).unwrap();
        std::fs::write(root.join("dist").join("index.js"), "export {}").unwrap();
        std::fs::write(root.join("src").join("module.json"), r#"{"name": "foo"}"#).unwrap();
        let config = root.join("foundryconfig.json");
        std::fs::write(
            &config,
            serde_json::json!({ "dataPath": data }).to_string(),
        )
        .unwrap();

        let runtime = RealRuntime;
        let manifest = root.join("src").join("module.json");
        let out_dir = root.join("dist");
        let link = data.join("Data").join("modules").join("foo");

        let first = link_user_data(&runtime, &manifest, &out_dir, &config)
            .await
            .unwrap();
        assert_eq!(first, LinkOutcome::Linked(link.clone()));
        assert!(link.is_symlink());
        assert!(link.join("index.js").exists());

        let second = link_user_data(&runtime, &manifest, &out_dir, &config)
            .await
            .unwrap();
        assert_eq!(second, LinkOutcome::AlreadyPresent(link.clone()));

        let removed = unlink_user_data(&runtime, &manifest, &config).await.unwrap();
        assert_eq!(removed, UnlinkOutcome::Removed(link.clone()));
        assert!(!link.exists() && !link.is_symlink());
        // The build output survives
        assert!(out_dir.join("index.js").exists());

        let again = unlink_user_data(&runtime, &manifest, &config).await.unwrap();
        assert_eq!(again, UnlinkOutcome::NotPresent(link));
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn test_unlink_with_empty_name_keeps_other_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let data = root.join("userdata");
        let other = data.join("Data").join("modules").join("someone-elses-module");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src").join("module.json"), r#"{"name": ""}"#).unwrap();
        let config = root.join("foundryconfig.json");
        std::fs::write(&config, serde_json::json!({ "dataPath": data }).to_string()).unwrap();

        let result =
            unlink_user_data(&RealRuntime, &root.join("src").join("module.json"), &config).await;
        assert!(result.is_err());
        assert!(other.exists());
    }
}
