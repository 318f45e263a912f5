//! Symlink operations (create, detect, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link)
                .with_context(|| format!("Failed to create symlink {:?} -> {:?}", link, original))?;
        }
        #[cfg(windows)]
        {
            use std::os::windows::fs::{symlink_dir, symlink_file};

            // `is_dir()` on a relative path is relative to CWD; we want it relative to the link's parent.
            let target_path = if original.is_absolute() {
                original.to_path_buf()
            } else {
                link.parent()
                    .context("Failed to get parent directory for symlink")?
                    .join(original)
            };

            if target_path.is_dir() {
                symlink_dir(original, link).context("Failed to create directory symlink")?;
            } else {
                symlink_file(original, link).context("Failed to create file symlink")?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).with_context(|| format!("Failed to remove symlink {:?}", path))?;
        }
        #[cfg(windows)]
        {
            // Directory symlinks need remove_dir, file symlinks need remove_file.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .with_context(|| format!("Failed to remove symlink {:?}", path))?;
        }
        Ok(())
    }
}
