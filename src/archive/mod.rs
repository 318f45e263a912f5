mod zip;

use crate::runtime::Runtime;
use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};

pub use zip::ZipArchiver;

/// One item found while walking a directory to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    /// Directory, by `/`-separated path relative to the walked root.
    Dir(String),
    /// File, by relative name and the path to read it from.
    File(String, PathBuf),
}

impl ArchiveEntry {
    pub fn name(&self) -> &str {
        match self {
            ArchiveEntry::Dir(name) | ArchiveEntry::File(name, _) => name,
        }
    }
}

/// Walk `dir` recursively. Entries come out sorted by path with each
/// directory before its contents, so archives are reproducible.
///
/// Symlinks to files are archived as the file they point to. Symlinks to
/// directories and dangling symlinks are skipped.
#[tracing::instrument(skip(runtime))]
pub fn collect_entries<R: Runtime + ?Sized>(runtime: &R, dir: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    walk(runtime, dir, "", &mut entries)?;
    Ok(entries)
}

fn walk<R: Runtime + ?Sized>(
    runtime: &R,
    dir: &Path,
    prefix: &str,
    entries: &mut Vec<ArchiveEntry>,
) -> Result<()> {
    let mut children = runtime.read_dir(dir)?;
    children.sort();

    for child in children {
        let Some(file_name) = child.file_name() else {
            continue;
        };
        let name = format!("{}{}", prefix, file_name.to_string_lossy());
        if runtime.is_symlink(&child) && (runtime.is_dir(&child) || !runtime.exists(&child)) {
            warn!("Skipping symlink {:?}, only links to files are archived", child);
            continue;
        }
        if runtime.is_dir(&child) {
            entries.push(ArchiveEntry::Dir(name.clone()));
            walk(runtime, &child, &format!("{}/", name), entries)?;
        } else {
            entries.push(ArchiveEntry::File(name, child));
        }
    }
    Ok(())
}
