use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{ArchiveEntry, collect_entries};

/// Writer for .zip archives, Deflate at maximum compression.
pub struct ZipArchiver;

impl ZipArchiver {
    /// Archive everything under `src_dir` into `dest`, below a single root
    /// folder named `root`. Returns the size of the archive in bytes.
    ///
    /// The archive is streamed to `<dest>.part` and renamed to `dest` once
    /// finalized. On failure the partial file is removed and `dest` is left
    /// as it was.
    #[tracing::instrument(skip(self, runtime))]
    pub fn write<R: Runtime + ?Sized>(
        &self,
        runtime: &R,
        src_dir: &Path,
        root: &str,
        dest: &Path,
    ) -> Result<u64> {
        let entries = collect_entries(runtime, src_dir)
            .with_context(|| format!("Failed to read build output {:?}", src_dir))?;

        let partial = partial_path(dest);
        let bytes = match self.write_entries(runtime, &entries, root, &partial) {
            Ok(bytes) => bytes,
            Err(e) => {
                if runtime.exists(&partial) {
                    if let Err(cleanup) = runtime.remove_file(&partial) {
                        warn!("Failed to remove partial archive {:?}: {:#}", partial, cleanup);
                    }
                }
                return Err(e);
            }
        };
        runtime.rename(&partial, dest)?;

        info!("Wrote {} bytes to {:?}", bytes, dest);
        Ok(bytes)
    }

    fn write_entries<R: Runtime + ?Sized>(
        &self,
        runtime: &R,
        entries: &[ArchiveEntry],
        root: &str,
        partial: &Path,
    ) -> Result<u64> {
        let mut zip = ZipWriter::new(runtime.create_file(partial)?);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        zip.add_directory(format!("{}/", root), options)
            .context("Failed to add root folder to archive")?;

        for entry in entries {
            debug!("Adding {}", entry.name());
            match entry {
                ArchiveEntry::Dir(name) => {
                    zip.add_directory(format!("{}/{}/", root, name), options)
                        .with_context(|| format!("Failed to add directory {} to archive", name))?;
                }
                ArchiveEntry::File(name, path) => {
                    zip.start_file(format!("{}/{}", root, name), options)
                        .with_context(|| format!("Failed to add file {} to archive", name))?;
                    let mut reader = runtime.open(path)?;
                    std::io::copy(&mut reader, &mut zip)
                        .with_context(|| format!("Failed to compress {:?}", path))?;
                }
            }
        }

        let mut file = zip.finish().context("Failed to finalize archive")?;
        file.flush()
            .with_context(|| format!("Failed to write {:?}", partial))?;
        let bytes = file.seek(SeekFrom::End(0))?;
        Ok(bytes)
    }
}

/// `<dest>.part`, next to `dest` so the final rename stays on one filesystem.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
