//! Runtime abstraction for system operations.
//!
//! Every filesystem and environment access made by the linker, the manifest
//! builder and the archiver goes through [`Runtime`], so each of them can be
//! tested against a `MockRuntime` without touching the real disk.
//!
//! # Structure
//!
//! - `path` - Lexical path helpers (normalize, absolutize)
//! - `env` - Environment variables and the working directory
//! - `fs` - File system operations (read, write, create, rename, directory)
//! - `symlink` - Symlink operations (create, detect, remove)

mod env;
mod fs;
pub mod path;
mod symlink;

use anyhow::Result;
use std::env as std_env;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

pub use path::{absolutize, normalize_path};

/// Writable and seekable file handle, as needed by `zip::ZipWriter`.
pub trait WriteSeek: Write + Seek + Send {}

impl<T: Write + Seek + Send> WriteSeek for T {}

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_file(&self, path: &Path) -> Result<Box<dyn WriteSeek>>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>>;

    // Symlinks
    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;
    fn is_symlink(&self, path: &Path) -> bool;
    fn remove_symlink(&self, path: &Path) -> Result<()>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn WriteSeek>> {
        self.create_file_impl(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        self.open_impl(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        self.symlink_impl(original, link)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.is_symlink_impl(path)
    }

    fn remove_symlink(&self, path: &Path) -> Result<()> {
        self.remove_symlink_impl(path)
    }
}
