//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Resolve `path` against `base` (usually the working directory) and normalize it.
///
/// An absolute `path` is only normalized, `base` is ignored.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_with_dot() {
        assert_eq!(
            normalize_path(Path::new("/work/./mymod/./dist")),
            PathBuf::from("/work/mymod/dist")
        );
    }

    #[test]
    fn test_normalize_path_with_parent_dir() {
        assert_eq!(
            normalize_path(Path::new("/work/mymod/../other/dist")),
            PathBuf::from("/work/other/dist")
        );
    }

    #[test]
    fn test_normalize_path_relative() {
        assert_eq!(
            normalize_path(Path::new("foo/bar/../baz")),
            PathBuf::from("foo/baz")
        );
    }

    #[test]
    fn test_normalize_path_leading_parent_is_kept() {
        assert_eq!(normalize_path(Path::new("../dist")), PathBuf::from("../dist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolutize_relative() {
        assert_eq!(
            absolutize(Path::new("/work/mymod"), Path::new("./dist")),
            PathBuf::from("/work/mymod/dist")
        );
        assert_eq!(
            absolutize(Path::new("/work/mymod"), Path::new("../shared/dist")),
            PathBuf::from("/work/shared/dist")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolutize_absolute_ignores_base() {
        assert_eq!(
            absolutize(Path::new("/work/mymod"), Path::new("/tmp/build/../dist")),
            PathBuf::from("/tmp/dist")
        );
    }
}
