//! Filesystem access used while locating and reading check configs.

use std::path::{Path, PathBuf};

/// The filesystem operations config loading needs; swapped for an in-memory
/// table in tests.
pub trait FileSystem {
    /// # Errors
    /// Returns the underlying I/O error if `path` cannot be read as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    fn exists(&self, path: &Path) -> bool;

    /// Directory searched for [`super::LOCAL_CONFIG_NAME`].
    ///
    /// # Errors
    /// Returns an error if the working directory is missing or unreadable.
    fn current_dir(&self) -> std::io::Result<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn current_dir(&self) -> std::io::Result<PathBuf> {
        std::env::current_dir()
    }
}
