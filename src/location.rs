use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::descriptor::{SourceLocation, SourcePath};
use crate::file::File;
use crate::wire::WireLocation;

/// A reference to a place inside a [`File`].
///
/// Line, column and comment data are resolved from the file's source info on
/// first access and memoized. Clones share the memo.
#[derive(Clone)]
pub struct Location {
    file: File,
    source_path: SourcePath,
    resolved: Arc<OnceLock<SourceLocation>>,
}

impl Location {
    #[must_use]
    pub fn new(file: File, source_path: SourcePath) -> Self {
        Self {
            file,
            source_path,
            resolved: Arc::new(OnceLock::new()),
        }
    }

    #[must_use]
    pub const fn file(&self) -> &File {
        &self.file
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file.name()
    }

    #[must_use]
    pub fn source_path(&self) -> &[i32] {
        &self.source_path
    }

    /// Whether line data has already been looked up.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    fn resolve(&self) -> &SourceLocation {
        self.resolved
            .get_or_init(|| self.file.descriptor().source_location(&self.source_path))
    }

    #[must_use]
    pub fn start_line(&self) -> i32 {
        self.resolve().start_line()
    }

    #[must_use]
    pub fn start_column(&self) -> i32 {
        self.resolve().start_column()
    }

    #[must_use]
    pub fn end_line(&self) -> i32 {
        self.resolve().end_line()
    }

    #[must_use]
    pub fn end_column(&self) -> i32 {
        self.resolve().end_column()
    }

    #[must_use]
    pub fn leading_comments(&self) -> &str {
        &self.resolve().leading_comments
    }

    #[must_use]
    pub fn trailing_comments(&self) -> &str {
        &self.resolve().trailing_comments
    }

    #[must_use]
    pub fn leading_detached_comments(&self) -> &[String] {
        &self.resolve().leading_detached_comments
    }

    pub(crate) fn to_wire(&self) -> WireLocation {
        WireLocation {
            file_name: self.file.name().to_string(),
            source_path: self.source_path.clone(),
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.file_name() == other.file_name() && self.source_path == other.source_path
    }
}

impl Eq for Location {}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("file_name", &self.file_name())
            .field("source_path", &self.source_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "location_tests.rs"]
mod tests;
