use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::FileDescriptor;
use crate::error::{CheckError, Result};
use crate::wire::WireFile;

/// A schema file handed to rule handlers.
///
/// Identity is the file path. Import files are dependencies pulled in to
/// resolve references and are normally not checked directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    descriptor: Arc<FileDescriptor>,
    is_import: bool,
}

impl File {
    #[must_use]
    pub fn new(descriptor: FileDescriptor, is_import: bool) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            is_import,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn is_import(&self) -> bool {
        self.is_import
    }

    /// Whether the file omitted its `syntax` declaration.
    #[must_use]
    pub fn is_syntax_unspecified(&self) -> bool {
        self.descriptor
            .syntax
            .as_deref()
            .is_none_or(str::is_empty)
    }

    pub(crate) fn to_wire(&self) -> WireFile {
        WireFile {
            file_descriptor: (*self.descriptor).clone(),
            is_import: self.is_import,
        }
    }

    pub(crate) fn from_wire(wire: WireFile) -> Self {
        Self::new(wire.file_descriptor, wire.is_import)
    }
}

/// Index files by path.
///
/// # Errors
/// Returns [`CheckError::InvalidRequest`] if a path is empty or appears twice.
pub(crate) fn file_name_to_file(files: &[File]) -> Result<HashMap<String, File>> {
    let mut by_name = HashMap::with_capacity(files.len());
    for file in files {
        if file.name().is_empty() {
            return Err(CheckError::InvalidRequest(
                "file name must not be empty".to_string(),
            ));
        }
        if by_name
            .insert(file.name().to_string(), file.clone())
            .is_some()
        {
            return Err(CheckError::InvalidRequest(format!(
                "duplicate file name: {:?}",
                file.name()
            )));
        }
    }
    Ok(by_name)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
