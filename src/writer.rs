//! Per-call annotation collection.
//!
//! A [`ResponseCollector`] is built once per Check call. Each rule handler gets a
//! [`ResponseWriter`] scoped to its rule ID; writers may be used from several
//! threads at once. Misuse (conflicting location styles, unknown files, writing
//! after finalization) is recorded instead of raised and surfaces, joined, from
//! [`ResponseCollector::to_response`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::annotation::Annotation;
use crate::descriptor::{Descriptor, SourcePath};
use crate::error::{CheckError, Result};
use crate::file::{File, file_name_to_file};
use crate::location::Location;
use crate::request::Request;
use crate::response::Response;
use crate::wire::{WireAnnotation, WireLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
struct DescriptorTarget {
    file_name: Option<String>,
    source_path: SourcePath,
}

impl DescriptorTarget {
    fn of<D: Descriptor + ?Sized>(descriptor: &D) -> Self {
        Self {
            file_name: descriptor.parent_file().map(str::to_string),
            source_path: descriptor.source_path(),
        }
    }
}

/// Where one side (current or against) of an annotation points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Target {
    descriptor: Option<DescriptorTarget>,
    file_name: Option<String>,
    source_path: Option<SourcePath>,
}

impl Target {
    fn validate(&self, side: &str) -> Result<()> {
        if self.descriptor.is_some() && (self.file_name.is_some() || self.source_path.is_some()) {
            return Err(CheckError::InvalidAnnotation(format!(
                "cannot set both {side}descriptor and {side}file name or {side}source path"
            )));
        }
        if self.source_path.is_some() && self.file_name.is_none() {
            return Err(CheckError::InvalidAnnotation(format!(
                "cannot set {side}source path without {side}file name"
            )));
        }
        Ok(())
    }

    fn resolve(self, files: &HashMap<String, File>) -> Result<Option<Location>> {
        let (file_name, source_path) = match (self.descriptor, self.file_name) {
            (Some(DescriptorTarget { file_name: None, .. }), _) | (None, None) => return Ok(None),
            (Some(DescriptorTarget {
                file_name: Some(file_name),
                source_path,
            }), _) => (file_name, source_path),
            (None, Some(file_name)) => (file_name, self.source_path.unwrap_or_default()),
        };
        let file = files.get(&file_name).ok_or_else(|| {
            CheckError::InvalidAnnotation(format!(
                "cannot add annotation for unknown file: {file_name:?}"
            ))
        })?;
        Ok(Some(Location::new(file.clone(), source_path)))
    }

    fn from_wire(location: Option<WireLocation>) -> Self {
        location.map_or_else(Self::default, |location| Self {
            descriptor: None,
            file_name: Some(location.file_name),
            source_path: Some(location.source_path),
        })
    }
}

/// Describes one annotation to add through a [`ResponseWriter`].
///
/// A side is located either by a descriptor or by an explicit file name with
/// an optional structural path, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationBuilder {
    message: String,
    current: Target,
    against: Target,
}

impl AnnotationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn descriptor<D: Descriptor + ?Sized>(mut self, descriptor: &D) -> Self {
        self.current.descriptor = Some(DescriptorTarget::of(descriptor));
        self
    }

    #[must_use]
    pub fn against_descriptor<D: Descriptor + ?Sized>(mut self, descriptor: &D) -> Self {
        self.against.descriptor = Some(DescriptorTarget::of(descriptor));
        self
    }

    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.current.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn source_path(mut self, source_path: SourcePath) -> Self {
        self.current.source_path = Some(source_path);
        self
    }

    #[must_use]
    pub fn against_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.against.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn against_source_path(mut self, source_path: SourcePath) -> Self {
        self.against.source_path = Some(source_path);
        self
    }

    pub(crate) fn from_wire(annotation: WireAnnotation) -> (String, Self) {
        let builder = Self {
            message: annotation.message,
            current: Target::from_wire(annotation.location),
            against: Target::from_wire(annotation.against_location),
        };
        (annotation.rule_id, builder)
    }
}

#[derive(Default)]
struct State {
    annotations: Vec<Annotation>,
    errors: Vec<CheckError>,
    written: bool,
}

struct Shared {
    files: HashMap<String, File>,
    against_files: HashMap<String, File>,
    state: RwLock<State>,
}

impl Shared {
    fn build(&self, rule_id: &str, builder: AnnotationBuilder) -> Result<Annotation> {
        builder.current.validate("")?;
        builder.against.validate("against ")?;
        let location = builder.current.resolve(&self.files)?;
        let against_location = builder.against.resolve(&self.against_files)?;
        Annotation::new(rule_id, builder.message, location, against_location)
    }
}

/// Collects annotations for one Check call and produces its [`Response`] once.
pub struct ResponseCollector {
    shared: Arc<Shared>,
}

impl ResponseCollector {
    /// # Errors
    /// Returns [`CheckError::InvalidRequest`] if a file path repeats within the
    /// request's files or against files.
    pub fn new(request: &Request) -> Result<Self> {
        Ok(Self {
            shared: Arc::new(Shared {
                files: file_name_to_file(request.files())?,
                against_files: file_name_to_file(request.against_files())?,
                state: RwLock::new(State::default()),
            }),
        })
    }

    /// A writer whose annotations are all tagged with `rule_id`.
    #[must_use]
    pub fn writer(&self, rule_id: impl Into<String>) -> ResponseWriter {
        ResponseWriter {
            shared: Arc::clone(&self.shared),
            rule_id: rule_id.into(),
        }
    }

    /// Finalize the collected annotations.
    ///
    /// # Errors
    /// Returns every recorded annotation error, joined, and
    /// [`CheckError::AlreadyWritten`] on any call after the first.
    pub fn to_response(&self) -> Result<Response> {
        let state = self.shared.state.upgradable_read();
        if state.written {
            return Err(CheckError::AlreadyWritten);
        }
        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        state.written = true;
        if let Some(err) = CheckError::join(std::mem::take(&mut state.errors)) {
            return Err(err);
        }
        Ok(Response::new(std::mem::take(&mut state.annotations)))
    }
}

impl fmt::Debug for ResponseCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCollector")
            .field("files", &self.shared.files.len())
            .field("against_files", &self.shared.against_files.len())
            .finish_non_exhaustive()
    }
}

/// Adds annotations for a single rule.
#[derive(Clone)]
pub struct ResponseWriter {
    shared: Arc<Shared>,
    rule_id: String,
}

impl ResponseWriter {
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Record an annotation. Errors are deferred to
    /// [`ResponseCollector::to_response`].
    pub fn add_annotation(&self, annotation: AnnotationBuilder) {
        let result = self.shared.build(&self.rule_id, annotation);
        let mut state = self.shared.state.write();
        if state.written {
            state.errors.push(CheckError::AlreadyWritten);
            return;
        }
        match result {
            Ok(annotation) => state.annotations.push(annotation),
            Err(err) => state.errors.push(err),
        }
    }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("rule_id", &self.rule_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
