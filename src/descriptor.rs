//! Schema-description model consumed by rule handlers.
//!
//! This is the boundary to the schema library: the engine only needs a file
//! path and a structural path for any descriptor, plus source locations keyed
//! by structural path. Structural paths use descriptor-proto field numbers.

use serde::{Deserialize, Serialize};

/// Structural path into a file descriptor (descriptor-proto field numbers and indexes).
pub type SourcePath = Vec<i32>;

const FILE_PACKAGE_TAG: i32 = 2;
const FILE_MESSAGE_TAG: i32 = 4;
const FILE_SYNTAX_TAG: i32 = 12;
const MESSAGE_FIELD_TAG: i32 = 2;
const MESSAGE_NESTED_TAG: i32 = 3;

/// Source span and comments attached to one structural path.
///
/// `span` is either `[start_line, start_column, end_column]` (single line) or
/// `[start_line, start_column, end_line, end_column]`, zero-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub path: SourcePath,
    #[serde(default)]
    pub span: Vec<i32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub leading_comments: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trailing_comments: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_detached_comments: Vec<String>,
}

impl SourceLocation {
    #[must_use]
    pub fn new(path: SourcePath, span: Vec<i32>) -> Self {
        Self {
            path,
            span,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_leading_comments(mut self, comments: impl Into<String>) -> Self {
        self.leading_comments = comments.into();
        self
    }

    #[must_use]
    pub fn with_trailing_comments(mut self, comments: impl Into<String>) -> Self {
        self.trailing_comments = comments.into();
        self
    }

    #[must_use]
    pub fn start_line(&self) -> i32 {
        self.span.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn start_column(&self) -> i32 {
        self.span.get(1).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn end_line(&self) -> i32 {
        match self.span.len() {
            3 => self.start_line(),
            4 => self.span[2],
            _ => 0,
        }
    }

    #[must_use]
    pub fn end_column(&self) -> i32 {
        match self.span.len() {
            3 => self.span[2],
            4 => self.span[3],
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    /// Fully qualified message type name, `None` for scalar fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn scalar(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: None,
        }
    }

    #[must_use]
    pub fn message(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: Some(type_name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub nested_messages: Vec<MessageDescriptor>,
}

impl MessageDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_nested_message(mut self, message: Self) -> Self {
        self.nested_messages.push(message);
        self
    }
}

/// One schema file as produced by the schema library, including source info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// `None` when the file does not declare a syntax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub source_locations: Vec<SourceLocation>,
}

impl FileDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    #[must_use]
    pub fn with_source_location(mut self, location: SourceLocation) -> Self {
        self.source_locations.push(location);
        self
    }

    /// Looks up the source location recorded for `path`.
    ///
    /// Returns an empty location (no span, no comments) when nothing was recorded.
    #[must_use]
    pub fn source_location(&self, path: &[i32]) -> SourceLocation {
        self.source_locations
            .iter()
            .find(|location| location.path == path)
            .cloned()
            .unwrap_or_default()
    }

    /// Structural path of the `syntax` declaration.
    #[must_use]
    pub fn syntax_path() -> SourcePath {
        vec![FILE_SYNTAX_TAG]
    }

    /// Structural path of the `package` declaration.
    #[must_use]
    pub fn package_path() -> SourcePath {
        vec![FILE_PACKAGE_TAG]
    }

    /// Top-level messages with their structural paths.
    pub fn message_refs(&self) -> impl Iterator<Item = MessageRef<'_>> {
        self.messages.iter().enumerate().map(move |(i, message)| {
            let full_name = qualify(&self.package, &message.name);
            MessageRef {
                file: self,
                message,
                path: vec![FILE_MESSAGE_TAG, index_to_i32(i)],
                full_name,
            }
        })
    }
}

/// Anything that can be located inside a schema file.
pub trait Descriptor {
    /// Path of the file that declares this descriptor, if any.
    fn parent_file(&self) -> Option<&str>;

    /// Structural path of this descriptor within its file.
    fn source_path(&self) -> SourcePath;
}

impl Descriptor for FileDescriptor {
    fn parent_file(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn source_path(&self) -> SourcePath {
        SourcePath::new()
    }
}

/// A message viewed in the context of its file.
#[derive(Debug, Clone)]
pub struct MessageRef<'a> {
    file: &'a FileDescriptor,
    message: &'a MessageDescriptor,
    path: SourcePath,
    full_name: String,
}

impl<'a> MessageRef<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.message.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn file(&self) -> &'a FileDescriptor {
        self.file
    }

    #[must_use]
    pub const fn descriptor(&self) -> &'a MessageDescriptor {
        self.message
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'a>> + '_ {
        self.message
            .fields
            .iter()
            .enumerate()
            .map(move |(i, field)| FieldRef {
                file: self.file,
                field,
                path: child_path(&self.path, MESSAGE_FIELD_TAG, i),
                full_name: qualify(&self.full_name, &field.name),
            })
    }

    pub fn nested_messages(&self) -> impl Iterator<Item = MessageRef<'a>> + '_ {
        self.message
            .nested_messages
            .iter()
            .enumerate()
            .map(move |(i, message)| MessageRef {
                file: self.file,
                message,
                path: child_path(&self.path, MESSAGE_NESTED_TAG, i),
                full_name: qualify(&self.full_name, &message.name),
            })
    }
}

impl Descriptor for MessageRef<'_> {
    fn parent_file(&self) -> Option<&str> {
        Some(&self.file.name)
    }

    fn source_path(&self) -> SourcePath {
        self.path.clone()
    }
}

/// A field viewed in the context of its file.
#[derive(Debug, Clone)]
pub struct FieldRef<'a> {
    file: &'a FileDescriptor,
    field: &'a FieldDescriptor,
    path: SourcePath,
    full_name: String,
}

impl<'a> FieldRef<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn number(&self) -> i32 {
        self.field.number
    }

    /// Fully qualified message type of the field, `None` for scalars.
    #[must_use]
    pub fn message_type(&self) -> Option<&'a str> {
        self.field.type_name.as_deref()
    }

    #[must_use]
    pub const fn file(&self) -> &'a FileDescriptor {
        self.file
    }
}

impl Descriptor for FieldRef<'_> {
    fn parent_file(&self) -> Option<&str> {
        Some(&self.file.name)
    }

    fn source_path(&self) -> SourcePath {
        self.path.clone()
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn child_path(parent: &[i32], tag: i32, index: usize) -> SourcePath {
    let mut path = Vec::with_capacity(parent.len() + 2);
    path.extend_from_slice(parent);
    path.push(tag);
    path.push(index_to_i32(index));
    path
}

fn index_to_i32(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
