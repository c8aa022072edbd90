use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Rule,
    Category,
    /// The shared rule-and-category namespace, used for cross-kind collisions.
    RuleOrCategory,
    OptionKey,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rule => "rule",
            Self::Category => "category",
            Self::RuleOrCategory => "rule or category",
            Self::OptionKey => "option key",
        };
        f.write_str(name)
    }
}

/// Status family an error maps to when it crosses a call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Canceled,
    DeadlineExceeded,
    Unimplemented,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Canceled => "canceled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Duplicate {kind} IDs: {}", .ids.join(", "))]
    DuplicateId { kind: IdKind, ids: Vec<String> },

    #[error("Rule {rule_id:?} references unknown category {category_id:?}")]
    DanglingCategoryReference {
        rule_id: String,
        category_id: String,
    },

    #[error("No rule references category {0:?}")]
    OrphanCategory(String),

    #[error("Invalid replacement on {kind} {id:?}: {reason}")]
    InvalidReplacement {
        kind: IdKind,
        id: String,
        reason: String,
    },

    #[error("Invalid {kind} ID {id:?}: {reason}")]
    InvalidId {
        kind: IdKind,
        id: String,
        reason: &'static str,
    },

    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Cannot reuse response writer: response already written")]
    AlreadyWritten,

    #[error("{}", join_errors(.0))]
    Joined(Vec<CheckError>),

    #[error("Call was cancelled")]
    Cancelled,

    #[error("Call deadline exceeded")]
    DeadlineExceeded,

    #[error("Unknown method: {0:?}")]
    UnknownMethod(String),

    #[error("Provider error ({code}): {message}")]
    Remote { code: ErrorCode, message: String },

    #[error("{0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A failure remembered by a listing cache and returned again on later calls.
    #[error(transparent)]
    Shared(Arc<CheckError>),
}

fn join_errors(errors: &[CheckError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl CheckError {
    /// Wrap an arbitrary error returned by a rule handler.
    pub fn handler<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Handler(error.into())
    }

    /// Join accumulated errors, collapsing the single-error case.
    #[must_use]
    pub fn join(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Joined(errors)),
        }
    }

    /// Status family used when this error is reported to a caller.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_)
            | Self::InvalidRequest(_)
            | Self::InvalidOption(_)
            | Self::InvalidId { .. }
            | Self::Json(_) => ErrorCode::InvalidArgument,
            Self::Cancelled => ErrorCode::Canceled,
            Self::DeadlineExceeded => ErrorCode::DeadlineExceeded,
            Self::UnknownMethod(_) => ErrorCode::Unimplemented,
            Self::Remote { code, .. } => *code,
            Self::Shared(inner) => inner.code(),
            _ => ErrorCode::Internal,
        }
    }

    /// Returns a short label for the error category (used in structured output).
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. }
            | Self::DanglingCategoryReference { .. }
            | Self::OrphanCategory(_)
            | Self::InvalidReplacement { .. }
            | Self::InvalidId { .. }
            | Self::InvalidSpec(_) => "Spec",
            Self::InvalidOption(_) | Self::InvalidRequest(_) | Self::InvalidArgument(_) => {
                "Argument"
            }
            Self::InvalidAnnotation(_) | Self::AlreadyWritten | Self::Joined(_) => "Response",
            Self::Cancelled | Self::DeadlineExceeded => "Context",
            Self::UnknownMethod(_) | Self::Remote { .. } | Self::Json(_) => "Transport",
            Self::Handler(_) => "Handler",
            Self::Io(_) | Self::FileRead { .. } => "IO",
            Self::TomlParse(_) | Self::Config(_) => "Config",
            Self::Shared(_) => "Cached",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
