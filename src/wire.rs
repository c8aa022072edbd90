//! Serializable messages exchanged between a client and a provider.
//!
//! These types are the engine's view of the RPC payloads. Encoding is JSON via
//! `serde_json`; the transport only moves opaque bytes.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::descriptor::{FileDescriptor, SourcePath};
use crate::error::{CheckError, ErrorCode, Result};
use crate::rule::RuleType;

/// The three operations a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Check,
    ListRules,
    ListCategories,
}

impl Method {
    pub const ALL: [Self; 3] = [Self::Check, Self::ListRules, Self::ListCategories];

    #[must_use]
    pub const fn procedure(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::ListRules => "list-rules",
            Self::ListCategories => "list-categories",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.procedure())
    }
}

impl FromStr for Method {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.procedure() == s)
            .ok_or_else(|| CheckError::UnknownMethod(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFile {
    pub file_descriptor: FileDescriptor,
    #[serde(default)]
    pub is_import: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOption {
    pub key: String,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLocation {
    pub file_name: String,
    #[serde(default)]
    pub source_path: SourcePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAnnotation {
    pub rule_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<WireLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub against_location: Option<WireLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub files: Vec<WireFile>,
    #[serde(default)]
    pub against_files: Vec<WireFile>,
    #[serde(default)]
    pub options: Vec<WireOption>,
    #[serde(default)]
    pub rule_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub annotations: Vec<WireAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRulesRequest {
    /// Zero selects the provider default.
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRulesResponse {
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub rules: Vec<WireRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCategoriesRequest {
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCategoriesResponse {
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub categories: Vec<WireCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRule {
    pub id: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[serde(default)]
    pub default: bool,
    pub purpose: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub replacement_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCategory {
    pub id: String,
    pub purpose: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub replacement_ids: Vec<String>,
}

/// Error payload written in place of a response when a call fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&CheckError> for WireError {
    fn from(error: &CheckError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl WireError {
    #[must_use]
    pub fn into_error(self) -> CheckError {
        CheckError::Remote {
            code: self.code,
            message: self.message,
        }
    }
}

/// Encode a message.
///
/// # Errors
/// Returns [`CheckError::Json`] if serialization fails.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(message)?)
}

/// Decode a message.
///
/// # Errors
/// Returns [`CheckError::Json`] if the bytes are not a valid message of type `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
