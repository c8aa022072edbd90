use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Supported config version.
pub const CONFIG_VERSION: &str = "1";

/// Caller-side selection of rules and options for a Check call.
///
/// ```toml
/// version = "1"
/// use = ["STYLE", "TIMESTAMP_SUFFIX"]
/// except = ["FIELD_LOWER_SNAKE_CASE"]
///
/// [options]
/// timestamp_suffix = "_at"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Rule or category IDs to run. Empty means the provider defaults.
    #[serde(default, rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub use_ids: Vec<String>,

    /// Rule or category IDs removed after `use` is expanded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,

    /// Options forwarded to every rule.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
