use std::collections::BTreeMap;

use crate::error::{CheckError, Result};
use crate::id::validate_option_key;
use crate::wire::WireOption;

/// Validated key to byte-value options passed from caller to rules.
///
/// Keys follow the lowercase identifier family, values are non-empty. Keys are
/// kept in sorted order so the wire form is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, Vec<u8>>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from key/value pairs.
    ///
    /// # Errors
    /// Returns [`CheckError::InvalidId`] for a malformed key and
    /// [`CheckError::InvalidOption`] for an empty value or a repeated key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            validate_option_key(&key)?;
            if value.is_empty() {
                return Err(CheckError::InvalidOption(format!(
                    "value for key {key:?} must not be empty"
                )));
            }
            if values.contains_key(&key) {
                return Err(CheckError::InvalidOption(format!("duplicate key {key:?}")));
            }
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// # Errors
    /// Returns [`CheckError::InvalidOption`] if the value is not valid UTF-8.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        self.get(key)
            .map(|value| {
                std::str::from_utf8(value).map_err(|_| {
                    CheckError::InvalidOption(format!("value for key {key:?} is not valid UTF-8"))
                })
            })
            .transpose()
    }

    /// # Errors
    /// Returns [`CheckError::InvalidOption`] unless the value is `true` or `false`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_str(key)? {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(CheckError::InvalidOption(format!(
                "value for key {key:?} must be \"true\" or \"false\", got {other:?}"
            ))),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn to_wire(&self) -> Vec<WireOption> {
        self.iter()
            .map(|(key, value)| WireOption {
                key: key.to_string(),
                value: value.to_vec(),
            })
            .collect()
    }

    pub(crate) fn from_wire(options: Vec<WireOption>) -> Result<Self> {
        Self::from_pairs(options.into_iter().map(|option| (option.key, option.value)))
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
