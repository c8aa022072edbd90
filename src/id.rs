//! Identifier validation, duplicate detection, and comparison helpers.
//!
//! Rule and category IDs share the uppercase family (`FIELD_LOWER_SNAKE_CASE`),
//! option keys use the lowercase family (`timestamp_suffix`). Both must be at
//! least [`MIN_ID_LEN`] characters and start and end with a letter.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CheckError, IdKind, Result};

/// Minimum length of any identifier.
pub const MIN_ID_LEN: usize = 4;

static UPPER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z_]*[A-Z]$").expect("Invalid regex"));

static LOWER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z_]*[a-z]$").expect("Invalid regex"));

/// Validate a rule ID.
///
/// # Errors
/// Returns [`CheckError::InvalidId`] if the ID is too short or not in the uppercase family.
pub fn validate_rule_id(id: &str) -> Result<()> {
    validate_id(IdKind::Rule, id)
}

/// Validate a category ID.
///
/// # Errors
/// Returns [`CheckError::InvalidId`] if the ID is too short or not in the uppercase family.
pub fn validate_category_id(id: &str) -> Result<()> {
    validate_id(IdKind::Category, id)
}

/// Validate an option key.
///
/// # Errors
/// Returns [`CheckError::InvalidId`] if the key is too short or not in the lowercase family.
pub fn validate_option_key(key: &str) -> Result<()> {
    validate_id(IdKind::OptionKey, key)
}

fn validate_id(kind: IdKind, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CheckError::InvalidId {
            kind,
            id: id.to_string(),
            reason: "must not be empty",
        });
    }
    if id.len() < MIN_ID_LEN {
        return Err(CheckError::InvalidId {
            kind,
            id: id.to_string(),
            reason: "must have at least four characters",
        });
    }
    let (pattern, reason) = match kind {
        IdKind::OptionKey => (
            &*LOWER_ID_PATTERN,
            "must start and end with a-z and contain only a-z and '_'",
        ),
        IdKind::Rule | IdKind::Category | IdKind::RuleOrCategory => (
            &*UPPER_ID_PATTERN,
            "must start and end with A-Z and contain only A-Z and '_'",
        ),
    };
    if !pattern.is_match(id) {
        return Err(CheckError::InvalidId {
            kind,
            id: id.to_string(),
            reason,
        });
    }
    Ok(())
}

/// Returns every ID that appears more than once, sorted.
#[must_use]
pub fn duplicate_ids<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    let mut duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    duplicates.sort();
    duplicates
}

/// Fails with [`CheckError::DuplicateId`] if any ID repeats.
///
/// # Errors
/// Returns the sorted list of repeated IDs tagged with `kind`.
pub fn ensure_unique<'a, I>(kind: IdKind, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let ids = duplicate_ids(ids);
    if ids.is_empty() {
        Ok(())
    } else {
        Err(CheckError::DuplicateId { kind, ids })
    }
}

/// Orders a missing value before a present one; two present values compare equal.
#[must_use]
pub const fn presence_cmp<T>(one: Option<&T>, two: Option<&T>) -> Ordering {
    match (one, two) {
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
