//! Caller-visible rule and category metadata.
//!
//! [`Rule`] and [`Category`] are what `list_rules`/`list_categories` return. They
//! carry no handler; see [`crate::spec`] for the provider-side declarations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, IdKind, Result};
use crate::id::ensure_unique;
use crate::wire::{WireCategory, WireRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Checks a single schema version.
    Lint,
    /// Compares a schema against a previous version.
    Breaking,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lint => f.write_str("lint"),
            Self::Breaking => f.write_str("breaking"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: String,
    purpose: String,
    deprecated: bool,
    replacement_ids: Vec<String>,
}

impl Category {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    #[must_use]
    pub fn replacement_ids(&self) -> &[String] {
        &self.replacement_ids
    }

    pub(crate) fn from_wire(wire: WireCategory) -> Self {
        Self {
            id: wire.id,
            purpose: wire.purpose,
            deprecated: wire.deprecated,
            replacement_ids: wire.replacement_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: String,
    categories: Vec<Category>,
    default: bool,
    purpose: String,
    rule_type: RuleType,
    deprecated: bool,
    replacement_ids: Vec<String>,
}

impl Rule {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::id)
    }

    /// Whether the rule runs when a request names no rules.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.default
    }

    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    #[must_use]
    pub fn replacement_ids(&self) -> &[String] {
        &self.replacement_ids
    }

    /// Rebuild a rule from its wire form, resolving category IDs.
    ///
    /// # Errors
    /// Returns [`CheckError::DanglingCategoryReference`] if a category ID is not in `categories`.
    pub(crate) fn from_wire(
        wire: WireRule,
        categories: &HashMap<String, Category>,
    ) -> Result<Self> {
        let categories = wire
            .category_ids
            .iter()
            .map(|category_id| {
                categories.get(category_id).cloned().ok_or_else(|| {
                    CheckError::DanglingCategoryReference {
                        rule_id: wire.id.clone(),
                        category_id: category_id.clone(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: wire.id,
            categories,
            default: wire.default,
            purpose: wire.purpose,
            rule_type: wire.rule_type,
            deprecated: wire.deprecated,
            replacement_ids: wire.replacement_ids,
        })
    }
}

/// Sort rules by ID after checking they are unique.
///
/// # Errors
/// Returns [`CheckError::DuplicateId`] if two rules share an ID.
pub fn sorted_unique_rules(mut rules: Vec<Rule>) -> Result<Vec<Rule>> {
    ensure_unique(IdKind::Rule, rules.iter().map(Rule::id))?;
    rules.sort_by(|one, two| one.id.cmp(&two.id));
    Ok(rules)
}

/// Sort categories by ID after checking they are unique.
///
/// # Errors
/// Returns [`CheckError::DuplicateId`] if two categories share an ID.
pub fn sorted_unique_categories(mut categories: Vec<Category>) -> Result<Vec<Category>> {
    ensure_unique(IdKind::Category, categories.iter().map(Category::id))?;
    categories.sort_by(|one, two| one.id.cmp(&two.id));
    Ok(categories)
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
