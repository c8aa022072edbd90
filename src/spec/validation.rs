use std::collections::{HashMap, HashSet};

use crate::error::{CheckError, IdKind, Result};
use crate::id::{ensure_unique, validate_category_id, validate_rule_id};

use super::{CategorySpec, RuleSpec, Spec};

/// Check a spec for global consistency.
///
/// # Errors
/// Returns the first violation found, in this order: no rules, malformed IDs,
/// duplicate IDs (within rules, within categories, then across both), missing
/// purpose, dangling category references, deprecated default rules, invalid
/// replacements, and categories no rule references.
pub fn validate_spec(spec: &Spec) -> Result<()> {
    if spec.rules.is_empty() {
        return Err(CheckError::InvalidSpec("spec has no rules".to_string()));
    }
    for rule in &spec.rules {
        validate_rule_id(&rule.id)?;
    }
    for category in &spec.categories {
        validate_category_id(&category.id)?;
    }

    ensure_unique(IdKind::Rule, spec.rules.iter().map(|r| r.id.as_str()))?;
    ensure_unique(
        IdKind::Category,
        spec.categories.iter().map(|c| c.id.as_str()),
    )?;
    ensure_unique(
        IdKind::RuleOrCategory,
        spec.rules
            .iter()
            .map(|r| r.id.as_str())
            .chain(spec.categories.iter().map(|c| c.id.as_str())),
    )?;

    let rules: HashMap<&str, &RuleSpec> = spec.rules.iter().map(|r| (r.id.as_str(), r)).collect();
    let categories: HashMap<&str, &CategorySpec> = spec
        .categories
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    for rule in &spec.rules {
        validate_rule(rule, &rules, &categories)?;
    }
    for category in &spec.categories {
        validate_category(category, &categories)?;
    }

    let referenced: HashSet<&str> = spec
        .rules
        .iter()
        .flat_map(|r| r.category_ids.iter().map(String::as_str))
        .collect();
    if let Some(orphan) = spec
        .categories
        .iter()
        .find(|c| !referenced.contains(c.id.as_str()))
    {
        return Err(CheckError::OrphanCategory(orphan.id.clone()));
    }
    Ok(())
}

fn validate_rule(
    rule: &RuleSpec,
    rules: &HashMap<&str, &RuleSpec>,
    categories: &HashMap<&str, &CategorySpec>,
) -> Result<()> {
    if rule.purpose.is_empty() {
        return Err(CheckError::InvalidSpec(format!(
            "rule {:?} has no purpose",
            rule.id
        )));
    }
    ensure_unique(
        IdKind::Category,
        rule.category_ids.iter().map(String::as_str),
    )?;
    for category_id in &rule.category_ids {
        if !categories.contains_key(category_id.as_str()) {
            return Err(CheckError::DanglingCategoryReference {
                rule_id: rule.id.clone(),
                category_id: category_id.clone(),
            });
        }
    }
    if rule.deprecated && rule.is_default {
        return Err(CheckError::InvalidSpec(format!(
            "rule {:?} is deprecated and cannot be default",
            rule.id
        )));
    }
    validate_replacements(
        IdKind::Rule,
        &rule.id,
        rule.deprecated,
        &rule.replacement_ids,
        |id| rules.get(id).map(|r| r.deprecated),
    )
}

fn validate_category(
    category: &CategorySpec,
    categories: &HashMap<&str, &CategorySpec>,
) -> Result<()> {
    if category.purpose.is_empty() {
        return Err(CheckError::InvalidSpec(format!(
            "category {:?} has no purpose",
            category.id
        )));
    }
    validate_replacements(
        IdKind::Category,
        &category.id,
        category.deprecated,
        &category.replacement_ids,
        |id| categories.get(id).map(|c| c.deprecated),
    )
}

/// `is_deprecated` returns `None` when no spec of the same kind has that ID.
fn validate_replacements<F>(
    kind: IdKind,
    id: &str,
    deprecated: bool,
    replacement_ids: &[String],
    is_deprecated: F,
) -> Result<()>
where
    F: Fn(&str) -> Option<bool>,
{
    let invalid = |reason: String| CheckError::InvalidReplacement {
        kind,
        id: id.to_string(),
        reason,
    };
    if !deprecated {
        if replacement_ids.is_empty() {
            return Ok(());
        }
        return Err(invalid(
            "replacement IDs given but not deprecated".to_string(),
        ));
    }
    for replacement_id in replacement_ids {
        match is_deprecated(replacement_id) {
            None => {
                return Err(invalid(format!(
                    "replacement {replacement_id:?} is not a known {kind}"
                )));
            }
            Some(true) => {
                return Err(invalid(format!(
                    "replacement {replacement_id:?} is itself deprecated"
                )));
            }
            Some(false) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
