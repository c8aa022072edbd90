//! Turning a [`CheckConfig`] into a concrete rule filter and request.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{CheckError, Result};
use crate::file::File;
use crate::options::Options;
use crate::request::Request;
use crate::rule::{Category, Rule};

use super::model::CheckConfig;

/// Rules and categories of a provider, indexed by ID.
struct Catalog<'a> {
    rules: HashMap<&'a str, &'a Rule>,
    categories: HashMap<&'a str, &'a Category>,
    members: HashMap<&'a str, Vec<&'a Rule>>,
}

impl<'a> Catalog<'a> {
    fn new(rules: &'a [Rule], categories: &'a [Category]) -> Self {
        let mut members: HashMap<&str, Vec<&Rule>> = HashMap::new();
        for rule in rules {
            for category_id in rule.category_ids() {
                members.entry(category_id).or_default().push(rule);
            }
        }
        Self {
            rules: rules.iter().map(|rule| (rule.id(), rule)).collect(),
            categories: categories
                .iter()
                .map(|category| (category.id(), category))
                .collect(),
            members,
        }
    }

    /// Rule IDs in a category. Deprecated rules only join when `include_deprecated`.
    fn members_of(&self, category_id: &str, include_deprecated: bool) -> Vec<String> {
        self.members
            .get(category_id)
            .into_iter()
            .flatten()
            .filter(|rule| include_deprecated || !rule.is_deprecated())
            .map(|rule| rule.id().to_string())
            .collect()
    }

    /// Rule IDs selected by a `use` entry; deprecated IDs give way to their replacements.
    fn expand_use(&self, id: &str) -> Result<Vec<String>> {
        if let Some(rule) = self.rules.get(id) {
            if rule.is_deprecated() && !rule.replacement_ids().is_empty() {
                warn!(
                    rule = id,
                    replacements = ?rule.replacement_ids(),
                    "Rule is deprecated, using its replacements"
                );
                return Ok(rule.replacement_ids().to_vec());
            }
            return Ok(vec![id.to_string()]);
        }
        if let Some(category) = self.categories.get(id) {
            if category.is_deprecated() && !category.replacement_ids().is_empty() {
                warn!(
                    category = id,
                    replacements = ?category.replacement_ids(),
                    "Category is deprecated, using its replacements"
                );
                return Ok(category
                    .replacement_ids()
                    .iter()
                    .flat_map(|replacement| self.members_of(replacement, false))
                    .collect());
            }
            return Ok(self.members_of(id, false));
        }
        Err(unknown_id(id))
    }

    /// Rule IDs removed by an `except` entry.
    fn expand_except(&self, id: &str) -> Result<Vec<String>> {
        if self.rules.contains_key(id) {
            Ok(vec![id.to_string()])
        } else if self.categories.contains_key(id) {
            Ok(self.members_of(id, true))
        } else {
            Err(unknown_id(id))
        }
    }
}

fn unknown_id(id: &str) -> CheckError {
    CheckError::Config(format!("Unknown rule or category ID '{id}'"))
}

impl CheckConfig {
    /// Options from the `[options]` table.
    ///
    /// # Errors
    /// Returns the validation errors of [`Options::from_pairs`].
    pub fn to_options(&self) -> Result<Options> {
        Options::from_pairs(
            self.options
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_bytes().to_vec())),
        )
    }

    /// Sorted rule IDs selected by `use` and `except`.
    ///
    /// An empty `use` starts from every default rule. Category IDs expand to
    /// their rules, and `except` always wins over `use`.
    ///
    /// # Errors
    /// Returns [`CheckError::Config`] for an ID that is neither a known rule nor a
    /// known category.
    pub fn resolve_rule_ids(&self, rules: &[Rule], categories: &[Category]) -> Result<Vec<String>> {
        let catalog = Catalog::new(rules, categories);
        let mut selected: BTreeSet<String> = BTreeSet::new();
        if self.use_ids.is_empty() {
            selected.extend(
                rules
                    .iter()
                    .filter(|rule| rule.is_default())
                    .map(|rule| rule.id().to_string()),
            );
        } else {
            for id in &self.use_ids {
                selected.extend(catalog.expand_use(id)?);
            }
        }
        for id in &self.except {
            for removed in catalog.expand_except(id)? {
                selected.remove(&removed);
            }
        }
        debug!(rules = selected.len(), "Resolved rule selection");
        Ok(selected.into_iter().collect())
    }

    /// Build the Check request described by this config.
    ///
    /// # Errors
    /// Returns the errors of [`Self::resolve_rule_ids`] and [`Self::to_options`],
    /// [`CheckError::Config`] when no rule remains selected, and request validation errors.
    pub fn build_request(
        &self,
        files: Vec<File>,
        against_files: Vec<File>,
        rules: &[Rule],
        categories: &[Category],
    ) -> Result<Request> {
        let rule_ids = self.resolve_rule_ids(rules, categories)?;
        if rule_ids.is_empty() {
            return Err(CheckError::Config(
                "Configuration selects no rules".to_string(),
            ));
        }
        Request::builder(files)
            .against_files(against_files)
            .options(self.to_options()?)
            .rule_ids(rule_ids)
            .build()
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
