//! Provider-side rule and category declarations.
//!
//! A provider describes what it can check with a [`Spec`]: one [`RuleSpec`] per
//! rule (metadata plus a [`RuleHandler`]) and one [`CategorySpec`] per category.
//! The spec is validated once, before any call is served.

mod validation;

use std::fmt;
use std::sync::Arc;

use crate::context::CallContext;
use crate::error::Result;
use crate::request::Request;
use crate::rule::RuleType;
use crate::writer::ResponseWriter;

pub use validation::validate_spec;

/// Runs one rule against a request.
pub trait RuleHandler: Send + Sync {
    /// Inspect `request` and report findings through `writer`.
    ///
    /// # Errors
    /// Any error aborts the whole Check call and is returned to the caller.
    fn handle(&self, ctx: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()>;
}

/// Adapts a function or closure into a [`RuleHandler`].
pub struct RuleHandlerFn<F>(F);

impl<F> RuleHandlerFn<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request) -> Result<()> + Send + Sync,
{
    pub const fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<F> RuleHandler for RuleHandlerFn<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request) -> Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()> {
        (self.0)(ctx, writer, request)
    }
}

/// Pre-processing hook run once per Check call before any handler.
pub type BeforeHook = Arc<dyn Fn(&CallContext, Request) -> Result<Request> + Send + Sync>;

#[derive(Clone)]
pub struct RuleSpec {
    pub id: String,
    pub category_ids: Vec<String>,
    /// Runs when a request names no rules.
    pub is_default: bool,
    pub purpose: String,
    pub rule_type: RuleType,
    pub deprecated: bool,
    /// Rules to use instead. Only allowed on deprecated rules.
    pub replacement_ids: Vec<String>,
    pub handler: Arc<dyn RuleHandler>,
}

impl RuleSpec {
    pub fn new(
        id: impl Into<String>,
        purpose: impl Into<String>,
        rule_type: RuleType,
        handler: impl RuleHandler + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            category_ids: Vec::new(),
            is_default: false,
            purpose: purpose.into(),
            rule_type,
            deprecated: false,
            replacement_ids: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn with_category_ids<I, S>(mut self, category_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_ids = category_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Mark deprecated, pointing callers at `replacement_ids`.
    #[must_use]
    pub fn deprecated_by<I, S>(mut self, replacement_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated = true;
        self.replacement_ids = replacement_ids.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSpec")
            .field("id", &self.id)
            .field("category_ids", &self.category_ids)
            .field("is_default", &self.is_default)
            .field("purpose", &self.purpose)
            .field("rule_type", &self.rule_type)
            .field("deprecated", &self.deprecated)
            .field("replacement_ids", &self.replacement_ids)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub id: String,
    pub purpose: String,
    pub deprecated: bool,
    pub replacement_ids: Vec<String>,
}

impl CategorySpec {
    pub fn new(id: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            purpose: purpose.into(),
            deprecated: false,
            replacement_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn deprecated_by<I, S>(mut self, replacement_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated = true;
        self.replacement_ids = replacement_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything a provider serves.
#[derive(Clone, Default)]
pub struct Spec {
    pub rules: Vec<RuleSpec>,
    pub categories: Vec<CategorySpec>,
    pub before: Option<BeforeHook>,
}

impl Spec {
    #[must_use]
    pub fn new(rules: Vec<RuleSpec>) -> Self {
        Self {
            rules,
            categories: Vec::new(),
            before: None,
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<CategorySpec>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_before<F>(mut self, before: F) -> Self
    where
        F: Fn(&CallContext, Request) -> Result<Request> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(before));
        self
    }

    /// # Errors
    /// See [`validate_spec`].
    pub fn validate(&self) -> Result<()> {
        validate_spec(self)
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("rules", &self.rules)
            .field("categories", &self.categories)
            .field("before", &self.before.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
