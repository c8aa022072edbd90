//! Provider side: serves Check, ListRules and ListCategories for one [`Spec`].

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::context::CallContext;
use crate::error::{CheckError, Result};
use crate::request::Request;
use crate::spec::{BeforeHook, CategorySpec, RuleSpec, Spec};
use crate::wire::{
    self, CheckRequest, CheckResponse, ListCategoriesRequest, ListCategoriesResponse,
    ListRulesRequest, ListRulesResponse, Method, WireCategory, WireRule,
};
use crate::writer::ResponseCollector;

/// Page size used when a listing request asks for zero.
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// Implements the three operations against a validated spec.
///
/// Handlers run in declaration order. Listings are served in ID order and the
/// page token is the ID of the first entry of the requested page.
pub struct ServiceHandler {
    rules: IndexMap<String, RuleSpec>,
    rule_listing: IndexMap<String, WireRule>,
    category_listing: IndexMap<String, WireCategory>,
    before: Option<BeforeHook>,
    parallel_handlers: bool,
}

impl ServiceHandler {
    /// # Errors
    /// Returns the first spec violation found by [`crate::spec::validate_spec`].
    pub fn new(spec: Spec) -> Result<Self> {
        spec.validate()?;
        let mut rule_listing: IndexMap<String, WireRule> = spec
            .rules
            .iter()
            .map(|rule| (rule.id.clone(), rule_to_wire(rule)))
            .collect();
        rule_listing.sort_keys();
        let mut category_listing: IndexMap<String, WireCategory> = spec
            .categories
            .iter()
            .map(|category| (category.id.clone(), category_to_wire(category)))
            .collect();
        category_listing.sort_keys();
        let rules = spec
            .rules
            .into_iter()
            .map(|rule| (rule.id.clone(), rule))
            .collect();
        debug!(
            rules = rule_listing.len(),
            categories = category_listing.len(),
            "Service handler ready"
        );
        Ok(Self {
            rules,
            rule_listing,
            category_listing,
            before: spec.before,
            parallel_handlers: false,
        })
    }

    /// Run selected handlers concurrently. The first error in rule order wins.
    #[must_use]
    pub const fn with_parallel_handlers(mut self, parallel: bool) -> Self {
        self.parallel_handlers = parallel;
        self
    }

    /// # Errors
    /// Returns [`CheckError::InvalidArgument`] for unknown rule IDs, any error from
    /// the before hook or a handler, and the collector's finalize errors.
    pub fn check(&self, ctx: &CallContext, message: CheckRequest) -> Result<CheckResponse> {
        ctx.check()?;
        let mut request = Request::from_wire(message)?;
        let selected = self.select_rules(request.rule_ids())?;
        debug!(rules = selected.len(), "Selected rules for check");
        if let Some(before) = &self.before {
            request = before(ctx, request)?;
        }
        let collector = ResponseCollector::new(&request)?;
        if self.parallel_handlers {
            let results: Vec<Result<()>> = selected
                .par_iter()
                .map(|rule| run_handler(ctx, &collector, &request, rule))
                .collect();
            results.into_iter().collect::<Result<()>>()?;
        } else {
            for rule in &selected {
                run_handler(ctx, &collector, &request, rule)?;
            }
        }
        Ok(collector.to_response()?.to_wire())
    }

    /// # Errors
    /// Returns [`CheckError::InvalidArgument`] for an unknown page token.
    pub fn list_rules(
        &self,
        ctx: &CallContext,
        message: &ListRulesRequest,
    ) -> Result<ListRulesResponse> {
        ctx.check()?;
        let (rules, next_page_token) =
            page(&self.rule_listing, message.page_size, &message.page_token)?;
        Ok(ListRulesResponse {
            next_page_token,
            rules,
        })
    }

    /// # Errors
    /// Returns [`CheckError::InvalidArgument`] for an unknown page token.
    pub fn list_categories(
        &self,
        ctx: &CallContext,
        message: &ListCategoriesRequest,
    ) -> Result<ListCategoriesResponse> {
        ctx.check()?;
        let (categories, next_page_token) =
            page(&self.category_listing, message.page_size, &message.page_token)?;
        Ok(ListCategoriesResponse {
            next_page_token,
            categories,
        })
    }

    fn select_rules(&self, rule_ids: &[String]) -> Result<Vec<&RuleSpec>> {
        if rule_ids.is_empty() {
            return Ok(self.rules.values().filter(|rule| rule.is_default).collect());
        }
        let unknown: Vec<&str> = rule_ids
            .iter()
            .filter(|id| !self.rules.contains_key(id.as_str()))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(CheckError::InvalidArgument(format!(
                "unknown rule IDs: {}",
                unknown.join(", ")
            )));
        }
        let requested: BTreeSet<&str> = rule_ids.iter().map(String::as_str).collect();
        Ok(self
            .rules
            .values()
            .filter(|rule| requested.contains(rule.id.as_str()))
            .collect())
    }
}

fn run_handler(
    ctx: &CallContext,
    collector: &ResponseCollector,
    request: &Request,
    rule: &RuleSpec,
) -> Result<()> {
    ctx.check()?;
    rule.handler
        .handle(ctx, &collector.writer(rule.id.as_str()), request)
}

fn page<T: Clone>(
    listing: &IndexMap<String, T>,
    page_size: u32,
    page_token: &str,
) -> Result<(Vec<T>, String)> {
    let start = if page_token.is_empty() {
        0
    } else {
        listing.get_index_of(page_token).ok_or_else(|| {
            CheckError::InvalidArgument(format!("unknown page token: {page_token:?}"))
        })?
    };
    let page_size = match page_size {
        0 => DEFAULT_PAGE_SIZE,
        n => usize::try_from(n).unwrap_or(usize::MAX),
    };
    let end = start.saturating_add(page_size).min(listing.len());
    let items = listing
        .values()
        .skip(start)
        .take(end - start)
        .cloned()
        .collect();
    let next_page_token = listing
        .get_index(end)
        .map(|(id, _)| id.clone())
        .unwrap_or_default();
    Ok((items, next_page_token))
}

fn rule_to_wire(rule: &RuleSpec) -> WireRule {
    WireRule {
        id: rule.id.clone(),
        category_ids: rule.category_ids.clone(),
        default: rule.is_default,
        purpose: rule.purpose.clone(),
        rule_type: rule.rule_type,
        deprecated: rule.deprecated,
        replacement_ids: rule.replacement_ids.clone(),
    }
}

fn category_to_wire(category: &CategorySpec) -> WireCategory {
    WireCategory {
        id: category.id.clone(),
        purpose: category.purpose.clone(),
        deprecated: category.deprecated,
        replacement_ids: category.replacement_ids.clone(),
    }
}

/// Dispatches encoded messages to a [`ServiceHandler`].
pub struct Server {
    handler: ServiceHandler,
}

impl Server {
    #[must_use]
    pub const fn new(handler: ServiceHandler) -> Self {
        Self { handler }
    }

    /// # Errors
    /// Returns [`CheckError::Json`] for a malformed message, and any error of the
    /// called operation.
    pub fn handle(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>> {
        match method {
            Method::Check => wire::encode(&self.handler.check(ctx, wire::decode(request)?)?),
            Method::ListRules => {
                wire::encode(&self.handler.list_rules(ctx, &wire::decode(request)?)?)
            }
            Method::ListCategories => {
                wire::encode(&self.handler.list_categories(ctx, &wire::decode(request)?)?)
            }
        }
    }

    /// Like [`Self::handle`], addressing the method by procedure name.
    ///
    /// # Errors
    /// Returns [`CheckError::UnknownMethod`] for an unknown procedure.
    pub fn handle_procedure(
        &self,
        ctx: &CallContext,
        procedure: &str,
        request: &[u8],
    ) -> Result<Vec<u8>> {
        self.handle(ctx, procedure.parse()?, request)
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
