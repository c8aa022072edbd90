use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::context::CallContext;
use crate::error::{CheckError, Result};
use crate::request::Request;
use crate::response::Response;
use crate::rule::{Category, Rule, sorted_unique_categories, sorted_unique_rules};

use super::CheckClient;

/// Presents several providers as one.
///
/// Providers must have disjoint rule and category IDs. A Check call is only
/// sent to the delegates that own at least one selected rule.
pub struct MultiClient {
    delegates: Vec<Arc<dyn CheckClient>>,
}

impl MultiClient {
    #[must_use]
    pub fn new(delegates: Vec<Arc<dyn CheckClient>>) -> Self {
        Self { delegates }
    }

    #[must_use]
    pub fn delegates(&self) -> &[Arc<dyn CheckClient>] {
        &self.delegates
    }

    /// Each delegate's rules, after checking IDs are unique across all of them.
    fn rules_by_delegate(&self, ctx: &CallContext) -> Result<(Vec<Rule>, Vec<Vec<Rule>>)> {
        let mut per_delegate = Vec::with_capacity(self.delegates.len());
        for delegate in &self.delegates {
            ctx.check()?;
            per_delegate.push(delegate.list_rules(ctx)?);
        }
        let all = sorted_unique_rules(per_delegate.iter().flatten().cloned().collect())?;
        Ok((all, per_delegate))
    }
}

impl CheckClient for MultiClient {
    fn check(&self, ctx: &CallContext, request: &Request) -> Result<Response> {
        match self.delegates.as_slice() {
            [] => return Ok(Response::default()),
            [delegate] => return delegate.check(ctx, request),
            _ => {}
        }
        let (all_rules, per_delegate) = self.rules_by_delegate(ctx)?;
        let requested: BTreeSet<&str> = request.rule_ids().iter().map(String::as_str).collect();
        let unknown: Vec<&str> = requested
            .iter()
            .copied()
            .filter(|id| all_rules.binary_search_by(|rule| rule.id().cmp(id)).is_err())
            .collect();
        if !unknown.is_empty() {
            return Err(CheckError::InvalidArgument(format!(
                "unknown rule IDs: {}",
                unknown.join(", ")
            )));
        }

        let mut annotations = Vec::new();
        for (index, (delegate, rules)) in self.delegates.iter().zip(&per_delegate).enumerate() {
            let subset: Vec<&str> = rules
                .iter()
                .filter(|rule| {
                    if requested.is_empty() {
                        rule.is_default()
                    } else {
                        requested.contains(rule.id())
                    }
                })
                .map(Rule::id)
                .collect();
            if subset.is_empty() {
                debug!(delegate = index, "Skipping delegate with no selected rules");
                continue;
            }
            ctx.check()?;
            let delegate_request = request.with_rule_ids(subset)?;
            annotations.extend(delegate.check(ctx, &delegate_request)?.into_annotations());
        }
        Ok(Response::new(annotations))
    }

    fn list_rules(&self, ctx: &CallContext) -> Result<Vec<Rule>> {
        match self.delegates.as_slice() {
            [] => Ok(Vec::new()),
            [delegate] => delegate.list_rules(ctx),
            _ => Ok(self.rules_by_delegate(ctx)?.0),
        }
    }

    fn list_categories(&self, ctx: &CallContext) -> Result<Vec<Category>> {
        if let [delegate] = self.delegates.as_slice() {
            return delegate.list_categories(ctx);
        }
        let mut categories = Vec::new();
        for delegate in &self.delegates {
            ctx.check()?;
            categories.extend(delegate.list_categories(ctx)?);
        }
        sorted_unique_categories(categories)
    }
}
