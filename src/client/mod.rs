//! Caller side: talk to one provider, or to many presented as one.

mod multi;
mod single;

use crate::context::CallContext;
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;
use crate::rule::{Category, Rule};

pub use multi::MultiClient;
pub use single::{Client, ClientOptions, LIST_CATEGORIES_PAGE_SIZE, LIST_RULES_PAGE_SIZE};

/// The caller-facing operations shared by [`Client`] and [`MultiClient`].
pub trait CheckClient: Send + Sync {
    /// Run a check. All-or-nothing: any failure returns no annotations.
    ///
    /// # Errors
    /// Returns the first provider, transport, or cancellation error.
    fn check(&self, ctx: &CallContext, request: &Request) -> Result<Response>;

    /// Every rule, sorted by ID.
    ///
    /// # Errors
    /// Returns provider errors and [`crate::CheckError::DuplicateId`] for repeated IDs.
    fn list_rules(&self, ctx: &CallContext) -> Result<Vec<Rule>>;

    /// Every category, sorted by ID.
    ///
    /// # Errors
    /// Returns provider errors and [`crate::CheckError::DuplicateId`] for repeated IDs.
    fn list_categories(&self, ctx: &CallContext) -> Result<Vec<Category>>;
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
