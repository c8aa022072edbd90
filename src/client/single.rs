use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::context::CallContext;
use crate::error::{CheckError, Result};
use crate::request::Request;
use crate::response::Response;
use crate::rule::{Category, Rule, sorted_unique_categories, sorted_unique_rules};
use crate::spec::Spec;
use crate::transport::{LocalTransport, Transport};
use crate::wire::{
    self, CheckResponse, ListCategoriesRequest, ListCategoriesResponse, ListRulesRequest,
    ListRulesResponse, Method,
};
use crate::writer::{AnnotationBuilder, ResponseCollector};

use super::CheckClient;

/// Page size requested while draining the rule listing.
pub const LIST_RULES_PAGE_SIZE: u32 = 250;
/// Page size requested while draining the category listing.
pub const LIST_CATEGORIES_PAGE_SIZE: u32 = 250;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Memoize the first listing result for the life of the client.
    pub cache_rules_and_categories: bool,
    /// With caching on, do not remember failed listings.
    pub retry_failed_listing: bool,
}

impl ClientOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache_rules_and_categories: false,
            retry_failed_listing: false,
        }
    }

    #[must_use]
    pub const fn with_cache(mut self) -> Self {
        self.cache_rules_and_categories = true;
        self
    }

    #[must_use]
    pub const fn with_retry_failed_listing(mut self) -> Self {
        self.retry_failed_listing = true;
        self
    }
}

type Listing<T> = Option<std::result::Result<Vec<T>, Arc<CheckError>>>;

/// Client for a single provider.
pub struct Client {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
    // Lock order: cached_rules before cached_categories.
    cached_rules: RwLock<Listing<Rule>>,
    cached_categories: RwLock<Listing<Category>>,
}

impl Client {
    pub fn new(transport: impl Transport + 'static, options: ClientOptions) -> Self {
        Self::from_shared(Arc::new(transport), options)
    }

    #[must_use]
    pub fn from_shared(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
        Self {
            transport,
            options,
            cached_rules: RwLock::new(None),
            cached_categories: RwLock::new(None),
        }
    }

    /// Client for an in-process provider serving `spec`.
    ///
    /// # Errors
    /// Returns the spec validation error if `spec` is inconsistent.
    pub fn for_spec(spec: Spec, options: ClientOptions) -> Result<Self> {
        Ok(Self::new(LocalTransport::for_spec(spec)?, options))
    }

    #[must_use]
    pub const fn options(&self) -> ClientOptions {
        self.options
    }

    fn call<Req, Resp>(&self, ctx: &CallContext, method: Method, request: &Req) -> Result<Resp>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        ctx.check()?;
        let bytes = self.transport.call(ctx, method, &wire::encode(request)?)?;
        wire::decode(&bytes)
    }

    fn cached<T, F>(&self, cache: &RwLock<Listing<T>>, fetch: F) -> Result<Vec<T>>
    where
        T: Clone,
        F: FnOnce() -> Result<Vec<T>>,
    {
        if !self.options.cache_rules_and_categories {
            return fetch();
        }
        if let Some(entry) = cache.read().as_ref() {
            trace!("Listing cache hit");
            return unpack(entry);
        }
        let mut cache = cache.write();
        if let Some(entry) = cache.as_ref() {
            return unpack(entry);
        }
        debug!("Listing cache miss");
        match fetch() {
            Ok(values) => {
                *cache = Some(Ok(values.clone()));
                Ok(values)
            }
            Err(err) if self.options.retry_failed_listing => Err(err),
            Err(err) => {
                let err = Arc::new(err);
                *cache = Some(Err(Arc::clone(&err)));
                Err(CheckError::Shared(err))
            }
        }
    }

    fn list_rules_uncached(&self, ctx: &CallContext) -> Result<Vec<Rule>> {
        let mut wire_rules = Vec::new();
        let mut page_token = String::new();
        loop {
            let response: ListRulesResponse = self.call(
                ctx,
                Method::ListRules,
                &ListRulesRequest {
                    page_size: LIST_RULES_PAGE_SIZE,
                    page_token,
                },
            )?;
            wire_rules.extend(response.rules);
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        // Takes the category lock while the rule lock is held.
        let categories: HashMap<String, Category> = self
            .list_categories(ctx)?
            .into_iter()
            .map(|category| (category.id().to_string(), category))
            .collect();
        let rules = wire_rules
            .into_iter()
            .map(|rule| Rule::from_wire(rule, &categories))
            .collect::<Result<Vec<_>>>()?;
        sorted_unique_rules(rules)
    }

    fn list_categories_uncached(&self, ctx: &CallContext) -> Result<Vec<Category>> {
        let mut categories = Vec::new();
        let mut page_token = String::new();
        loop {
            let response: ListCategoriesResponse = self.call(
                ctx,
                Method::ListCategories,
                &ListCategoriesRequest {
                    page_size: LIST_CATEGORIES_PAGE_SIZE,
                    page_token,
                },
            )?;
            categories.extend(response.categories.into_iter().map(Category::from_wire));
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        sorted_unique_categories(categories)
    }
}

fn unpack<T: Clone>(entry: &std::result::Result<Vec<T>, Arc<CheckError>>) -> Result<Vec<T>> {
    match entry {
        Ok(values) => Ok(values.clone()),
        Err(err) => Err(CheckError::Shared(Arc::clone(err))),
    }
}

impl CheckClient for Client {
    fn check(&self, ctx: &CallContext, request: &Request) -> Result<Response> {
        let collector = ResponseCollector::new(request)?;
        let messages = request.to_wire();
        debug!(calls = messages.len(), "Sending check");
        for message in &messages {
            let response: CheckResponse = self.call(ctx, Method::Check, message)?;
            for annotation in response.annotations {
                let (rule_id, builder) = AnnotationBuilder::from_wire(annotation);
                collector.writer(rule_id).add_annotation(builder);
            }
        }
        collector.to_response()
    }

    fn list_rules(&self, ctx: &CallContext) -> Result<Vec<Rule>> {
        self.cached(&self.cached_rules, || self.list_rules_uncached(ctx))
    }

    fn list_categories(&self, ctx: &CallContext) -> Result<Vec<Category>> {
        self.cached(&self.cached_categories, || {
            self.list_categories_uncached(ctx)
        })
    }
}
