//! The input of a Check call.

use std::collections::BTreeSet;

use tracing::trace;

use crate::error::{CheckError, Result};
use crate::file::{File, file_name_to_file};
use crate::id::validate_rule_id;
use crate::options::Options;
use crate::wire::CheckRequest;

/// Maximum number of rule IDs carried by one provider-facing Check message.
pub const CHECK_RULE_ID_PAGE_SIZE: usize = 250;

/// Files to check plus the options and rule filter for one Check call.
///
/// Immutable once built. An empty rule filter selects the provider's default rules.
#[derive(Debug, Clone)]
pub struct Request {
    files: Vec<File>,
    against_files: Vec<File>,
    options: Options,
    rule_ids: Vec<String>,
}

impl Request {
    /// Request over `files` with no against files, options, or rule filter.
    ///
    /// # Errors
    /// See [`RequestBuilder::build`].
    pub fn new(files: Vec<File>) -> Result<Self> {
        Self::builder(files).build()
    }

    #[must_use]
    pub fn builder(files: Vec<File>) -> RequestBuilder {
        RequestBuilder::new(files)
    }

    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Previous versions of the files, used by breaking-change rules.
    #[must_use]
    pub fn against_files(&self) -> &[File] {
        &self.against_files
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Sorted, deduplicated rule filter.
    #[must_use]
    pub fn rule_ids(&self) -> &[String] {
        &self.rule_ids
    }

    /// Copy of this request with a different rule filter.
    ///
    /// # Errors
    /// See [`RequestBuilder::build`].
    pub fn with_rule_ids<I, S>(&self, rule_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(self.files.clone())
            .against_files(self.against_files.clone())
            .options(self.options.clone())
            .rule_ids(rule_ids)
            .build()
    }

    /// Split into provider-facing messages of at most
    /// [`CHECK_RULE_ID_PAGE_SIZE`] rule IDs each.
    ///
    /// A request without a rule filter yields exactly one message.
    #[must_use]
    pub fn to_wire(&self) -> Vec<CheckRequest> {
        let files: Vec<_> = self.files.iter().map(File::to_wire).collect();
        let against_files: Vec<_> = self.against_files.iter().map(File::to_wire).collect();
        let options = self.options.to_wire();
        let message = |rule_ids: &[String]| CheckRequest {
            files: files.clone(),
            against_files: against_files.clone(),
            options: options.clone(),
            rule_ids: rule_ids.to_vec(),
        };
        if self.rule_ids.is_empty() {
            return vec![message(&[])];
        }
        let messages: Vec<CheckRequest> = self
            .rule_ids
            .chunks(CHECK_RULE_ID_PAGE_SIZE)
            .map(message)
            .collect();
        trace!(
            rule_ids = self.rule_ids.len(),
            chunks = messages.len(),
            "Split check request"
        );
        messages
    }

    /// Rebuild a request received from a client.
    ///
    /// # Errors
    /// Fails the same way [`RequestBuilder::build`] does.
    pub fn from_wire(message: CheckRequest) -> Result<Self> {
        Self::builder(message.files.into_iter().map(File::from_wire).collect())
            .against_files(message.against_files.into_iter().map(File::from_wire).collect())
            .options(Options::from_wire(message.options)?)
            .rule_ids(message.rule_ids)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    files: Vec<File>,
    against_files: Vec<File>,
    options: Options,
    option_pairs: Vec<(String, Vec<u8>)>,
    rule_ids: BTreeSet<String>,
}

impl RequestBuilder {
    fn new(files: Vec<File>) -> Self {
        Self {
            files,
            against_files: Vec::new(),
            options: Options::new(),
            option_pairs: Vec::new(),
            rule_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn against_files(mut self, against_files: Vec<File>) -> Self {
        self.against_files = against_files;
        self
    }

    /// Replace the base options. Pairs added with [`Self::option`] are merged on top.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.option_pairs.push((key.into(), value.into()));
        self
    }

    /// Add rule IDs to the filter. Repeats are dropped.
    #[must_use]
    pub fn rule_ids<I, S>(mut self, rule_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_ids.extend(rule_ids.into_iter().map(Into::into));
        self
    }

    /// # Errors
    /// Returns [`CheckError::InvalidRequest`] if there are no files or a file path
    /// repeats within the files or within the against files, the option errors of
    /// [`Options::from_pairs`], and [`CheckError::InvalidId`] for a malformed rule ID.
    pub fn build(self) -> Result<Request> {
        if self.files.is_empty() {
            return Err(CheckError::InvalidRequest(
                "request must contain at least one file".to_string(),
            ));
        }
        file_name_to_file(&self.files)?;
        file_name_to_file(&self.against_files)?;
        for rule_id in &self.rule_ids {
            validate_rule_id(rule_id)?;
        }
        let options = if self.option_pairs.is_empty() {
            self.options
        } else {
            let base = self
                .options
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_vec()));
            Options::from_pairs(base.chain(self.option_pairs))?
        };
        Ok(Request {
            files: self.files,
            against_files: self.against_files,
            options,
            rule_ids: self.rule_ids.into_iter().collect(),
        })
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
