//! Harness for testing rule handlers against in-memory files.
//!
//! A [`TestCase`] serves a [`Spec`] through an in-process [`Client`], runs one
//! Check call and compares the annotations, by rule ID and resolved location,
//! against the expected ones. Expected annotations are listed in response
//! order: rule ID, then file name and structural path.

use crate::annotation::Annotation;
use crate::client::{CheckClient, Client, ClientOptions};
use crate::context::CallContext;
use crate::error::Result;
use crate::file::File;
use crate::location::Location;
use crate::request::Request;
use crate::response::Response;
use crate::spec::Spec;

/// Where an annotation is expected to point. Lines and columns are zero-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedLocation {
    pub file_name: String,
    pub start_line: i32,
    pub start_column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

impl ExpectedLocation {
    /// A location in `file_name` with no recorded span.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn span(
        mut self,
        start_line: i32,
        start_column: i32,
        end_line: i32,
        end_column: i32,
    ) -> Self {
        self.start_line = start_line;
        self.start_column = start_column;
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }
}

impl From<&Location> for ExpectedLocation {
    fn from(location: &Location) -> Self {
        Self::new(location.file_name()).span(
            location.start_line(),
            location.start_column(),
            location.end_line(),
            location.end_column(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedAnnotation {
    pub rule_id: String,
    pub location: Option<ExpectedLocation>,
    pub against_location: Option<ExpectedLocation>,
}

impl ExpectedAnnotation {
    /// An annotation for `rule_id` with no location.
    #[must_use]
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            location: None,
            against_location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: ExpectedLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn against(mut self, location: ExpectedLocation) -> Self {
        self.against_location = Some(location);
        self
    }
}

impl From<&Annotation> for ExpectedAnnotation {
    fn from(annotation: &Annotation) -> Self {
        Self {
            rule_id: annotation.rule_id().to_string(),
            location: annotation.location().map(ExpectedLocation::from),
            against_location: annotation.against_location().map(ExpectedLocation::from),
        }
    }
}

/// The comparable form of `annotations`, in the same order.
#[must_use]
pub fn expected_annotations_for(annotations: &[Annotation]) -> Vec<ExpectedAnnotation> {
    annotations.iter().map(ExpectedAnnotation::from).collect()
}

/// # Panics
/// Panics if `actual` differs from `expected` in rule ID, location or order.
pub fn assert_annotations_eq(expected: &[ExpectedAnnotation], actual: &[Annotation]) {
    assert_eq!(
        expected,
        expected_annotations_for(actual).as_slice(),
        "annotations differ"
    );
}

/// # Panics
/// Panics with the validation error if `spec` is inconsistent.
pub fn assert_spec_valid(spec: &Spec) {
    if let Err(err) = spec.validate() {
        panic!("invalid spec: {err}");
    }
}

/// One Check call against a spec and its expected annotations.
#[derive(Debug, Clone)]
pub struct TestCase {
    spec: Spec,
    files: Vec<File>,
    against_files: Vec<File>,
    options: Vec<(String, Vec<u8>)>,
    rule_ids: Vec<String>,
    expected: Vec<ExpectedAnnotation>,
}

impl TestCase {
    #[must_use]
    pub fn new(spec: Spec, files: Vec<File>) -> Self {
        Self {
            spec,
            files,
            against_files: Vec::new(),
            options: Vec::new(),
            rule_ids: Vec::new(),
            expected: Vec::new(),
        }
    }

    #[must_use]
    pub fn against_files(mut self, against_files: Vec<File>) -> Self {
        self.against_files = against_files;
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Restrict the call to these rules. Without any, the default rules run.
    #[must_use]
    pub fn rule_ids<I, S>(mut self, rule_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_ids.extend(rule_ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn expect(mut self, annotation: ExpectedAnnotation) -> Self {
        self.expected.push(annotation);
        self
    }

    /// Run the Check call without comparing.
    ///
    /// # Errors
    /// Returns spec validation, request and call errors.
    pub fn response(&self) -> Result<Response> {
        let client = Client::for_spec(self.spec.clone(), ClientOptions::new())?;
        let mut builder = Request::builder(self.files.clone())
            .against_files(self.against_files.clone())
            .rule_ids(self.rule_ids.iter().cloned());
        for (key, value) in &self.options {
            builder = builder.option(key.clone(), value.clone());
        }
        client.check(&CallContext::new(), &builder.build()?)
    }

    /// Run the Check call and compare against the expected annotations.
    /// Returns the response for further inspection.
    ///
    /// # Panics
    /// Panics if the call fails or the annotations differ.
    pub fn run(&self) -> Response {
        let response = match self.response() {
            Ok(response) => response,
            Err(err) => panic!("check failed: {err}"),
        };
        assert_annotations_eq(&self.expected, response.annotations());
        response
    }
}

#[cfg(test)]
#[path = "checktest_tests.rs"]
mod tests;
