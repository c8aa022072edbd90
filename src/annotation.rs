use std::cmp::Ordering;

use crate::error::Result;
use crate::id::{presence_cmp, validate_rule_id};
use crate::location::Location;
use crate::wire::WireAnnotation;

/// One finding reported by a rule.
///
/// Annotations are totally ordered by rule ID, then location, then against
/// location, then message. Missing locations order before present ones; two
/// present locations compare by file name, then structural path.
#[derive(Debug, Clone)]
pub struct Annotation {
    rule_id: String,
    message: String,
    location: Option<Location>,
    against_location: Option<Location>,
}

impl Annotation {
    /// # Errors
    /// Returns [`crate::CheckError::InvalidId`] if `rule_id` is not a valid rule ID.
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        location: Option<Location>,
        against_location: Option<Location>,
    ) -> Result<Self> {
        let rule_id = rule_id.into();
        validate_rule_id(&rule_id)?;
        Ok(Self {
            rule_id,
            message: message.into(),
            location,
            against_location,
        })
    }

    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    #[must_use]
    pub const fn against_location(&self) -> Option<&Location> {
        self.against_location.as_ref()
    }

    pub(crate) fn to_wire(&self) -> WireAnnotation {
        WireAnnotation {
            rule_id: self.rule_id.clone(),
            message: self.message.clone(),
            location: self.location.as_ref().map(Location::to_wire),
            against_location: self.against_location.as_ref().map(Location::to_wire),
        }
    }
}

fn compare_locations(one: Option<&Location>, two: Option<&Location>) -> Ordering {
    match (one, two) {
        (Some(one), Some(two)) => one
            .file_name()
            .cmp(two.file_name())
            .then_with(|| one.source_path().cmp(two.source_path())),
        _ => presence_cmp(one, two),
    }
}

impl Ord for Annotation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rule_id
            .cmp(&other.rule_id)
            .then_with(|| compare_locations(self.location(), other.location()))
            .then_with(|| {
                compare_locations(self.against_location(), other.against_location())
            })
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl PartialOrd for Annotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Annotation {}

#[cfg(test)]
#[path = "annotation_tests.rs"]
mod tests;
