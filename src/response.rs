use crate::annotation::Annotation;
use crate::wire::CheckResponse;

/// The result of a Check call: annotations in their total order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    annotations: Vec<Annotation>,
}

impl Response {
    pub(crate) fn new(mut annotations: Vec<Annotation>) -> Self {
        annotations.sort();
        Self { annotations }
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub fn into_annotations(self) -> Vec<Annotation> {
        self.annotations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub(crate) fn to_wire(&self) -> CheckResponse {
        CheckResponse {
            annotations: self.annotations.iter().map(Annotation::to_wire).collect(),
        }
    }
}
