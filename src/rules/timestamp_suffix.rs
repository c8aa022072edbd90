use crate::checkutil::for_each_field;
use crate::context::CallContext;
use crate::descriptor::FieldRef;
use crate::error::Result;
use crate::request::Request;
use crate::rule::RuleType;
use crate::spec::RuleSpec;
use crate::writer::{AnnotationBuilder, ResponseWriter};

use super::STYLE_CATEGORY_ID;

pub const TIMESTAMP_SUFFIX_RULE_ID: &str = "TIMESTAMP_SUFFIX";
/// Option overriding [`DEFAULT_TIMESTAMP_SUFFIX`].
pub const TIMESTAMP_SUFFIX_OPTION_KEY: &str = "timestamp_suffix";
pub const DEFAULT_TIMESTAMP_SUFFIX: &str = "_time";

const TIMESTAMP_TYPE: &str = "google.protobuf.Timestamp";

pub(super) fn rule_spec() -> RuleSpec {
    RuleSpec::new(
        TIMESTAMP_SUFFIX_RULE_ID,
        "Checks that all google.protobuf.Timestamps end in a specific suffix \
         (default is \"_time\").",
        RuleType::Lint,
        for_each_field(check_field),
    )
    .with_category_ids([STYLE_CATEGORY_ID])
    .with_default(true)
}

fn check_field(
    _: &CallContext,
    writer: &ResponseWriter,
    request: &Request,
    field: &FieldRef<'_>,
) -> Result<()> {
    let suffix = match request.options().get_str(TIMESTAMP_SUFFIX_OPTION_KEY)? {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_TIMESTAMP_SUFFIX,
    };
    if field.message_type() != Some(TIMESTAMP_TYPE) {
        return Ok(());
    }
    let name = field.name();
    if !name.ends_with(suffix) {
        writer.add_annotation(
            AnnotationBuilder::new()
                .message(format!(
                    "Fields of type {TIMESTAMP_TYPE} must end in {suffix:?} \
                     but field name was {name:?}."
                ))
                .descriptor(field),
        );
    }
    Ok(())
}
