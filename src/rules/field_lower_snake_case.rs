use crate::checkutil::for_each_field;
use crate::context::CallContext;
use crate::descriptor::FieldRef;
use crate::error::Result;
use crate::request::Request;
use crate::rule::RuleType;
use crate::spec::RuleSpec;
use crate::writer::{AnnotationBuilder, ResponseWriter};

use super::STYLE_CATEGORY_ID;

pub const FIELD_LOWER_SNAKE_CASE_RULE_ID: &str = "FIELD_LOWER_SNAKE_CASE";

pub(super) fn rule_spec() -> RuleSpec {
    RuleSpec::new(
        FIELD_LOWER_SNAKE_CASE_RULE_ID,
        "Checks that all field names are lower_snake_case.",
        RuleType::Lint,
        for_each_field(check_field),
    )
    .with_category_ids([STYLE_CATEGORY_ID])
}

fn check_field(
    _: &CallContext,
    writer: &ResponseWriter,
    _: &Request,
    field: &FieldRef<'_>,
) -> Result<()> {
    let name = field.name();
    let expected = to_lower_snake_case(name);
    if name != expected {
        writer.add_annotation(
            AnnotationBuilder::new()
                .message(format!(
                    "Field name {name:?} should be lower_snake_case, such as {expected:?}."
                ))
                .descriptor(field),
        );
    }
    Ok(())
}

const fn is_delimiter(c: char) -> bool {
    matches!(c, '.' | '-' | '_' | ' ' | '\t' | '\n' | '\r')
}

fn starts_word(c: char, on_digits: bool) -> bool {
    c.is_uppercase() || (on_digits && c.is_numeric())
}

/// Convert an identifier to `lower_snake_case`.
///
/// Delimiters become single underscores and are trimmed from both ends. An
/// uppercase letter starts a new word after a lowercase letter, or before a
/// lowercase letter that ends an acronym (`HTTPServer` becomes `http_server`).
#[must_use]
pub fn to_lower_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.trim_matches(is_delimiter).chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let c = if is_delimiter(c) { '_' } else { c };
        if i == 0 {
            out.push(c);
            continue;
        }
        let after_underscore = out.ends_with('_');
        let next_continues_word = chars
            .get(i + 1)
            .is_some_and(|&next| !starts_word(next, true) && !is_delimiter(next));
        if starts_word(c, false)
            && !after_underscore
            && (next_continues_word || chars[i - 1].is_lowercase())
        {
            out.push('_');
            out.push(c);
        } else if !(c == '_' && after_underscore) {
            out.push(c);
        }
    }
    out.to_lowercase()
}
