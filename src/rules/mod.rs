//! Demonstration rules served by the `rulecheck-plugin` binary.

mod field_lower_snake_case;
mod syntax_unspecified;
mod timestamp_suffix;

use crate::spec::{CategorySpec, Spec};

pub use field_lower_snake_case::{FIELD_LOWER_SNAKE_CASE_RULE_ID, to_lower_snake_case};
pub use syntax_unspecified::SYNTAX_UNSPECIFIED_RULE_ID;
pub use timestamp_suffix::{
    DEFAULT_TIMESTAMP_SUFFIX, TIMESTAMP_SUFFIX_OPTION_KEY, TIMESTAMP_SUFFIX_RULE_ID,
};

pub const STYLE_CATEGORY_ID: &str = "STYLE";
pub const FILE_CATEGORY_ID: &str = "FILE";

/// Every demonstration rule with its categories.
#[must_use]
pub fn spec() -> Spec {
    Spec::new(vec![
        field_lower_snake_case::rule_spec(),
        timestamp_suffix::rule_spec(),
        syntax_unspecified::rule_spec(),
    ])
    .with_categories(vec![
        CategorySpec::new(STYLE_CATEGORY_ID, "Checks naming style."),
        CategorySpec::new(FILE_CATEGORY_ID, "Checks file-level declarations."),
    ])
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
