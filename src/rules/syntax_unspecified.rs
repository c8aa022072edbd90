use crate::checkutil::for_each_file;
use crate::context::CallContext;
use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::file::File;
use crate::request::Request;
use crate::rule::RuleType;
use crate::spec::RuleSpec;
use crate::writer::{AnnotationBuilder, ResponseWriter};

use super::FILE_CATEGORY_ID;

pub const SYNTAX_UNSPECIFIED_RULE_ID: &str = "SYNTAX_UNSPECIFIED";

pub(super) fn rule_spec() -> RuleSpec {
    RuleSpec::new(
        SYNTAX_UNSPECIFIED_RULE_ID,
        "Checks that syntax is never specified.",
        RuleType::Lint,
        for_each_file(check_file),
    )
    .with_category_ids([FILE_CATEGORY_ID])
    .with_default(true)
}

fn check_file(_: &CallContext, writer: &ResponseWriter, _: &Request, file: &File) -> Result<()> {
    if file.is_syntax_unspecified() {
        return Ok(());
    }
    let syntax = file.descriptor().syntax.as_deref().unwrap_or_default();
    writer.add_annotation(
        AnnotationBuilder::new()
            .message(format!("Syntax should not be specified but was {syntax:?}."))
            .file_name(file.name())
            .source_path(FileDescriptor::syntax_path()),
    );
    Ok(())
}
