//! Handler helpers that walk the non-import files of a request.
//!
//! Each helper wraps a per-item function into a [`RuleHandler`]. Import files
//! are skipped, messages are visited parent first and then their nested
//! messages, and the first error stops the walk.

use crate::context::CallContext;
use crate::descriptor::{FieldRef, MessageRef};
use crate::error::Result;
use crate::file::File;
use crate::request::Request;
use crate::spec::RuleHandler;
use crate::writer::ResponseWriter;

pub struct FileRuleHandler<F>(F);

pub struct MessageRuleHandler<F>(F);

pub struct FieldRuleHandler<F>(F);

/// Calls `f` once per non-import file.
pub const fn for_each_file<F>(f: F) -> FileRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &File) -> Result<()> + Send + Sync,
{
    FileRuleHandler(f)
}

/// Calls `f` once per message of every non-import file, nested messages included.
pub const fn for_each_message<F>(f: F) -> MessageRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &MessageRef<'_>) -> Result<()> + Send + Sync,
{
    MessageRuleHandler(f)
}

/// Calls `f` once per field of every message visited by [`for_each_message`].
pub const fn for_each_field<F>(f: F) -> FieldRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &FieldRef<'_>) -> Result<()> + Send + Sync,
{
    FieldRuleHandler(f)
}

fn walk_files(
    ctx: &CallContext,
    request: &Request,
    mut visit: impl FnMut(&File) -> Result<()>,
) -> Result<()> {
    for file in request.files().iter().filter(|file| !file.is_import()) {
        ctx.check()?;
        visit(file)?;
    }
    Ok(())
}

fn walk_messages(
    message: &MessageRef<'_>,
    visit: &mut impl FnMut(&MessageRef<'_>) -> Result<()>,
) -> Result<()> {
    visit(message)?;
    for nested in message.nested_messages() {
        walk_messages(&nested, visit)?;
    }
    Ok(())
}

fn walk_file_messages(
    file: &File,
    visit: &mut impl FnMut(&MessageRef<'_>) -> Result<()>,
) -> Result<()> {
    for message in file.descriptor().message_refs() {
        walk_messages(&message, visit)?;
    }
    Ok(())
}

impl<F> RuleHandler for FileRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &File) -> Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()> {
        walk_files(ctx, request, |file| (self.0)(ctx, writer, request, file))
    }
}

impl<F> RuleHandler for MessageRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &MessageRef<'_>) -> Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()> {
        walk_files(ctx, request, |file| {
            walk_file_messages(file, &mut |message: &MessageRef<'_>| {
                (self.0)(ctx, writer, request, message)
            })
        })
    }
}

impl<F> RuleHandler for FieldRuleHandler<F>
where
    F: Fn(&CallContext, &ResponseWriter, &Request, &FieldRef<'_>) -> Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &CallContext, writer: &ResponseWriter, request: &Request) -> Result<()> {
        walk_files(ctx, request, |file| {
            walk_file_messages(file, &mut |message: &MessageRef<'_>| {
                message
                    .fields()
                    .try_for_each(|field| (self.0)(ctx, writer, request, &field))
            })
        })
    }
}

#[cfg(test)]
#[path = "checkutil_tests.rs"]
mod tests;
