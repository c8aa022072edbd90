use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::CallContext;
use crate::error::{CheckError, ErrorCode, Result};
use crate::server::{Server, ServiceHandler};
use crate::spec::Spec;
use crate::wire::{self, Method, WireError};
use crate::{EXIT_CALL_ERROR, EXIT_SUCCESS};

/// Moves one encoded request to a provider and returns its encoded response.
pub trait Transport: Send + Sync {
    /// # Errors
    /// Returns any error raised by the provider or while moving the bytes.
    fn call(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>> {
        (**self).call(ctx, method, request)
    }
}

/// Runs a [`Server`] in the calling process.
pub struct LocalTransport {
    server: Server,
}

impl LocalTransport {
    #[must_use]
    pub const fn new(server: Server) -> Self {
        Self { server }
    }

    /// # Errors
    /// Returns the spec validation error if `spec` is inconsistent.
    pub fn for_spec(spec: Spec) -> Result<Self> {
        Ok(Self::new(Server::new(ServiceHandler::new(spec)?)))
    }
}

impl Transport for LocalTransport {
    fn call(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>> {
        ctx.check()?;
        trace!(%method, bytes = request.len(), "Local call");
        self.server.handle(ctx, method, request)
    }
}

/// Runs a plugin binary once per call.
///
/// The method's procedure name is passed as the subcommand after any extra
/// arguments. The request goes to stdin and the response is read from stdout.
/// On a call-error exit, the [`WireError`] on stdout becomes
/// [`CheckError::Remote`].
#[derive(Debug, Clone)]
pub struct CommandTransport {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandTransport {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Argument passed before the procedure name, such as `--parallel`.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Transport for CommandTransport {
    fn call(&self, ctx: &CallContext, method: Method, request: &[u8]) -> Result<Vec<u8>> {
        ctx.check()?;
        trace!(
            program = %self.program.display(),
            %method,
            bytes = request.len(),
            "Plugin call"
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(method.procedure())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        // Dropping stdin closes it so the plugin sees end of input.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request)?;
        }
        let output = child.wait_with_output()?;
        ctx.check()?;

        match output.status.code() {
            Some(EXIT_SUCCESS) => Ok(output.stdout),
            Some(EXIT_CALL_ERROR) => {
                let error: WireError = wire::decode(&output.stdout)?;
                debug!(%method, code = %error.code, "Plugin reported call error");
                Err(error.into_error())
            }
            _ => Err(CheckError::Remote {
                code: ErrorCode::Internal,
                message: format!(
                    "plugin {} failed ({}): {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
