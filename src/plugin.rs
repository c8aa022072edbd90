//! Stdio entry point for rule providers.
//!
//! One invocation serves one call: the subcommand names the method, stdin
//! carries the encoded request and stdout receives the encoded response, or a
//! [`WireError`] when the call fails.

use std::io::{Read, Write};

use clap::Parser;
use tracing::{debug, error};

use crate::cli::Cli;
use crate::context::CallContext;
use crate::error::Result;
use crate::server::{Server, ServiceHandler};
use crate::spec::Spec;
use crate::wire::{self, WireError};
use crate::{EXIT_CALL_ERROR, EXIT_SPEC_ERROR, EXIT_SUCCESS};

/// Serve the call named by `cli`.
///
/// Blank input is read as an empty request. Returns [`EXIT_SUCCESS`] after
/// writing the response, or [`EXIT_CALL_ERROR`] after writing the call error.
///
/// # Errors
/// Returns spec validation errors and I/O errors on `input` or `output`.
pub fn run(spec: Spec, cli: &Cli, mut input: impl Read, mut output: impl Write) -> Result<i32> {
    let server = Server::new(ServiceHandler::new(spec)?.with_parallel_handlers(cli.parallel));
    let method = cli.command.method();

    let mut request = Vec::new();
    input.read_to_end(&mut request)?;
    if request.iter().all(u8::is_ascii_whitespace) {
        request = b"{}".to_vec();
    }
    debug!(%method, bytes = request.len(), "Serving call");

    let (bytes, exit_code) = match server.handle(&CallContext::new(), method, &request) {
        Ok(bytes) => (bytes, EXIT_SUCCESS),
        Err(err) => {
            debug!(%method, error = %err, "Call failed");
            (wire::encode(&WireError::from(&err))?, EXIT_CALL_ERROR)
        }
    };
    output.write_all(&bytes)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(exit_code)
}

/// Like [`run`], reporting setup failures on stderr as [`EXIT_SPEC_ERROR`].
pub fn run_to_exit_code(spec: Spec, cli: &Cli, input: impl Read, output: impl Write) -> i32 {
    match run(spec, cli, input, output) {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!(error = %err, "Plugin setup failed");
            eprintln!("Error: {err}");
            EXIT_SPEC_ERROR
        }
    }
}

/// Parse `args` and serve one call.
///
/// Help and version requests exit with clap's own code.
pub fn serve<I, T>(spec: Spec, args: I, input: impl Read, output: impl Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => run_to_exit_code(spec, &cli, input, output),
        Err(err) => {
            let _ = err.print();
            err.exit_code()
        }
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
