use clap::{Parser, Subcommand};

use crate::wire::Method;

#[derive(Parser, Debug)]
#[command(name = "rulecheck-plugin")]
#[command(author, version, about = "Rule provider speaking the check protocol over stdio")]
#[command(long_about = "Serves one check-protocol call per invocation: reads a JSON request \
    from stdin and writes the JSON response to stdout.\n\n\
    Exit codes:\n  \
    0 - Call succeeded\n  \
    1 - Call failed (error written to stdout)\n  \
    2 - Invalid arguments or rule set")]
pub struct Cli {
    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Run rule handlers concurrently
    #[arg(long, global = true)]
    pub parallel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run rules against the files in a CheckRequest
    Check,

    /// List one page of rules
    ListRules,

    /// List one page of categories
    ListCategories,
}

impl Commands {
    /// The protocol method served by this subcommand.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::Check => Method::Check,
            Self::ListRules => Method::ListRules,
            Self::ListCategories => Method::ListCategories,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
