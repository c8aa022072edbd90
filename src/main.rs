use std::io;

use clap::Parser;
use tracing::Level;

use rulecheck::cli::Cli;
use rulecheck::{plugin, rules};

const fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() {
    let cli = Cli::parse();

    // stdout carries protocol messages
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(cli.verbose))
        .with_target(false)
        .init();

    let exit_code = plugin::run_to_exit_code(
        rules::spec(),
        &cli,
        io::stdin().lock(),
        io::stdout().lock(),
    );
    std::process::exit(exit_code);
}
