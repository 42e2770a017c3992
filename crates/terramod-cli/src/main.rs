//! Terramod CLI - Command-line utility for packaging and publishing
//! infrastructure-as-code modules.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_progress = !cli.json && !cli.quiet;

    let (operation, result) = match &cli.command {
        cli::Commands::Package(args) => (
            "package",
            commands::package::execute(args, &*formatter, show_progress),
        ),
        cli::Commands::Publish(args) => (
            "publish",
            commands::publish::execute(args, &*formatter, show_progress),
        ),
        cli::Commands::Checksum(args) => ("checksum", commands::checksum::execute(args, &*formatter)),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            ("completion", Ok(()))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(operation, error = ?err, "command failed");
            formatter.format_error(operation, &err);
            error::exit_code(&err)
        }
    }
}
