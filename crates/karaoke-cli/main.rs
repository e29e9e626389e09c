//! `karaoke` command line tool
//!
//! Thin front end over `karaoke-core`: loads the configuration, installs
//! logging and dispatches to one subcommand per pipeline step.

mod cli;
mod commands;
mod config;
mod tools;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use config::CliConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Sync(args) => commands::sync::run(args, &config),
        Command::Edit(args) => commands::edit::run(args, &config),
        Command::Export(args) => commands::export::run(args, &config),
        Command::Render(args) => commands::render::run(args, &config),
    }
}

/// Log to stderr so command output on stdout stays clean
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
