//! extdoctor CLI - extension audits for Joomla sites
//!
//! This is the main entry point for the extdoctor command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Check(args) => commands::check::run(args, &cli.site),
        Commands::List(args) => commands::list::run(args, &cli.site),
        Commands::Info(args) => commands::info::run(args, &cli.site),
        Commands::Package(args) => commands::package::run(args, &cli.site),
        Commands::Fix(args) => commands::fix::run(args, &cli.site),
        Commands::Uninstall(args) => commands::uninstall::run(args, &cli.site),
        Commands::Set(args) => commands::set::run(args, &cli.site),
        Commands::Version(args) => commands::version::run(args, &cli.site),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Reports go to stdout; logs stay quiet unless asked for
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
