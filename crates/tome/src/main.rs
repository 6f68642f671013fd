//! tome CLI - versioned documentation site generator.
//!
//! Provides commands for:
//! - `build`: aggregate content sources, classify them into a catalog,
//!   build navigation, and compose the site

mod commands;
mod error;
mod output;
mod template;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::BuildArgs;
use output::Output;

/// tome - versioned documentation site generator.
#[derive(Parser)]
#[command(name = "tome", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the site from a playbook.
    Build(BuildArgs),
}

fn main() {
    let cli = Cli::parse();

    let (verbose, silent) = match &cli.command {
        Commands::Build(args) => (args.verbose, args.silent),
    };
    let output = Output::new(silent);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
