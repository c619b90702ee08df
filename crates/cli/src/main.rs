//! Plateful CLI - Cart session tools.
//!
//! # Usage
//!
//! ```bash
//! # Replay a session script and print the final cart snapshot
//! pf-cli replay crates/cli/scripts/thai_dinner.yaml
//!
//! # Emit logs as JSON
//! pf-cli --json replay crates/cli/scripts/thai_dinner.yaml
//!
//! # Check a script for dangling references without running it
//! pf-cli validate crates/cli/scripts/thai_dinner.yaml
//! ```
//!
//! # Commands
//!
//! - `replay` - Drive a cart session through a YAML script
//! - `validate` - Validate a YAML script

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod script;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "Plateful cart session tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script and print the final snapshot
    Replay {
        /// Path to the YAML script
        script: PathBuf,
    },
    /// Validate a session script without running it
    Validate {
        /// Path to the YAML script
        script: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.json);

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing on stderr so stdout stays reserved for snapshots.
/// Defaults to info level if `RUST_LOG` is not set.
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pf_cli=info,plateful_cart=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Replay { script } => commands::replay::run(&script)?,
        Commands::Validate { script } => commands::validate::run(&script)?,
    }
    Ok(())
}
