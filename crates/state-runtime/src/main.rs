//! # stated
//!
//! Command-line front end of the tiered state persistence subsystem.
//!
//! ## Usage
//!
//! ```text
//! SP_ENCRYPTION_KEY=$(stated keygen) SP_SIGNING_KEY=$(stated keygen) \
//!     stated save state.json
//! stated load
//! stated health
//! ```
//!
//! Configuration is read from the environment (see `RuntimeConfig`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use persistence_telemetry::{init_logging, TelemetryConfig};
use shared_crypto::SecretKey;
use state_runtime::{build_service, execute, parse_state, Command, RuntimeConfig};
use std::path::{Path, PathBuf};

/// stated: tiered state persistence control tool
#[derive(Parser, Debug)]
#[command(name = "stated")]
#[command(about = "Save, load and inspect application state across storage tiers")]
struct Args {
    /// Compact single-line JSON output
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save a state document (JSON file, or `-` for stdin)
    Save { file: PathBuf },
    /// Load the state from the highest-priority tier that answers
    Load,
    /// Delete the state from every tier
    Clear,
    /// Probe every tier
    Health,
    /// Process metrics
    Metrics {
        /// Prometheus text format
        #[arg(long)]
        prometheus: bool,
    },
    /// Dump the diagnostic audit ring
    Audit,
    /// Print a fresh 32-byte key as hex
    Keygen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&TelemetryConfig::from_env())?;

    let command = match args.command {
        Commands::Keygen => {
            println!("{}", hex::encode(SecretKey::generate().as_bytes()));
            return Ok(());
        }
        Commands::Save { file } => Command::Save(Box::new(parse_state(&read_input(&file)?)?)),
        Commands::Load => Command::Load,
        Commands::Clear => Command::Clear,
        Commands::Health => Command::Health,
        Commands::Metrics { prometheus } => Command::Metrics { prometheus },
        Commands::Audit => Command::Audit,
    };

    let config = RuntimeConfig::from_env().context("loading runtime configuration")?;
    let service = build_service(&config)?;
    let output = execute(&service, command).await?;

    match output {
        serde_json::Value::String(text) => print!("{text}"),
        value if args.compact => println!("{}", serde_json::to_string(&value)?),
        value => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn read_input(file: &Path) -> Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut bytes)?;
        return Ok(bytes);
    }
    std::fs::read(file).with_context(|| format!("reading {}", file.display()))
}
