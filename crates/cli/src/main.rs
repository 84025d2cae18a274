//! Customer Registry CLI - database migrations and lookup diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! registry-cli migrate
//!
//! # Resolve one postal code through the configured lookup service
//! registry-cli lookup 01310-100
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `lookup` - Resolve a postal code to an address

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(author, version, about = "Customer registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Resolve a postal code through the configured lookup service
    Lookup {
        /// Postal code, with or without punctuation
        postal_code: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Lookup { postal_code } => commands::lookup::run(&postal_code).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from(["registry-cli", "lookup", "01310-100"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Lookup { postal_code }) if postal_code == "01310-100"
        ));
    }
}
