//! Product variations CLI - Database migrations and template tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! pv-cli migrate
//!
//! # Copy every product-scoped variable and value into the templates
//! pv-cli populate-variations
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `populate-variations` - Seed variation templates from existing products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pv-cli")]
#[command(author, version, about = "Product variations CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create variation templates from product-scoped variables
    PopulateVariations,
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
        Commands::PopulateVariations => commands::populate::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_populate_command() {
        let cli = Cli::try_parse_from(["pv-cli", "populate-variations"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::PopulateVariations)
        ));
    }
}
