//! Paradise Nursery CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run schema and session store migrations
//! pn-cli migrate
//!
//! # Load the starter catalog (and the seed admin when configured)
//! pn-cli seed --file crates/cli/seed/catalog.yaml
//!
//! # Create admin user
//! pn-cli admin create -e admin@example.com -n "Admin Name" -p "a-long-password"
//!
//! # Verify the database is reachable
//! pn-cli db check
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert categories and products from YAML
//! - `admin create` - Create admin users
//! - `db check` - Connectivity check with user count

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(author, version, about = "Paradise Nursery CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the catalog YAML file
        #[arg(short, long, default_value = "crates/cli/seed/catalog.yaml")]
        file: String,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Database diagnostics
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Connect and report the number of registered users
    Check,
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
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
        Commands::Db { action } => match action {
            DbAction::Check => commands::db::check().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "pn-cli", "admin", "create", "-e", "a@b.com", "-n", "Asha", "-p", "password1",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Admin {
                action: AdminAction::Create { email, name, .. },
            } => {
                assert_eq!(email, "a@b.com");
                assert_eq!(name, "Asha");
            }
            _ => panic!("expected admin create"),
        }
    }

    #[test]
    fn test_seed_file_defaults() {
        let cli = Cli::try_parse_from(["pn-cli", "seed"]).unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Seed { file } => assert_eq!(file, "crates/cli/seed/catalog.yaml"),
            _ => panic!("expected seed"),
        }
    }
}
