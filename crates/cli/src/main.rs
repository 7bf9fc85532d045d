//! Bookstore CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bookstore-cli migrate
//!
//! # Create an admin account
//! bookstore-cli admin create -e admin@example.com -p s3cret! --first-name Ada --last-name Admin
//!
//! # Load categories and books from YAML
//! bookstore-cli seed catalog seed/catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin accounts
//! - `seed catalog` - Seed the catalogue from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bookstore-cli")]
#[command(author, version, about = "Online bookstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Login password (6 to 20 characters)
        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Shipping address stored on the account
        #[arg(long, default_value = "n/a")]
        address: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load categories and books from a YAML file
    Catalog {
        /// Path to the YAML file
        file: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                first_name,
                last_name,
                address,
            } => {
                commands::admin::create_user(&commands::admin::AdminAccount {
                    email,
                    password,
                    first_name,
                    last_name,
                    address,
                })
                .await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
    }
    Ok(())
}
