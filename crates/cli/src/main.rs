//! Customer portal CLI - migrations and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (portal tables and session table)
//! portal-cli migrate
//!
//! # Publish a portal-wide notification
//! portal-cli notify --title "New product arrived" --message "Check the catalog" --type info
//!
//! # Send a notification to one customer
//! portal-cli notify --title "Invoice ready" --message "..." --recipient 42
//!
//! # Load products from YAML
//! portal-cli seed-products crates/cli/data/products.yaml
//! ```
//!
//! All commands read `PORTAL_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(author, version, about = "Customer portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create a notification
    Notify {
        /// Notification title
        #[arg(short, long)]
        title: String,

        /// Notification body
        #[arg(short, long)]
        message: String,

        /// Free-form tag such as `info` or `warning`
        #[arg(long = "type")]
        kind: Option<String>,

        /// Address the notification to one customer ID instead of everyone
        #[arg(short, long)]
        recipient: Option<i32>,
    },
    /// Add products from a YAML file to the catalog
    SeedProducts {
        /// Path to the YAML file
        file: String,

        /// Validate the file without writing to the database
        #[arg(long)]
        dry_run: bool,
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
        Commands::Notify {
            title,
            message,
            kind,
            recipient,
        } => commands::notify::run(title, message, kind, recipient).await?,
        Commands::SeedProducts { file, dry_run } => {
            commands::seed::products(&file, dry_run).await?;
        }
    }
    Ok(())
}
