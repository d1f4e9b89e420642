//! Pawmart CLI - Cart and favorites inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Show a user's stored cart document
//! pawmart-cli cart show -u user-123
//!
//! # Delete a user's stored cart document
//! pawmart-cli cart delete -u user-123
//!
//! # List a user's favorite product ids
//! pawmart-cli favorites list -u user-123
//!
//! # Look up a product
//! pawmart-cli product get dog-bed-xl
//! ```
//!
//! # Commands
//!
//! - `cart show` / `cart delete` - Inspect or remove stored cart documents
//! - `favorites list` - List favorite product ids
//! - `product get` - Look up a product by id
//!
//! # Environment Variables
//!
//! - `PAWMART_GATEWAY_URL` - Base URL of the document store
//! - `PAWMART_GATEWAY_API_KEY` - API key for the document store

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pawmart-cli")]
#[command(author, version, about = "Pawmart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect stored cart documents
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Look up products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show a user's stored cart document
    Show {
        /// User id
        #[arg(short, long)]
        user: String,
    },
    /// Delete a user's stored cart document
    Delete {
        /// User id
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List a user's favorite product ids
    List {
        /// User id
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Look up a product by id
    Get {
        /// Product id
        id: String,
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
        Commands::Cart { action } => match action {
            CartAction::Show { user } => commands::cart::show(&user).await?,
            CartAction::Delete { user } => commands::cart::delete(&user).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { user } => commands::favorites::list(&user).await?,
        },
        Commands::Product { action } => match action {
            ProductAction::Get { id } => commands::product::get(&id).await?,
        },
    }
    Ok(())
}
