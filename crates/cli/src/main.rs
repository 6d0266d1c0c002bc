//! Royal Florist CLI - an interactive storefront in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (name, email, password, then the emailed code)
//! florist register
//!
//! # Sign in with a password, or with an emailed code
//! florist login
//! florist login --otp
//!
//! # Browse and shop
//! florist catalog products --category 65f0c1
//! florist cart add 65f0d2
//! florist checkout
//! ```
//!
//! # Commands
//!
//! - `register`, `login`, `forgot`, `logout` - Account flows
//! - `profile show|update` - Contact details
//! - `catalog categories|products` - Browse the shop
//! - `cart show|add|inc|dec|remove` - Manage the cart
//! - `wishlist show|toggle|remove` - Manage liked products
//! - `checkout` - Pay for the cart
//!
//! The session is kept in `FLORIST_SESSION_FILE` between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use royal_florist_storefront::{Storefront, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod console;
mod prompt;

use console::ConsoleNotifier;
use prompt::Prompt;

#[derive(Parser)]
#[command(name = "florist")]
#[command(author, version, about = "Royal Florist storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account, verified by an emailed code
    Register,
    /// Sign in
    Login {
        /// Sign in with an emailed code instead of a password
        #[arg(long)]
        otp: bool,
    },
    /// Reset a forgotten password
    Forgot,
    /// Sign out and forget the stored session
    Logout,
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse categories and products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// View and change your cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// View and change your wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Pay for everything in the cart
    Checkout,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Edit phone number and address
    Update,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List categories
    Categories,
    /// List products
    Products {
        /// Only products in this category id
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add { product_id: String },
    /// Add one unit to a line
    Inc { product_id: String },
    /// Remove one unit from a line
    Dec { product_id: String },
    /// Remove a line
    Remove { product_id: String },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show liked products
    Show,
    /// Like or unlike a product
    Toggle { product_id: String },
    /// Unlike a product
    Remove { product_id: String },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "royal_florist_storefront=info,royal_florist_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let store = Storefront::open(config, Arc::new(ConsoleNotifier))?;
    let prompt = Prompt::stdin();

    match cli.command {
        Commands::Register => commands::account::register(&store, &prompt).await?,
        Commands::Login { otp: true } => commands::account::login_with_otp(&store, &prompt).await?,
        Commands::Login { otp: false } => commands::account::login(&store, &prompt).await?,
        Commands::Forgot => commands::account::forgot(&store, &prompt).await?,
        Commands::Logout => commands::account::logout(&store)?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::show_profile(&store).await?,
            ProfileAction::Update => commands::account::update_profile(&store, &prompt).await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Categories => commands::shop::categories(&store).await?,
            CatalogAction::Products { category } => {
                commands::shop::products(&store, category).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::show_cart(&store).await?,
            CartAction::Add { product_id } => commands::shop::add_to_cart(&store, &product_id).await?,
            CartAction::Inc { product_id } => commands::shop::increment(&store, &product_id).await?,
            CartAction::Dec { product_id } => commands::shop::decrement(&store, &product_id).await?,
            CartAction::Remove { product_id } => {
                commands::shop::remove_from_cart(&store, &product_id).await?;
            }
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::shop::show_wishlist(&store).await?,
            WishlistAction::Toggle { product_id } => {
                commands::shop::toggle_wishlist(&store, &product_id).await?;
            }
            WishlistAction::Remove { product_id } => {
                commands::shop::remove_from_wishlist(&store, &product_id).await?;
            }
        },
        Commands::Checkout => commands::shop::checkout(&store, &prompt).await?,
    }
    Ok(())
}
