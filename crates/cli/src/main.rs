//! Shopfront CLI - browse the catalog, manage the cart and favorites, and
//! check out from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List in-stock audio products under $100, cheapest first
//! shopfront products --category Audio --max-price 100 --in-stock --sort price-low
//!
//! # Show a product page
//! shopfront product 42
//!
//! # Cart
//! shopfront cart add 42 --quantity 2
//! shopfront cart update 42 0
//! shopfront cart show --shipping express
//!
//! # Favorites
//! shopfront favorites toggle 42
//!
//! # Place an order
//! shopfront checkout --first-name Ada --last-name Lovelace --email ada@example.com \
//!     --address "1 Analytical Way" --city London --state LDN --zip 10001
//! ```
//!
//! Configuration comes from the environment (see `shopfront_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's interface
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::config::{LogFormat, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;
use commands::cart::CartAction;
use commands::catalog::{ProductsArgs, ReviewArgs};
use commands::checkout::CheckoutArgs;
use commands::favorites::FavoritesAction;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with filters and sorting
    Products(ProductsArgs),
    /// Show a product with stock and reviews
    Product {
        /// Product id
        id: String,
    },
    /// List category names
    Categories,
    /// Submit a review for a product
    Review(ReviewArgs),
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Place an order for the cart contents
    Checkout(CheckoutArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,shopfront_storefront=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let mut ctx = Context::new(&config);
    let result = run(cli, &mut ctx).await;
    ctx.print_notifications();

    if let Err(e) = result {
        e.report();
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, ctx: &mut Context) -> shopfront_storefront::Result<()> {
    match cli.command {
        Commands::Products(args) => commands::catalog::products(ctx, args).await,
        Commands::Product { id } => commands::catalog::product(ctx, &id).await,
        Commands::Categories => commands::catalog::categories(ctx).await,
        Commands::Review(args) => commands::catalog::review(ctx, args).await,
        Commands::Cart { action } => commands::cart::run(ctx, action).await,
        Commands::Favorites { action } => commands::favorites::run(ctx, action).await,
        Commands::Checkout(args) => commands::checkout::run(ctx, args).await,
    }
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
    fn test_negative_quantity_parses() {
        let cli = Cli::try_parse_from(["shopfront", "cart", "update", "42", "-1"]);
        assert!(cli.is_ok());
    }
}
