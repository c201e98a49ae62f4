//! Shopcart CLI - drive the cart store against a live cart API.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart-cli show
//!
//! # Add two units of variant 12
//! cart-cli add 12 -q 2
//!
//! # Change a line's quantity, remove it, empty the cart
//! cart-cli update 5 3
//! cart-cli remove 5
//! cart-cli clear
//!
//! # Preview checkout for some lines, or all of them
//! cart-cli checkout 5 8
//! cart-cli checkout --all
//! ```
//!
//! # Environment Variables
//!
//! - `CART_API_BASE_URL` - Base URL of the cart REST API (required)
//! - `CART_API_TOKEN` - Shopper bearer token
//! - `CART_API_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `RUST_LOG` - Log filter (default: `shopcart_cli=info,shopcart_client=info`)
//!
//! # Exit Codes
//!
//! - `1` - The cart service failed or refused the request
//! - `2` - Invalid input or configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopcart_client::{CartStore, ClientConfig, HttpCartService};
use shopcart_core::{CartItemId, VariantId};

mod commands;
mod output;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(author, version, about = "Shopcart cart tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Show the number of units in the cart
    Count,
    /// Add a product variant to the cart
    Add {
        /// Variant ID
        variant_id: i64,

        /// Number of units (1-100)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Change the quantity of a cart line
    Update {
        /// Cart line ID
        item_id: i64,

        /// New quantity (1-100)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID
        item_id: i64,
    },
    /// Remove every line from the cart
    Clear,
    /// Preview checkout for the selected lines
    Checkout {
        /// Cart line IDs to select
        #[arg(required_unless_present = "all")]
        item_ids: Vec<String>,

        /// Select every line
        #[arg(long, conflicts_with = "item_ids")]
        all: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

/// Install the tracing subscriber. Logs go to stderr so command output on
/// stdout stays clean.
fn init_tracing(json: bool, sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopcart_cli=info,shopcart_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter)))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load .env before Sentry so SENTRY_DSN can come from it
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry();
    init_tracing(cli.json, sentry_guard.is_some());

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        // Flush Sentry before exiting
        drop(sentry_guard);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let store = CartStore::new(HttpCartService::new(&config)?);

    match cli.command {
        Commands::Show => commands::cart::show(&store).await?,
        Commands::Count => commands::cart::count(&store).await?,
        Commands::Add {
            variant_id,
            quantity,
        } => commands::cart::add(&store, VariantId::new(variant_id), quantity).await?,
        Commands::Update { item_id, quantity } => {
            commands::cart::update(&store, CartItemId::new(item_id), quantity).await?;
        }
        Commands::Remove { item_id } => {
            commands::cart::remove(&store, CartItemId::new(item_id)).await?;
        }
        Commands::Clear => commands::cart::clear(&store).await?,
        Commands::Checkout { item_ids, all } => {
            commands::checkout::preview(&store, &item_ids, all).await?;
        }
    }
    Ok(())
}
