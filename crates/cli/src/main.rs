//! FIT AMIGO CLI - browse the platform from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Merged store listing, filtered
//! fit-amigo store --category supplements --max-price 60
//!
//! # Against the seeded in-memory backend instead of the gateway
//! fit-amigo --in-memory news --category nutrition
//!
//! # Signed-in views
//! fit-amigo --user alice cart
//! ```
//!
//! # Commands
//!
//! - `store` - Merged internal, partner and sports catalog
//! - `product` - One product's details
//! - `cart` / `orders` - The caller's cart summary and order history
//! - `videos` - The FiTube feed
//! - `news` - News articles
//! - `search` - Content search across every source
//! - `trackers` - Workout, running and food tracker totals
//!
//! # Environment Variables
//!
//! See `ClientConfig::from_env`; `FIT_AMIGO_BACKEND_URL` is required unless
//! `--in-memory` is given.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use fit_amigo_client::ClientConfig;
use fit_amigo_core::{NewsCategory, ProductId, StoreCategory};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fit-amigo")]
#[command(author, version, about = "FIT AMIGO command-line browser")]
struct Cli {
    /// Run against a seeded in-memory backend
    #[arg(long, global = true)]
    in_memory: bool,

    /// Principal to act as (anonymous when omitted)
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the merged store catalog
    Store {
        /// Store category (`gym-equipment`, `running-gear`, `sports-apparel`,
        /// `supplements`, `equipment`)
        #[arg(short, long)]
        category: Option<StoreCategory>,

        /// Inclusive price ceiling in dollars
        #[arg(short, long)]
        max_price: Option<Decimal>,
    },
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Show the caller's cart with totals
    Cart,
    /// List the caller's orders
    Orders,
    /// List uploaded and partner videos
    Videos,
    /// List news articles
    News {
        /// News category (e.g. `nutrition`, `sports-news`)
        #[arg(short, long)]
        category: Option<NewsCategory>,
    },
    /// Search products, videos, articles and tracker entries
    Search {
        /// Search term (at least two characters)
        term: String,
    },
    /// Show workout, running and food tracker totals
    Trackers,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fit_amigo_client=info,fit_amigo_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    let _sentry = init_sentry(&config);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CliError> {
    let client = commands::connect(config, cli.in_memory, cli.user.as_deref()).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Store {
            category,
            max_price,
        } => commands::store::listing(&client, category, max_price, &mut out).await?,
        Commands::Product { id } => commands::store::product(&client, id, &mut out).await?,
        Commands::Cart => commands::store::cart(&client, &mut out).await?,
        Commands::Orders => commands::store::orders(&client, &mut out).await?,
        Commands::Videos => commands::media::videos(&client, &mut out).await?,
        Commands::News { category } => commands::media::news(&client, category, &mut out).await?,
        Commands::Search { term } => commands::media::search(&client, &term, &mut out).await?,
        Commands::Trackers => commands::trackers::summary(&client, &mut out).await?,
    }
    Ok(())
}
