//! UTI dos Games CLI - Catalog lookups through the product cache.
//!
//! # Usage
//!
//! ```bash
//! # Show one product
//! uti-cli product 42
//!
//! # Resolve several products in one batch
//! uti-cli products 42 43 44
//!
//! # Related products for a product
//! uti-cli related 42 --tag rpg --tag acao --platform PS5 --limit 4
//!
//! # Warm the cache and report statistics
//! uti-cli warm 42 43 44
//! ```
//!
//! # Commands
//!
//! - `product` - Look up a single product
//! - `products` - Look up several products
//! - `related` - List related products
//! - `warm` - Preload products and print cache statistics
//!
//! Output is JSON on stdout. Logs go to stderr and honour `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uti_games_core::ProductId;
use uti_games_storefront::cache::{DEFAULT_RELATED_LIMIT, RelatedQuery};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "uti-cli")]
#[command(author, version, about = "UTI dos Games catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single product
    Product {
        /// Product id
        id: String,
    },
    /// Look up several products at once
    Products {
        /// Product ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List products related to a product
    Related {
        /// Source product id
        id: String,

        /// Tag id to match (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Platform to match
        #[arg(short, long)]
        platform: Option<String>,

        /// Category to match
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_RELATED_LIMIT)]
        limit: usize,
    },
    /// Preload products and print cache statistics
    Warm {
        /// Product ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "uti_games_storefront=info,uti_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cache = commands::connect()?;

    let outcome = match cli.command {
        Commands::Product { id } => commands::lookup::product(&cache, ProductId::new(id)).await,
        Commands::Products { ids } => {
            let ids: Vec<ProductId> = ids.into_iter().map(ProductId::from).collect();
            commands::lookup::products(&cache, &ids).await
        }
        Commands::Related {
            id,
            tags,
            platform,
            category,
            limit,
        } => {
            let mut query = RelatedQuery::new(id).tags(tags).limit(limit);
            if let Some(platform) = platform {
                query = query.platform(platform);
            }
            if let Some(category) = category {
                query = query.category(category);
            }
            commands::lookup::related(&cache, &query).await
        }
        Commands::Warm { ids } => {
            let ids: Vec<ProductId> = ids.into_iter().map(ProductId::from).collect();
            commands::warm::run(&cache, &ids).await
        }
    };

    let stats = cache.get_stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = stats.hit_rate,
        cache_size = stats.cache_size,
        "Cache statistics"
    );

    outcome
}
