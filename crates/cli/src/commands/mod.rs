//! Command implementations and shared plumbing.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL of the hosted catalog
//! - `SUPABASE_ANON_KEY` - Public API key
//! - `PRODUCT_CACHE_TTL_SECS`, `RELATED_CACHE_TTL_SECS` - Entry lifetimes

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uti_games_storefront::cache::ProductCache;
use uti_games_storefront::catalog::{CatalogError, SupabaseCatalog};
use uti_games_storefront::config::{ConfigError, StorefrontConfig};

pub mod lookup;
pub mod warm;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog client could not be built.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested product does not exist.
    #[error("Product not found: {0}")]
    NotFound(String),
}

/// Build a product cache over the configured catalog.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or the catalog URL is
/// unusable.
pub fn connect() -> Result<ProductCache, CliError> {
    let config = StorefrontConfig::from_env()?;
    debug!(?config, "Loaded configuration");

    let catalog = SupabaseCatalog::new(&config.supabase, &config.cache)?;
    Ok(ProductCache::new(Arc::new(catalog), config.cache))
}

/// Write `value` to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
