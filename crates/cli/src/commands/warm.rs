//! Cache warming.

use tracing::info;
use uti_games_core::ProductId;
use uti_games_storefront::cache::ProductCache;

use super::{CliError, print_json};

/// Preload `ids`, wait for the fetches to settle, then print cache statistics.
///
/// # Errors
///
/// Returns an error if the statistics cannot be serialized.
pub async fn run(cache: &ProductCache, ids: &[ProductId]) -> Result<(), CliError> {
    let started = cache.preload_products(ids);
    info!(requested = ids.len(), started, "Warming product cache");

    // Joins the preload fetches instead of issuing new ones
    let resolved = cache.get_multiple_products(ids).await;
    info!(cached = resolved.len(), "Product cache warm");

    print_json(&cache.get_stats())
}
