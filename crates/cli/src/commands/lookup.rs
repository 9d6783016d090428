//! Product and related-product lookups.

use tracing::info;
use uti_games_core::ProductId;
use uti_games_storefront::cache::{ProductCache, RelatedQuery};

use super::{CliError, print_json};

/// Print one product.
///
/// # Errors
///
/// Returns [`CliError::NotFound`] if the product does not exist or the
/// catalog could not be reached.
pub async fn product(cache: &ProductCache, id: ProductId) -> Result<(), CliError> {
    let summary = cache
        .get_product(&id)
        .await
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;
    print_json(&summary)
}

/// Print every product in `ids` that exists.
///
/// # Errors
///
/// Returns an error if the output cannot be serialized.
pub async fn products(cache: &ProductCache, ids: &[ProductId]) -> Result<(), CliError> {
    let found = cache.get_multiple_products(ids).await;
    if found.len() < ids.len() {
        info!(
            requested = ids.len(),
            found = found.len(),
            "Some products were not found"
        );
    }
    print_json(&found)
}

/// Print products related to `query.product_id`.
///
/// # Errors
///
/// Returns an error if the output cannot be serialized.
pub async fn related(cache: &ProductCache, query: &RelatedQuery) -> Result<(), CliError> {
    let related = cache.get_related_products(query).await;
    info!(count = related.len(), "Related products resolved");
    print_json(&related)
}
