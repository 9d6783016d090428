//! Catalog sources: where product data comes from on a cache miss.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the product cache and the backend
//! - [`SupabaseCatalog`] talks to the hosted backend's REST interface
//! - The backend is the source of truth - NO local sync, direct API calls

mod supabase;

pub use supabase::SupabaseCatalog;

use async_trait::async_trait;
use thiserror::Error;
use uti_games_core::{Product, ProductId};

/// Errors that can occur when reading from the catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Source-specific failure.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Remote product lookups used on cache misses.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one product by id. `Ok(None)` means the product does not exist.
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Fetch the whole catalog, or only active products when
    /// `include_inactive` is false.
    async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<Product>, CatalogError>;

    /// Drop any product listing the source keeps on its own.
    fn invalidate_listing(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Status {
            status: 503,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 503: upstream down");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
