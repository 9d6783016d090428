//! Hosted backend (Supabase) catalog client.
//!
//! Reads the `products` table through the backend's REST interface with
//! `reqwest`. The full catalog listing is cached using `moka` so that bursts
//! of related-product lookups share one download.

mod conversions;

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;
use uti_games_core::{Product, ProductId};

use crate::config::{CacheConfig, SupabaseConfig};

use super::{CatalogError, CatalogSource};
use conversions::{ProductRow, convert_product};

/// Columns requested for every product, with tags flattened through the join table.
const PRODUCT_SELECT: &str = "*,product_tags(tag:tags(id,name))";

/// Longest slice of a response body kept in logs and errors.
const BODY_PREVIEW_CHARS: usize = 500;

// =============================================================================
// SupabaseCatalog
// =============================================================================

/// Catalog client for the hosted backend.
///
/// Cheap to clone; clones share the HTTP connection pool and listing cache.
#[derive(Clone)]
pub struct SupabaseCatalog {
    inner: Arc<SupabaseCatalogInner>,
}

struct SupabaseCatalogInner {
    client: reqwest::Client,
    products_endpoint: Url,
    anon_key: String,
    /// Keyed by `include_inactive`.
    listings: Cache<bool, Arc<Vec<Product>>>,
}

impl SupabaseCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST endpoint cannot be derived from the
    /// project URL or the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig, cache: &CacheConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(cache.request_timeout)
            .build()?;
        Self::with_client(config, cache, client)
    }

    /// Create a catalog client over an already configured HTTP client.
    fn with_client(
        config: &SupabaseConfig,
        cache: &CacheConfig,
        client: reqwest::Client,
    ) -> Result<Self, CatalogError> {
        let products_endpoint = rest_base(&config.url).join("rest/v1/products")?;

        let listings = Cache::builder()
            .max_capacity(2)
            .time_to_live(cache.listing_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(SupabaseCatalogInner {
                client,
                products_endpoint,
                anon_key: config.anon_key.expose_secret().to_string(),
                listings,
            }),
        })
    }

    /// Build the request URL for a product query.
    fn products_url(&self, filters: &[(&str, String)]) -> Url {
        let mut url = self.inner.products_endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", PRODUCT_SELECT);
            for (column, filter) in filters {
                pairs.append_pair(column, filter);
            }
        }
        url
    }

    /// Download the catalog listing.
    async fn fetch_listing(
        &self,
        include_inactive: bool,
    ) -> Result<Arc<Vec<Product>>, CatalogError> {
        let url = if include_inactive {
            self.products_url(&[])
        } else {
            self.products_url(&[("is_active", "eq.true".to_string())])
        };

        let products: Vec<Product> = self
            .fetch_rows(url)
            .await?
            .into_iter()
            .map(convert_product)
            .collect();

        debug!(count = products.len(), "Fetched catalog listing");
        Ok(Arc::new(products))
    }

    /// Execute a read against the products table.
    async fn fetch_rows(&self, url: Url) -> Result<Vec<ProductRow>, CatalogError> {
        let response = self
            .inner
            .client
            .get(url)
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", format!("Bearer {}", self.inner.anon_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %preview(&response_text),
                "Catalog backend returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: preview(&response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&response_text),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogSource for SupabaseCatalog {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        if id.is_empty() {
            return Ok(None);
        }

        let url = self.products_url(&[("id", format!("eq.{id}"))]);
        let rows = self.fetch_rows(url).await?;

        Ok(rows.into_iter().next().map(convert_product))
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<Product>, CatalogError> {
        // Concurrent misses for one key wait on a single download
        let listing = self
            .inner
            .listings
            .try_get_with(include_inactive, self.fetch_listing(include_inactive))
            .await
            .map_err(|e| {
                Arc::try_unwrap(e)
                    .unwrap_or_else(|shared| CatalogError::Unavailable(shared.to_string()))
            })?;

        Ok(listing.as_ref().clone())
    }

    fn invalidate_listing(&self) {
        self.inner.listings.invalidate_all();
    }
}

/// Project URL as a base for relative joins.
///
/// `Url::join` replaces the last path segment unless the path ends in `/`,
/// so `https://host/proxy` becomes `https://host/proxy/`.
fn rest_base(project_url: &Url) -> Url {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// First `BODY_PREVIEW_CHARS` characters of a response body.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;
    use secrecy::SecretString;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn catalog_at(url: &str) -> SupabaseCatalog {
        let config = SupabaseConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("anon"),
        };
        SupabaseCatalog::new(&config, &CacheConfig::default()).unwrap()
    }

    fn catalog() -> SupabaseCatalog {
        catalog_at("https://abc.supabase.co")
    }

    /// Minimal HTTP server answering every request with `body`.
    /// Returns its base URL and a request counter.
    async fn serve_json(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    // Hold the response so concurrent callers overlap
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}"), requests)
    }

    #[test]
    fn test_products_url_includes_select_and_filters() {
        let url = catalog().products_url(&[("id", "eq.p1".to_string())]);
        assert_eq!(url.path(), "/rest/v1/products");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), PRODUCT_SELECT.to_string()),
                ("id".to_string(), "eq.p1".to_string()),
            ]
        );
    }

    #[test]
    fn test_project_url_path_is_kept() {
        let url = catalog_at("https://abc.supabase.co/proxy").products_url(&[]);
        assert_eq!(url.path(), "/proxy/rest/v1/products");

        let url = catalog_at("https://abc.supabase.co/proxy/").products_url(&[]);
        assert_eq!(url.path(), "/proxy/rest/v1/products");
    }

    #[tokio::test]
    async fn test_concurrent_listing_misses_share_one_request() {
        let (base, requests) = serve_json("[]").await;
        let config = SupabaseConfig {
            url: Url::parse(&base).unwrap(),
            anon_key: SecretString::from("anon"),
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let catalog =
            SupabaseCatalog::with_client(&config, &CacheConfig::default(), client).unwrap();

        let results = join_all((0..5).map(|_| catalog.fetch_products(false))).await;
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(requests.load(Ordering::SeqCst), 1);

        catalog.invalidate_listing();
        catalog.fetch_products(false).await.unwrap();
        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_preview_truncates() {
        let body = "x".repeat(BODY_PREVIEW_CHARS + 10);
        assert_eq!(preview(&body).len(), BODY_PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_empty_id_is_not_found_without_request() {
        let result = catalog().fetch_product(&ProductId::new("")).await;
        assert!(matches!(result, Ok(None)));
    }
}
