//! Integration test support for UTI dos Games.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p uti-games-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `product_cache` - Product lookups, single-flight, TTL and stats
//! - `related_products` - Related-product ranking, caching and invalidation
//!
//! The tests run against [`MockCatalog`], an in-memory [`CatalogSource`] that
//! counts calls, can be switched to failing, and can hold fetches open so
//! concurrent callers overlap deterministically.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use uti_games_core::{Badge, Pricing, Product, ProductId, ProductTag, TagId};
use uti_games_storefront::cache::ProductCache;
use uti_games_storefront::catalog::{CatalogError, CatalogSource};
use uti_games_storefront::config::CacheConfig;

// =============================================================================
// MockCatalog
// =============================================================================

/// In-memory catalog backend.
#[derive(Default)]
pub struct MockCatalog {
    products: Mutex<Vec<Product>>,
    product_calls: Mutex<HashMap<ProductId, usize>>,
    listing_calls: AtomicUsize,
    listing_invalidations: AtomicUsize,
    failing: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockCatalog {
    /// Create a catalog holding `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(products),
            ..Self::default()
        })
    }

    /// Add or replace a product.
    pub fn upsert(&self, product: Product) {
        let mut products = lock(&self.products);
        products.retain(|p| p.id != product.id);
        products.push(product);
    }

    /// Remove a product from the backend.
    pub fn remove(&self, id: &str) {
        lock(&self.products).retain(|p| p.id.as_str() != id);
    }

    /// Make every subsequent fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Block fetches until [`MockCatalog::release_fetches`] is called.
    pub fn hold_fetches(&self) {
        *lock(&self.gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held fetches (and all later ones) through.
    pub fn release_fetches(&self) {
        if let Some(gate) = lock(&self.gate).take() {
            gate.close();
        }
    }

    /// Number of single-product fetches issued for `id`.
    #[must_use]
    pub fn product_calls(&self, id: &str) -> usize {
        lock(&self.product_calls).get(id).copied().unwrap_or(0)
    }

    /// Number of single-product fetches issued for any id.
    #[must_use]
    pub fn total_product_calls(&self) -> usize {
        lock(&self.product_calls).values().sum()
    }

    /// Number of full catalog fetches issued.
    #[must_use]
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Number of times the cache asked the catalog to drop its listing.
    #[must_use]
    pub fn listing_invalidations(&self) -> usize {
        self.listing_invalidations.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            // Closed semaphore means released
            let _ = gate.acquire().await;
        }
    }

    fn check_failing(&self) -> Result<(), CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("mock backend offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        *lock(&self.product_calls).entry(id.clone()).or_insert(0) += 1;
        self.pass_gate().await;
        self.check_failing()?;

        Ok(lock(&self.products).iter().find(|p| &p.id == id).cloned())
    }

    async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<Product>, CatalogError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.check_failing()?;

        Ok(lock(&self.products)
            .iter()
            .filter(|p| include_inactive || p.is_active)
            .cloned()
            .collect())
    }

    fn invalidate_listing(&self) {
        self.listing_invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Builder for test products.
#[derive(Debug, Clone)]
pub struct ProductBuilder(Product);

impl ProductBuilder {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Product {
            id: ProductId::new(id),
            name: format!("Produto {id}"),
            slug: Some(id.to_string()),
            description: None,
            pricing: Pricing {
                price: Decimal::new(100, 0),
                ..Pricing::default()
            },
            image: None,
            additional_images: vec![],
            badge: Badge::default(),
            platform: None,
            category: None,
            tags: vec![],
            is_active: true,
            is_featured: false,
            stock: 5,
            created_at: None,
            updated_at: None,
        })
    }

    #[must_use]
    pub fn price(mut self, price: i64) -> Self {
        self.0.pricing.price = Decimal::new(price, 0);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.0.tags = tags
            .iter()
            .map(|t| ProductTag {
                id: TagId::new(*t),
                name: (*t).to_string(),
            })
            .collect();
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: &str) -> Self {
        self.0.platform = Some(platform.to_string());
        self
    }

    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.0.category = Some(category.to_string());
        self
    }

    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.0.is_active = false;
        self
    }

    #[must_use]
    pub fn build(self) -> Product {
        self.0
    }
}

/// Cache configuration with explicit TTLs.
#[must_use]
pub fn cache_config(product_ttl: Duration, related_ttl: Duration) -> CacheConfig {
    CacheConfig {
        product_ttl,
        related_ttl,
        sweep_interval: Duration::from_secs(60),
        ..CacheConfig::default()
    }
}

/// A fresh cache over `catalog` with default TTLs.
#[must_use]
pub fn cache_over(catalog: &Arc<MockCatalog>) -> ProductCache {
    ProductCache::new(catalog.clone(), CacheConfig::default())
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
