//! In-memory product cache.
//!
//! Fronts a [`CatalogSource`] with TTL-bound product and related-product
//! entries so product cards and listing pages rarely wait on the backend.
//!
//! # Guarantees
//!
//! - Concurrent `get_product` calls for one id share a single backend fetch
//! - A started fetch runs to completion even if every caller stops waiting
//! - Reads never fail: fetch errors are logged and answered with the last
//!   cached (possibly expired) value, or nothing
//! - A product id is always either absent, being fetched, or fully cached
//!
//! All state sits behind one mutex that is never held across an `.await`.

mod entry;
mod key;
mod related;
mod stats;
mod sweeper;

pub use entry::{CachedProduct, RelatedEntry};
pub use key::{DEFAULT_RELATED_LIMIT, RelatedKey, RelatedQuery};
pub use stats::{CacheStats, SweepReport};
pub use sweeper::{MIN_SWEEP_INTERVAL, SweeperHandle};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uti_games_core::{Product, ProductId, ProductSummary};

use crate::catalog::{CatalogError, CatalogSource};
use crate::config::CacheConfig;

use related::rank_related;
use stats::Counters;

type SharedFetch = Shared<BoxFuture<'static, Option<ProductSummary>>>;

// =============================================================================
// ProductCache
// =============================================================================

/// Product cache service.
///
/// Cheap to clone; clones share the same entries. Independent instances are
/// fully isolated from each other.
#[derive(Clone)]
pub struct ProductCache {
    inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    source: Arc<dyn CatalogSource>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    products: HashMap<ProductId, CachedProduct>,
    related: HashMap<RelatedKey, RelatedEntry>,
    /// Source product id -> related entries computed for it.
    related_by_source: HashMap<ProductId, HashSet<RelatedKey>>,
    in_flight: HashMap<ProductId, InFlight>,
    next_ticket: u64,
    counters: Counters,
}

/// A registered product fetch. The ticket tells a finishing fetch whether it
/// is still the one the cache is waiting for.
struct InFlight {
    ticket: u64,
    fetch: SharedFetch,
}

impl ProductCache {
    /// Create a cache in front of `source`.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Get a reference to the cache configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Resolve one product, from memory when possible.
    ///
    /// Returns `None` when the product does not exist, or when the backend
    /// fails and nothing was cached for it before.
    ///
    /// # Panics
    ///
    /// Panics on a miss if called outside of a Tokio runtime.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Option<ProductSummary> {
        let fetch = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            if let Some(entry) = state.products.get(id)
                && entry.is_valid_at(Instant::now())
            {
                state.counters.hits += 1;
                debug!("Cache hit for product");
                return Some(entry.summary.clone());
            }

            state.counters.misses += 1;

            if let Some(in_flight) = state.in_flight.get(id) {
                debug!("Joining in-flight fetch");
                in_flight.fetch.clone()
            } else {
                let ticket = state.next_ticket;
                state.next_ticket += 1;
                let fetch = self.start_fetch(id.clone(), ticket);
                state.in_flight.insert(
                    id.clone(),
                    InFlight {
                        ticket,
                        fetch: fetch.clone(),
                    },
                );
                fetch
            }
        };

        fetch.await
    }

    /// Resolve several products at once.
    ///
    /// Valid cached products come first; the rest are fetched concurrently
    /// and appended as they complete. Unknown ids are skipped and repeated
    /// ids are resolved once.
    pub async fn get_multiple_products(&self, ids: &[ProductId]) -> Vec<ProductSummary> {
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();

        {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            let now = Instant::now();
            let mut seen = HashSet::new();

            for id in ids {
                if !seen.insert(id) {
                    continue;
                }
                match state.products.get(id) {
                    Some(entry) if entry.is_valid_at(now) => {
                        state.counters.hits += 1;
                        found.push(entry.summary.clone());
                    }
                    _ => missing.push(id.clone()),
                }
            }
        }

        debug!(
            cached = found.len(),
            missing = missing.len(),
            "Resolving product batch"
        );

        let mut pending: FuturesUnordered<_> =
            missing.iter().map(|id| self.get_product(id)).collect();
        while let Some(resolved) = pending.next().await {
            found.extend(resolved);
        }

        found
    }

    /// Start fetching products that are not validly cached, without waiting.
    ///
    /// Returns how many fetches were started. Does nothing outside a Tokio
    /// runtime.
    pub fn preload_products(&self, ids: &[ProductId]) -> usize {
        let Ok(runtime) = Handle::try_current() else {
            warn!("Product preload requested outside of a Tokio runtime");
            return 0;
        };

        let to_fetch: Vec<ProductId> = {
            let state = self.inner.lock();
            let now = Instant::now();
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| seen.insert(*id))
                .filter(|id| {
                    !state.in_flight.contains_key(*id)
                        && !state
                            .products
                            .get(*id)
                            .is_some_and(|entry| entry.is_valid_at(now))
                })
                .cloned()
                .collect()
        };

        let started = to_fetch.len();
        for id in to_fetch {
            let cache = self.clone();
            runtime.spawn(async move {
                cache.get_product(&id).await;
            });
        }

        if started > 0 {
            debug!(count = started, "Preloading products");
        }
        started
    }

    /// Whether `id` is cached and still valid.
    #[must_use]
    pub fn is_cached(&self, id: &ProductId) -> bool {
        self.inner
            .lock()
            .products
            .get(id)
            .is_some_and(|entry| entry.is_valid_at(Instant::now()))
    }

    // =========================================================================
    // Related Products
    // =========================================================================

    /// Products related to `query.product_id`, best matches first.
    ///
    /// Shared tags rank above a matching platform, which ranks above a
    /// matching category. Returns at most `query.limit` products and never
    /// includes the source product or inactive products.
    #[instrument(skip(self), fields(product_id = %query.product_id))]
    pub async fn get_related_products(&self, query: &RelatedQuery) -> Vec<ProductSummary> {
        if !query.has_criteria() {
            return Vec::new();
        }

        let key = query.key();

        {
            let state = self.inner.lock();
            if let Some(entry) = state.related.get(&key)
                && entry.is_valid_at(Instant::now())
            {
                debug!("Cache hit for related products");
                return entry.take(query.limit);
            }
        }

        match self.inner.source.fetch_products(false).await {
            Ok(catalog) => {
                let ranked = rank_related(query, catalog, query.limit.saturating_mul(2));
                let result = ranked.iter().take(query.limit).cloned().collect();
                if !ranked.is_empty() {
                    self.inner.store_related(key, ranked);
                }
                result
            }
            Err(e) => {
                let stale = self
                    .inner
                    .lock()
                    .related
                    .get(&key)
                    .map(|entry| entry.take(query.limit));
                warn!(
                    error = %e,
                    serving_stale = stale.is_some(),
                    "Related products fetch failed"
                );
                stale.unwrap_or_default()
            }
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Forget a product and every related list computed for it.
    ///
    /// A fetch already running for the product will not write its result
    /// back. Invalidating an unknown id does nothing.
    pub fn invalidate_product(&self, id: &ProductId) {
        let (product, related) = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            let product = state.products.remove(id).is_some();
            state.in_flight.remove(id);

            let keys = state.related_by_source.remove(id).unwrap_or_default();
            for key in &keys {
                state.related.remove(key);
            }
            (product, keys.len())
        };

        self.inner.source.invalidate_listing();
        debug!(product_id = %id, product, related, "Invalidated product");
    }

    /// Drop every entry and reset statistics.
    pub fn clear_cache(&self) {
        {
            let mut state = self.inner.lock();
            // Tickets keep counting so fetches started before the clear stay stale
            let next_ticket = state.next_ticket;
            *state = CacheState {
                next_ticket,
                ..CacheState::default()
            };
        }

        self.inner.source.invalidate_listing();
        info!("Product cache cleared");
    }

    /// Snapshot of hit/miss counters and cache size.
    #[must_use]
    pub fn get_stats(&self) -> CacheStats {
        let state = self.inner.lock();
        state.counters.snapshot(state.products.len())
    }

    /// Remove every expired product and related entry now.
    pub fn sweep_expired(&self) -> SweepReport {
        self.inner.sweep_expired()
    }

    /// Sweep expired entries every `sweep_interval` in the background.
    ///
    /// Intervals shorter than [`MIN_SWEEP_INTERVAL`] are raised to it.
    ///
    /// The task holds only a weak reference, so it never keeps the cache
    /// alive.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use = "dropping the handle stops the sweeper"]
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        sweeper::spawn(Arc::downgrade(&self.inner), self.inner.config.sweep_interval)
    }

    /// Spawn one product fetch and return a shared handle to its outcome.
    ///
    /// The fetch runs as its own task, so it completes and writes back even
    /// when every caller waiting on it has gone away.
    fn start_fetch(&self, id: ProductId, ticket: u64) -> SharedFetch {
        let source = Arc::clone(&self.inner.source);
        let cache = Arc::downgrade(&self.inner);
        let task_id = id.clone();

        let task = tokio::spawn(async move {
            let _cleanup = InFlightCleanup {
                cache: cache.clone(),
                id: task_id.clone(),
                ticket,
            };

            let result = source.fetch_product(&task_id).await;

            match cache.upgrade() {
                Some(inner) => inner.complete_fetch(&task_id, ticket, result),
                None => result.ok().flatten().map(ProductSummary::from),
            }
        });

        async move {
            task.await.unwrap_or_else(|e| {
                warn!(product_id = %id, error = %e, "Product fetch task failed");
                None
            })
        }
        .boxed()
        .shared()
    }
}

// =============================================================================
// CacheInner
// =============================================================================

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Every mutation replaces whole entries, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the outcome of a product fetch and pick what callers receive.
    fn complete_fetch(
        &self,
        id: &ProductId,
        ticket: u64,
        result: Result<Option<Product>, CatalogError>,
    ) -> Option<ProductSummary> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let current = state
            .in_flight
            .get(id)
            .is_some_and(|in_flight| in_flight.ticket == ticket);
        if current {
            state.in_flight.remove(id);
        }

        match result {
            Ok(Some(product)) => {
                let summary = ProductSummary::from(product);
                if current {
                    state.products.insert(
                        id.clone(),
                        CachedProduct::new(summary.clone(), Instant::now(), self.config.product_ttl),
                    );
                }
                Some(summary)
            }
            Ok(None) => {
                if current {
                    state.products.remove(id);
                }
                debug!(product_id = %id, "Product not found");
                None
            }
            Err(e) => {
                let stale = state.products.get(id).map(|entry| entry.summary.clone());
                warn!(
                    product_id = %id,
                    error = %e,
                    serving_stale = stale.is_some(),
                    "Product fetch failed"
                );
                stale
            }
        }
    }

    fn store_related(&self, key: RelatedKey, products: Vec<ProductSummary>) {
        let entry = RelatedEntry {
            products: products.into(),
            cached_at: Instant::now(),
            ttl: self.config.related_ttl,
        };

        let mut guard = self.lock();
        let state = &mut *guard;
        state
            .related_by_source
            .entry(key.product_id.clone())
            .or_default()
            .insert(key.clone());
        state.related.insert(key, entry);
    }

    fn sweep_expired(&self) -> SweepReport {
        let now = Instant::now();
        let mut guard = self.lock();
        let state = &mut *guard;

        let products_before = state.products.len();
        state.products.retain(|_, entry| entry.is_valid_at(now));

        let related_before = state.related.len();
        state.related.retain(|_, entry| entry.is_valid_at(now));
        state.related_by_source.retain(|_, keys| {
            keys.retain(|key| state.related.contains_key(key));
            !keys.is_empty()
        });

        let report = SweepReport {
            products: products_before - state.products.len(),
            related: related_before - state.related.len(),
        };
        drop(guard);

        if report.total() > 0 {
            info!(
                products = report.products,
                related = report.related,
                "Swept expired cache entries"
            );
        } else {
            debug!("Cache sweep found nothing expired");
        }
        report
    }
}

/// Unregisters a fetch that ends without completing, e.g. by panicking or
/// being aborted at runtime shutdown.
struct InFlightCleanup {
    cache: Weak<CacheInner>,
    id: ProductId,
    ticket: u64,
}

impl Drop for InFlightCleanup {
    fn drop(&mut self) {
        let Some(inner) = self.cache.upgrade() else {
            return;
        };
        let mut state = inner.lock();
        if state
            .in_flight
            .get(&self.id)
            .is_some_and(|in_flight| in_flight.ticket == self.ticket)
        {
            state.in_flight.remove(&self.id);
        }
    }
}
