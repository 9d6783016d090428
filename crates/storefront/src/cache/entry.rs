//! Cache entries and their validity rule.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uti_games_core::ProductSummary;

/// A product summary stamped with when it was cached and for how long.
#[derive(Debug, Clone)]
pub struct CachedProduct {
    pub summary: ProductSummary,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedProduct {
    #[must_use]
    pub const fn new(summary: ProductSummary, cached_at: Instant, ttl: Duration) -> Self {
        Self {
            summary,
            cached_at,
            ttl,
        }
    }

    /// Valid iff `now - cached_at < ttl`.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        is_fresh(self.cached_at, self.ttl, now)
    }
}

/// An ordered related-products list, written as a unit.
///
/// Every member is cached at the same instant, so one stamp covers the list.
#[derive(Debug, Clone)]
pub struct RelatedEntry {
    pub products: Arc<[ProductSummary]>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl RelatedEntry {
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        is_fresh(self.cached_at, self.ttl, now)
    }

    /// The first `limit` products of the list.
    #[must_use]
    pub fn take(&self, limit: usize) -> Vec<ProductSummary> {
        self.products.iter().take(limit).cloned().collect()
    }
}

fn is_fresh(cached_at: Instant, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(cached_at) < ttl
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uti_games_core::{Badge, Pricing, ProductId};

    fn summary(id: &str) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            slug: None,
            pricing: Pricing {
                price: Decimal::new(100, 0),
                ..Pricing::default()
            },
            image: None,
            badge: Badge::default(),
            platform: None,
            category: None,
            tags: vec![],
            is_active: true,
            is_featured: false,
            stock: 1,
        }
    }

    #[test]
    fn test_valid_until_one_millisecond_before_ttl() {
        let cached_at = Instant::now();
        let ttl = Duration::from_millis(300_000);
        let entry = CachedProduct::new(summary("p1"), cached_at, ttl);

        assert!(entry.is_valid_at(cached_at));
        assert!(entry.is_valid_at(cached_at + ttl - Duration::from_millis(1)));
        assert!(!entry.is_valid_at(cached_at + ttl));
        assert!(!entry.is_valid_at(cached_at + ttl + Duration::from_millis(1)));
    }

    #[test]
    fn test_clock_before_insertion_counts_as_fresh() {
        let cached_at = Instant::now() + Duration::from_secs(5);
        let entry = CachedProduct::new(summary("p1"), cached_at, Duration::from_secs(1));
        assert!(entry.is_valid_at(Instant::now()));
    }

    #[test]
    fn test_related_take_trims_to_limit() {
        let entry = RelatedEntry {
            products: vec![summary("a"), summary("b"), summary("c")].into(),
            cached_at: Instant::now(),
            ttl: Duration::from_secs(60),
        };

        let ids: Vec<_> = entry.take(2).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId::new("a"), ProductId::new("b")]);
        assert_eq!(entry.take(10).len(), 3);
    }
}
