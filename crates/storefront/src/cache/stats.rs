//! Hit/miss accounting.

use serde::Serialize;

/// Running counters kept inside the cache state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
}

impl Counters {
    pub(crate) fn snapshot(self, cache_size: usize) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            total_requests: self.hits + self.misses,
            hit_rate: hit_rate(self.hits, self.hits + self.misses),
            cache_size,
        }
    }
}

/// Point-in-time view of cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// `hits / total_requests`, or 0 when nothing was requested.
    pub hit_rate: f64,
    /// Number of cached products, valid or not.
    pub cache_size: usize,
}

#[allow(clippy::cast_precision_loss)] // Request counts stay far below 2^52
fn hit_rate(hits: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Entries removed by one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub products: usize,
    pub related: usize,
}

impl SweepReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.products + self.related
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_have_zero_hit_rate() {
        let stats = Counters::default().snapshot(0);
        assert_eq!(stats.total_requests, 0);
        assert!(stats.hit_rate.abs() < f64::EPSILON);
        assert!(!stats.hit_rate.is_nan());
    }

    #[test]
    fn test_hit_rate_is_hits_over_total() {
        let stats = Counters { hits: 3, misses: 1 }.snapshot(2);
        assert_eq!(stats.total_requests, 4);
        assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
        assert_eq!(stats.cache_size, 2);
    }

    #[test]
    fn test_sweep_report_total() {
        let report = SweepReport {
            products: 2,
            related: 3,
        };
        assert_eq!(report.total(), 5);
    }
}
