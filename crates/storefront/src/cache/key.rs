//! Related-products queries and the composite keys they are cached under.

use std::collections::BTreeSet;

use uti_games_core::{ProductId, TagId};

/// Number of related products returned when no limit is given.
pub const DEFAULT_RELATED_LIMIT: usize = 8;

/// A "products related to X" lookup.
///
/// # Example
///
/// ```rust
/// # use uti_games_storefront::cache::RelatedQuery;
/// let query = RelatedQuery::new("p1")
///     .tags(["rpg", "acao"])
///     .platform("PS5")
///     .limit(4);
/// assert_eq!(query.limit, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedQuery {
    pub product_id: ProductId,
    pub tags: Vec<TagId>,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
}

impl RelatedQuery {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            tags: Vec::new(),
            platform: None,
            category: None,
            limit: DEFAULT_RELATED_LIMIT,
        }
    }

    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagId>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether the query carries anything to match candidates against.
    #[must_use]
    pub fn has_criteria(&self) -> bool {
        !self.tags.is_empty() || self.platform.is_some() || self.category.is_some()
    }

    /// The cache key for this query. The limit is not part of it.
    #[must_use]
    pub fn key(&self) -> RelatedKey {
        RelatedKey {
            product_id: self.product_id.clone(),
            tags: self.tags.iter().cloned().collect(),
            platform: self.platform.clone(),
            category: self.category.clone(),
        }
    }
}

/// Composite key of a related-products entry.
///
/// Tags are a set, so `[a, b]` and `[b, a, a]` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelatedKey {
    pub product_id: ProductId,
    pub tags: BTreeSet<TagId>,
    pub platform: Option<String>,
    pub category: Option<String>,
}
