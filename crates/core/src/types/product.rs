//! Product records and the reduced summary kept in caches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, TagId};
use super::price::Pricing;

// =============================================================================
// Tags & Badges
// =============================================================================

/// A tag attached to a product (e.g. "RPG", "Lançamento").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductTag {
    pub id: TagId,
    pub name: String,
}

/// Promotional badge drawn over the product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Badge {
    pub text: Option<String>,
    /// CSS color value.
    pub color: Option<String>,
    pub visible: bool,
}

// =============================================================================
// Product
// =============================================================================

/// Full product record as stored by the catalog backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-friendly identifier.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub pricing: Pricing,
    /// Main image URL.
    pub image: Option<String>,
    pub additional_images: Vec<String>,
    pub badge: Badge,
    /// Gaming platform (e.g. "PS5", "Xbox Series X").
    pub platform: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<ProductTag>,
    pub is_active: bool,
    pub is_featured: bool,
    pub stock: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The fields listing pages and product cards need, cheap to clone and cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: Option<String>,
    pub pricing: Pricing,
    pub image: Option<String>,
    pub badge: Badge,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<ProductTag>,
    pub is_active: bool,
    pub is_featured: bool,
    pub stock: i32,
}

impl ProductSummary {
    /// Whether any of this product's tags is in `tags`.
    #[must_use]
    pub fn shares_tag_with(&self, tags: &[TagId]) -> bool {
        self.tags.iter().any(|tag| tags.contains(&tag.id))
    }
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            pricing: product.pricing.clone(),
            image: product.image.clone(),
            badge: product.badge.clone(),
            platform: product.platform.clone(),
            category: product.category.clone(),
            tags: product.tags.clone(),
            is_active: product.is_active,
            is_featured: product.is_featured,
            stock: product.stock,
        }
    }
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            pricing: product.pricing,
            image: product.image,
            badge: product.badge,
            platform: product.platform,
            category: product.category,
            tags: product.tags,
            is_active: product.is_active,
            is_featured: product.is_featured,
            stock: product.stock,
        }
    }
}
