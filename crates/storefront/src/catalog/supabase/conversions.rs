//! Conversions from backend rows to domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uti_games_core::{Badge, Pricing, Product, ProductId, ProductTag, TagId};

/// A `products` row as returned by the REST interface.
///
/// Most columns are nullable in the table, so they are optional here and
/// defaulted during conversion.
#[derive(Debug, Deserialize)]
pub(super) struct ProductRow {
    id: String,
    name: String,
    slug: Option<String>,
    description: Option<String>,
    price: Decimal,
    pro_price: Option<Decimal>,
    list_price: Option<Decimal>,
    is_on_sale: Option<bool>,
    uti_pro_enabled: Option<bool>,
    uti_pro_custom_price: Option<Decimal>,
    image: Option<String>,
    additional_images: Option<Vec<String>>,
    badge_text: Option<String>,
    badge_color: Option<String>,
    badge_visible: Option<bool>,
    platform: Option<String>,
    category: Option<String>,
    is_active: Option<bool>,
    is_featured: Option<bool>,
    stock: Option<i32>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    product_tags: Vec<ProductTagRow>,
}

/// One row of the `product_tags` join, with the tag embedded.
#[derive(Debug, Deserialize)]
struct ProductTagRow {
    tag: Option<TagRow>,
}

#[derive(Debug, Deserialize)]
struct TagRow {
    id: String,
    name: String,
}

/// Convert a backend row into a [`Product`].
pub(super) fn convert_product(row: ProductRow) -> Product {
    let tags = row
        .product_tags
        .into_iter()
        .filter_map(|join| join.tag)
        .map(|tag| ProductTag {
            id: TagId::new(tag.id),
            name: tag.name,
        })
        .collect();

    Product {
        id: ProductId::new(row.id),
        name: row.name,
        slug: row.slug.filter(|s| !s.is_empty()),
        description: row.description,
        pricing: Pricing {
            price: row.price,
            member_price: row.pro_price,
            list_price: row.list_price,
            is_on_sale: row.is_on_sale.unwrap_or(false),
            member_pricing_enabled: row.uti_pro_enabled.unwrap_or(false),
            custom_member_price: row.uti_pro_custom_price,
        },
        image: row.image.filter(|s| !s.is_empty()),
        additional_images: row.additional_images.unwrap_or_default(),
        badge: Badge {
            text: row.badge_text.filter(|s| !s.is_empty()),
            color: row.badge_color,
            visible: row.badge_visible.unwrap_or(false),
        },
        platform: row.platform.filter(|s| !s.is_empty()),
        category: row.category.filter(|s| !s.is_empty()),
        tags,
        is_active: row.is_active.unwrap_or(true),
        is_featured: row.is_featured.unwrap_or(false),
        stock: row.stock.unwrap_or(0),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_full_row() {
        let json = r##"{
            "id": "p1",
            "name": "God of War Ragnarök",
            "slug": "god-of-war-ragnarok",
            "description": "Kratos e Atreus",
            "price": 249.9,
            "pro_price": "224.91",
            "list_price": 299.9,
            "is_on_sale": true,
            "uti_pro_enabled": true,
            "uti_pro_custom_price": null,
            "image": "https://cdn.example.com/gow.png",
            "additional_images": ["https://cdn.example.com/gow-2.png"],
            "badge_text": "Promoção",
            "badge_color": "#ef4444",
            "badge_visible": true,
            "platform": "PS5",
            "category": "games",
            "is_active": true,
            "is_featured": true,
            "stock": 12,
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": null,
            "product_tags": [
                {"tag": {"id": "t-acao", "name": "Ação"}},
                {"tag": null}
            ]
        }"##;

        let row: ProductRow = serde_json::from_str(json).unwrap();
        let product = convert_product(row);

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.pricing.price, Decimal::new(2499, 1));
        assert_eq!(product.pricing.member_price, Some(Decimal::new(22491, 2)));
        assert!(product.pricing.member_pricing_enabled);
        assert!(product.badge.visible);
        assert_eq!(product.tags.len(), 1);
        assert_eq!(product.tags[0].id.as_str(), "t-acao");
        assert_eq!(product.stock, 12);
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_convert_sparse_row_defaults() {
        let json = r#"{"id": "p2", "name": "Controle", "price": 99, "slug": "", "image": ""}"#;

        let row: ProductRow = serde_json::from_str(json).unwrap();
        let product = convert_product(row);

        assert!(product.slug.is_none());
        assert!(product.image.is_none());
        assert!(product.tags.is_empty());
        assert!(product.additional_images.is_empty());
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert!(!product.pricing.member_pricing_enabled);
        assert_eq!(product.stock, 0);
    }
}
