//! Related-product ranking.
//!
//! Candidates are bucketed by the strongest criterion they satisfy:
//! a shared tag beats a matching platform, which beats a matching category.
//! Catalog order is kept inside a bucket. Candidates matching nothing are
//! left out.

use uti_games_core::{Product, ProductSummary};

use super::key::RelatedQuery;

/// Strongest match of a candidate against a query, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchTier {
    SharedTag,
    Platform,
    Category,
}

fn match_tier(query: &RelatedQuery, candidate: &ProductSummary) -> Option<MatchTier> {
    if candidate.shares_tag_with(&query.tags) {
        return Some(MatchTier::SharedTag);
    }
    if query.platform.is_some() && candidate.platform == query.platform {
        return Some(MatchTier::Platform);
    }
    if query.category.is_some() && candidate.category == query.category {
        return Some(MatchTier::Category);
    }
    None
}

/// Rank `catalog` for `query`, keeping at most `max` products.
///
/// The source product and inactive products are never included.
pub(crate) fn rank_related(
    query: &RelatedQuery,
    catalog: Vec<Product>,
    max: usize,
) -> Vec<ProductSummary> {
    if !query.has_criteria() {
        return Vec::new();
    }

    let mut ranked: Vec<(MatchTier, ProductSummary)> = catalog
        .into_iter()
        .filter(|p| p.is_active && p.id != query.product_id)
        .map(ProductSummary::from)
        .filter_map(|p| match_tier(query, &p).map(|tier| (tier, p)))
        .collect();

    // Stable sort keeps catalog order within a tier
    ranked.sort_by_key(|(tier, _)| *tier);

    ranked
        .into_iter()
        .take(max)
        .map(|(_, summary)| summary)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uti_games_core::{Badge, Pricing, ProductId, ProductTag, TagId};

    fn product(id: &str, tags: &[&str], platform: Option<&str>, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            slug: None,
            description: None,
            pricing: Pricing {
                price: Decimal::new(100, 0),
                ..Pricing::default()
            },
            image: None,
            additional_images: vec![],
            badge: Badge::default(),
            platform: platform.map(str::to_string),
            category: category.map(str::to_string),
            tags: tags
                .iter()
                .map(|t| ProductTag {
                    id: TagId::new(*t),
                    name: (*t).to_string(),
                })
                .collect(),
            is_active: true,
            is_featured: false,
            stock: 1,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(products: &[ProductSummary]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_tag_match_ranks_before_platform_only() {
        let query = RelatedQuery::new("src").tags(["rpg"]).platform("PS5");
        let catalog = vec![
            product("platform-only", &[], Some("PS5"), None),
            product("tagged", &["rpg"], Some("PC"), None),
        ];

        let ranked = rank_related(&query, catalog, 16);
        assert_eq!(ids(&ranked), vec!["tagged", "platform-only"]);
    }

    #[test]
    fn test_tiers_then_catalog_order() {
        let query = RelatedQuery::new("src")
            .tags(["rpg"])
            .platform("PS5")
            .category("games");
        let catalog = vec![
            product("cat-1", &[], Some("PC"), Some("games")),
            product("plat-1", &[], Some("PS5"), None),
            product("tag-1", &["rpg"], None, None),
            product("none", &["fps"], Some("Switch"), Some("acessorios")),
            product("tag-2", &["rpg", "fps"], Some("PS5"), Some("games")),
            product("plat-2", &[], Some("PS5"), Some("games")),
        ];

        let ranked = rank_related(&query, catalog, 16);
        assert_eq!(
            ids(&ranked),
            vec!["tag-1", "tag-2", "plat-1", "plat-2", "cat-1"]
        );
    }

    #[test]
    fn test_excludes_source_and_inactive() {
        let query = RelatedQuery::new("src").tags(["rpg"]);
        let mut inactive = product("inactive", &["rpg"], None, None);
        inactive.is_active = false;
        let catalog = vec![
            product("src", &["rpg"], None, None),
            inactive,
            product("ok", &["rpg"], None, None),
        ];

        let ranked = rank_related(&query, catalog, 16);
        assert_eq!(ids(&ranked), vec!["ok"]);
    }

    #[test]
    fn test_tags_match_by_id_not_name() {
        let query = RelatedQuery::new("src").tags(["rpg"]);
        let mut renamed = product("renamed", &[], None, None);
        renamed.tags = vec![ProductTag {
            id: TagId::new("tag-7"),
            name: "rpg".to_string(),
        }];

        assert!(rank_related(&query, vec![renamed], 16).is_empty());
    }

    #[test]
    fn test_truncates_to_max() {
        let query = RelatedQuery::new("src").category("games");
        let catalog = (0..10)
            .map(|i| product(&format!("p{i}"), &[], None, Some("games")))
            .collect();

        assert_eq!(rank_related(&query, catalog, 4).len(), 4);
    }

    #[test]
    fn test_no_criteria_yields_nothing() {
        let query = RelatedQuery::new("src");
        let catalog = vec![product("a", &["rpg"], Some("PS5"), Some("games"))];
        assert!(rank_related(&query, catalog, 16).is_empty());
        assert!(rank_related(&query, Vec::new(), 16).is_empty());
    }
}
