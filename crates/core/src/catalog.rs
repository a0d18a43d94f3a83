//! Catalog filter/sort pipeline.
//!
//! [`filter_products`] derives the visible product list from the raw catalog
//! and the user-controlled view state. It is a pure function and is safe to
//! recompute whenever the filters, sort key, search text or product list
//! change.
//!
//! Stages run in order and a product must pass all of them:
//!
//! 1. Text search on name or description (case-insensitive substring)
//! 2. Category membership (an empty selection means no restriction)
//! 3. Inclusive price range
//! 4. Minimum rating
//! 5. In-stock only
//!
//! The survivors are then ordered by a single [`SortKey`]. Every sort is
//! stable, so products with equal keys keep their catalog order.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product};

/// Upper bound of the default price filter, in dollars.
pub const DEFAULT_MAX_PRICE: u32 = 2000;

/// Active catalog narrowing criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Selected categories. Empty means every category.
    pub categories: BTreeSet<String>,
    /// Inclusive `(min, max)` price bounds.
    pub price_range: (Price, Price),
    /// Minimum average rating.
    pub min_rating: f64,
    /// Hide products that are not known to be in stock.
    pub in_stock_only: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            price_range: (Price::ZERO, Price::from_dollars(DEFAULT_MAX_PRICE)),
            min_rating: 0.0,
            in_stock_only: false,
        }
    }
}

impl FilterOptions {
    /// Whether a single product passes every non-search stage.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }

        let (min, max) = self.price_range;
        if product.price < min || product.price > max {
            return false;
        }

        if product.rating < self.min_rating {
            return false;
        }

        !self.in_stock_only || product.in_stock()
    }
}

/// Catalog sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Catalog order as returned by the backend.
    #[default]
    Featured,
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    #[serde(rename = "price-high")]
    PriceHighToLow,
    /// Highest rated first.
    Rating,
    /// Name A-Z.
    Name,
}

impl SortKey {
    /// Every sort key, in the order they are offered to shoppers.
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Rating,
        Self::Name,
    ];

    /// Parse from URL parameter value. Unknown values mean `Featured`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-low" | "price-ascending" => Self::PriceLowToHigh,
            "price-high" | "price-descending" => Self::PriceHighToLow,
            "rating" => Self::Rating,
            "name" => Self::Name,
            _ => Self::Featured,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLowToHigh => "price-low",
            Self::PriceHighToLow => "price-high",
            Self::Rating => "rating",
            Self::Name => "name",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
            Self::Rating => "Highest Rated",
            Self::Name => "Name A-Z",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => Ordering::Equal,
            Self::PriceLowToHigh => a.price.cmp(&b.price),
            Self::PriceHighToLow => b.price.cmp(&a.price),
            Self::Rating => b.rating.total_cmp(&a.rating),
            Self::Name => compare_names(&a.name, &b.name),
        }
    }
}

/// Locale-aware name ordering.
///
/// Names compare on their case-folded characters first. Names that differ
/// only in case put the lowercase form first, matching the usual collation
/// of English locales.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();

    folded(a).cmp(&folded(b)).then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map_or(Ordering::Equal, |(x, y)| {
                x.is_uppercase().cmp(&y.is_uppercase())
            })
    })
}

/// Derive the visible, ordered product list.
///
/// An empty result is a valid outcome; telling it apart from "still loading"
/// or "fetch failed" is the caller's job.
#[must_use]
pub fn filter_products(
    products: &[Product],
    options: &FilterOptions,
    sort: SortKey,
    search: &str,
) -> Vec<Product> {
    let needle = search.trim().to_lowercase();

    let mut visible: Vec<Product> = products
        .iter()
        .filter(|p| needle.is_empty() || matches_search(p, &needle))
        .filter(|p| options.matches(p))
        .cloned()
        .collect();

    if sort != SortKey::Featured {
        visible.sort_by(|a, b| sort.compare(a, b));
    }

    visible
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::ProductId;
    use proptest::prelude::*;

    fn product(id: &str, name: &str, category: &str, cents: u32, rating: f64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            price: Price::from_cents(cents),
            original_price: None,
            category: category.to_string(),
            rating,
            review_count: 0,
            stock_quantity: Some(5),
            features: Vec::new(),
            image: String::new(),
            featured: false,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Premium Wireless Headphones", "Audio", 29_999, 4.8),
            product("2", "Ultra-Slim Smartphone", "Mobile", 89_999, 4.6),
            product("3", "Professional Laptop", "Computers", 129_999, 4.7),
            product("4", "Wireless Earbuds", "Audio", 14_999, 4.4),
            product("5", "Gaming Mouse", "Computers", 7_999, 4.6),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_defaults_keep_everything_in_catalog_order() {
        let all = catalog();
        let visible = filter_products(&all, &FilterOptions::default(), SortKey::Featured, "");
        assert_eq!(visible, all);
    }

    #[test]
    fn test_empty_category_selection_means_no_restriction() {
        let all = catalog();
        let categories: BTreeSet<_> = all.iter().map(|p| p.category.clone()).collect();
        assert!(categories.len() >= 2);

        let visible = filter_products(&all, &FilterOptions::default(), SortKey::Featured, "");
        let seen: BTreeSet<_> = visible.iter().map(|p| p.category.clone()).collect();
        assert_eq!(seen, categories);
    }

    #[test]
    fn test_category_selection() {
        let options = FilterOptions {
            categories: BTreeSet::from(["Audio".to_string()]),
            ..FilterOptions::default()
        };
        let visible = filter_products(&catalog(), &options, SortKey::Featured, "");
        assert_eq!(
            names(&visible),
            ["Premium Wireless Headphones", "Wireless Earbuds"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let visible = filter_products(
            &catalog(),
            &FilterOptions::default(),
            SortKey::Featured,
            "WIRELESS",
        );
        assert_eq!(visible.len(), 2);

        let mut all = catalog();
        all[4].description = "Ergonomic and wireless".to_string();
        let visible = filter_products(&all, &FilterOptions::default(), SortKey::Featured, "wireless");
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let options = FilterOptions {
            price_range: (Price::from_cents(7_999), Price::from_cents(29_999)),
            ..FilterOptions::default()
        };
        let visible = filter_products(&catalog(), &options, SortKey::PriceLowToHigh, "");
        assert_eq!(
            names(&visible),
            [
                "Gaming Mouse",
                "Wireless Earbuds",
                "Premium Wireless Headphones"
            ]
        );
    }

    #[test]
    fn test_min_rating_and_stock() {
        let mut all = catalog();
        all[0].stock_quantity = Some(0);
        all[2].stock_quantity = None;

        let options = FilterOptions {
            min_rating: 4.6,
            in_stock_only: true,
            ..FilterOptions::default()
        };
        let visible = filter_products(&all, &options, SortKey::Featured, "");
        assert_eq!(names(&visible), ["Ultra-Slim Smartphone", "Gaming Mouse"]);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let visible = filter_products(
            &catalog(),
            &FilterOptions::default(),
            SortKey::Name,
            "toaster",
        );
        assert!(visible.is_empty());
    }

    #[test]
    fn test_rating_sort_is_stable_for_ties() {
        let visible = filter_products(&catalog(), &FilterOptions::default(), SortKey::Rating, "");
        assert_eq!(
            names(&visible),
            [
                "Premium Wireless Headphones",
                "Professional Laptop",
                "Ultra-Slim Smartphone",
                "Gaming Mouse",
                "Wireless Earbuds",
            ]
        );
    }

    #[test]
    fn test_price_high_to_low() {
        let visible = filter_products(
            &catalog(),
            &FilterOptions::default(),
            SortKey::PriceHighToLow,
            "",
        );
        assert_eq!(visible[0].name, "Professional Laptop");
        assert_eq!(visible[4].name, "Gaming Mouse");
    }

    #[test]
    fn test_name_sort_is_locale_aware() {
        let all = vec![
            product("1", "Banana", "Fruit", 100, 4.0),
            product("2", "apple", "Fruit", 100, 4.0),
            product("3", "Cherry", "Fruit", 100, 4.0),
        ];
        let visible = filter_products(&all, &FilterOptions::default(), SortKey::Name, "");
        assert_eq!(names(&visible), ["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_compare_names_lowercase_first_on_case_tie() {
        assert_eq!(compare_names("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_names("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
        assert_eq!(compare_names("Äpfel", "äpfel"), Ordering::Greater);
    }

    #[test]
    fn test_sort_key_parse_round_trip() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), key);
        }
        assert_eq!(SortKey::parse("bogus"), SortKey::Featured);
    }

    #[test]
    fn test_sort_key_serializes_as_url_value() {
        for key in SortKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
            assert_eq!(serde_json::from_str::<SortKey>(&json).unwrap(), key);
        }
    }

    fn arb_product() -> impl Strategy<Value = Product> {
        (
            "[a-f0-9]{4}",
            "[A-Za-z ]{1,12}",
            prop::sample::select(vec!["Audio", "Mobile", "Computers"]),
            0u32..300_000,
            0u8..=50,
            prop::option::of(0u32..20),
        )
            .prop_map(|(id, name, category, cents, rating, stock)| {
                let mut p = product(&id, &name, category, cents, f64::from(rating) / 10.0);
                p.stock_quantity = stock;
                p
            })
    }

    fn arb_options() -> impl Strategy<Value = FilterOptions> {
        (
            prop::collection::btree_set(
                prop::sample::select(vec!["Audio".to_string(), "Mobile".to_string()]),
                0..=2,
            ),
            0u32..100_000,
            100_000u32..300_000,
            0u8..=50,
            any::<bool>(),
        )
            .prop_map(|(categories, lo, hi, rating, in_stock_only)| FilterOptions {
                categories,
                price_range: (Price::from_cents(lo), Price::from_cents(hi)),
                min_rating: f64::from(rating) / 10.0,
                in_stock_only,
            })
    }

    fn arb_sort() -> impl Strategy<Value = SortKey> {
        prop::sample::select(SortKey::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_pipeline_is_idempotent(
            products in prop::collection::vec(arb_product(), 0..30),
            options in arb_options(),
            sort in arb_sort(),
            search in "[a-z]{0,2}",
        ) {
            let once = filter_products(&products, &options, sort, &search);
            let twice = filter_products(&once, &options, sort, &search);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(filter_products(&products, &options, sort, &search), once);
        }

        #[test]
        fn prop_every_result_passes_filters(
            products in prop::collection::vec(arb_product(), 0..30),
            options in arb_options(),
            sort in arb_sort(),
        ) {
            let visible = filter_products(&products, &options, sort, "");
            prop_assert!(visible.len() <= products.len());
            for p in &visible {
                prop_assert!(options.matches(p));
            }
        }

        #[test]
        fn prop_featured_preserves_relative_order(
            products in prop::collection::vec(arb_product(), 0..30),
            options in arb_options(),
        ) {
            let visible = filter_products(&products, &options, SortKey::Featured, "");
            let expected: Vec<_> = products.iter().filter(|p| options.matches(p)).cloned().collect();
            prop_assert_eq!(visible, expected);
        }
    }
}
