//! Product and review domain types.
//!
//! These are snapshots of backend entities. A [`Product`] stored in the cart or
//! in favorites is a copy taken at the time of the mutation and never changes
//! when the backend product does.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReviewId};
use super::price::Price;
use super::status::StockStatus;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque backend identifier.
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Pre-sale price; the product is on sale when this is above `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub category: String,
    /// Average rating on a 0-5 scale.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    /// Units available. `None` means the backend did not report a quantity.
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Availability derived from the stock quantity.
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.stock_quantity)
    }

    /// Whether at least one unit is known to be available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_status().is_in_stock()
    }

    /// Whether the product is discounted from its original price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_name: String,
    /// Rating on a 0-5 scale.
    pub rating: f64,
    pub comment: String,
    /// Backend-provided date, kept verbatim.
    pub date: String,
    pub verified: bool,
}

/// Aggregate review numbers shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub count: usize,
    /// Mean rating rounded to two decimals; zero when there are no reviews.
    pub average: Decimal,
}

impl ReviewStats {
    /// Compute stats over a list of reviews.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();
        if count == 0 {
            return Self::default();
        }

        let sum: Decimal = reviews
            .iter()
            .map(|r| Decimal::from_f64_retain(r.rating).unwrap_or_default())
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let average = (sum / Decimal::from(count))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Self { count, average }
    }
}
