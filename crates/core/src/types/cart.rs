//! Cart line item.

use serde::{Deserialize, Serialize};

use super::price::Price;
use super::product::Product;

/// One cart line: a product snapshot and how many units of it.
///
/// The quantity is always at least one; stores remove the line instead of
/// letting it reach zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the line using the snapshot price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    #[test]
    fn test_persisted_line_uses_camel_case_throughout() {
        let item = CartItem {
            product: Product {
                id: ProductId::new("7"),
                name: "Cable".to_string(),
                description: String::new(),
                price: Price::from_cents(450),
                original_price: Some(Price::from_cents(600)),
                category: "Audio".to_string(),
                rating: 4.0,
                review_count: 3,
                stock_quantity: Some(8),
                features: Vec::new(),
                image: String::new(),
                featured: false,
            },
            quantity: 2,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["product"]["stockQuantity"], 8);
        assert_eq!(json["product"]["reviewCount"], 3);
        assert!(json["product"].get("stock_quantity").is_none());
        assert_eq!(serde_json::from_value::<CartItem>(json).unwrap(), item);
        assert_eq!(item.line_total(), Price::from_cents(900));
    }
}
