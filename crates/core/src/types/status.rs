//! Stock availability status.
//!
//! A product's stock quantity is the single source of truth for availability.
//! [`StockStatus`] is the derived view shown on product cards and used by the
//! in-stock filter.

use serde::{Deserialize, Serialize};

/// Availability derived from an optional stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// A known, positive number of units is available.
    Available(u32),
    /// The quantity is known to be zero.
    SoldOut,
    /// The quantity could not be determined (missing field or failed fetch).
    Unknown,
}

impl StockStatus {
    /// Derive the status from a stock quantity.
    #[must_use]
    pub const fn from_quantity(quantity: Option<u32>) -> Self {
        match quantity {
            Some(0) => Self::SoldOut,
            Some(n) => Self::Available(n),
            None => Self::Unknown,
        }
    }

    /// Whether the product can be bought. Unknown stock counts as unavailable.
    #[must_use]
    pub const fn is_in_stock(self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Short label for product cards.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Available(n) => format!("{n} left"),
            Self::SoldOut | Self::Unknown => "Out".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_quantity() {
        assert_eq!(StockStatus::from_quantity(Some(3)), StockStatus::Available(3));
        assert_eq!(StockStatus::from_quantity(Some(0)), StockStatus::SoldOut);
        assert_eq!(StockStatus::from_quantity(None), StockStatus::Unknown);
    }

    #[test]
    fn test_unknown_is_not_in_stock() {
        assert!(StockStatus::Available(1).is_in_stock());
        assert!(!StockStatus::SoldOut.is_in_stock());
        assert!(!StockStatus::Unknown.is_in_stock());
    }

    #[test]
    fn test_labels() {
        assert_eq!(StockStatus::Available(7).label(), "7 left");
        assert_eq!(StockStatus::Unknown.label(), "Out");
    }
}
