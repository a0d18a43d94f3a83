//! Cache types for catalog API responses.

use shopfront_core::{Product, ProductId};

/// Cache key for products and category names.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    /// Category id to display name.
    CategoryName(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    CategoryName(String),
}
