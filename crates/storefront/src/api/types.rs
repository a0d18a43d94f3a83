//! Wire shapes of the commerce REST API.
//!
//! The backend is loose about field names and types (ids may be numbers or
//! strings, prices may be strings), so rows are decoded into structs of
//! optional `serde_json::Value`s and mapped into domain types by the
//! conversion functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A product row from `GET /products` or `GET /products/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiProduct {
    pub product_id: Option<Value>,
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
    pub original_price: Option<Value>,
    /// Category label, category id, or `{ "name": .. }` object.
    pub category: Option<Value>,
    pub category_name: Option<Value>,
    pub rating: Option<Value>,
    pub review_count: Option<Value>,
    pub stock_quantity: Option<Value>,
    /// Some endpoints report a count here instead of `stock_quantity`.
    pub in_stock: Option<Value>,
    pub features: Option<Value>,
    pub featured: Option<Value>,
}

/// A review row from `GET /product-reviews/product/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiReview {
    pub id: Option<Value>,
    pub product_id: Option<Value>,
    #[serde(alias = "userName")]
    pub user_name: Option<Value>,
    pub rating: Option<Value>,
    pub comment: Option<Value>,
    pub date: Option<Value>,
    pub verified: Option<Value>,
}

/// Body of `POST /product-reviews`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReview {
    pub product_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

/// Body of `POST /cart` for the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineRequest {
    pub product_id: String,
    pub quantity: u32,
}
