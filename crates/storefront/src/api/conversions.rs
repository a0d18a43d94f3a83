//! Mapping of loose API rows into domain types.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use shopfront_core::{Price, Product, ProductId, Review, ReviewId};
use tracing::warn;

use super::types::{ApiProduct, ApiReview};

/// Label used when a product has no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

static NUMERIC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid regex"));
static UUID_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9-]{8,}$").expect("Invalid regex"));

// =============================================================================
// Scalar helpers
// =============================================================================

/// Strings pass through; numbers are rendered; anything else is absent.
fn as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_non_empty_string(value: Option<&Value>) -> Option<String> {
    as_string(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn as_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn as_price(value: Option<&Value>) -> Option<Price> {
    as_decimal(value).and_then(|d| Price::new(d).ok())
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A non-negative count. Negative numbers clamp to zero.
pub(super) fn as_quantity(value: Option<&Value>) -> Option<u32> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quantity = n.clamp(0.0, f64::from(u32::MAX)).floor() as u32;
    Some(quantity)
}

/// Category label from a string, a numeric id, or a `{ name | title }` object.
fn category_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(obj) => {
            as_non_empty_string(obj.get("name")).or_else(|| as_non_empty_string(obj.get("title")))
        }
        other => as_non_empty_string(Some(other)),
    }
}

// =============================================================================
// Products
// =============================================================================

/// Image endpoint for a product.
pub fn image_url(base_url: &str, id: &ProductId) -> String {
    format!(
        "{base_url}/product-images/{}/image",
        urlencoding::encode(id.as_str())
    )
}

/// Map a product row. Rows without any identifier are dropped unless a
/// fallback id (the one that was requested) is given.
pub fn convert_product(
    row: ApiProduct,
    base_url: &str,
    fallback_id: Option<&ProductId>,
) -> Option<Product> {
    let id = as_non_empty_string(row.product_id.as_ref())
        .or_else(|| as_non_empty_string(row.id.as_ref()))
        .map(ProductId::new)
        .or_else(|| fallback_id.cloned())?;

    let price = as_price(row.price.as_ref()).unwrap_or_else(|| {
        warn!(product_id = %id, "Product has no usable price, treating as zero");
        Price::ZERO
    });

    let stock_quantity = as_quantity(row.stock_quantity.as_ref()).or_else(|| {
        // `in_stock` is only trusted when it is a count; a bare boolean says
        // nothing about the quantity.
        match row.in_stock.as_ref() {
            Some(Value::Number(_) | Value::String(_)) => as_quantity(row.in_stock.as_ref()),
            _ => None,
        }
    });

    let features = match row.features {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Some(Product {
        name: as_string(row.name.as_ref()).unwrap_or_default(),
        description: as_string(row.description.as_ref()).unwrap_or_default(),
        price,
        original_price: as_price(row.original_price.as_ref()),
        category: category_label(row.category.as_ref())
            .or_else(|| as_non_empty_string(row.category_name.as_ref()))
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        rating: as_f64(row.rating.as_ref()).unwrap_or(0.0).clamp(0.0, 5.0),
        review_count: as_quantity(row.review_count.as_ref()).unwrap_or(0),
        stock_quantity,
        features,
        image: image_url(base_url, &id),
        featured: as_bool(row.featured.as_ref()).unwrap_or(false),
        id,
    })
}

/// Map a product listing, dropping rows without an identifier.
pub fn convert_products(rows: Vec<ApiProduct>, base_url: &str) -> Vec<Product> {
    let total = rows.len();
    let products: Vec<Product> = rows
        .into_iter()
        .filter_map(|row| convert_product(row, base_url, None))
        .collect();
    if products.len() != total {
        warn!(
            dropped = total - products.len(),
            "Dropped product rows without an id"
        );
    }
    products
}

// =============================================================================
// Stock, reviews, categories
// =============================================================================

/// Stock endpoint body: a bare number or `{ "in_stock": n }`.
pub fn convert_stock(body: &Value) -> Option<u32> {
    match body {
        Value::Object(obj) => as_quantity(obj.get("in_stock")),
        other => as_quantity(Some(other)),
    }
}

/// Map review rows for a product.
pub fn convert_reviews(rows: Vec<ApiReview>, product_id: &ProductId) -> Vec<Review> {
    rows.into_iter()
        .map(|row| Review {
            id: ReviewId::new(as_string(row.id.as_ref()).unwrap_or_default()),
            product_id: as_non_empty_string(row.product_id.as_ref())
                .map_or_else(|| product_id.clone(), ProductId::new),
            user_name: as_non_empty_string(row.user_name.as_ref())
                .unwrap_or_else(|| "Anonymous".to_string()),
            rating: as_f64(row.rating.as_ref()).unwrap_or(0.0).clamp(0.0, 5.0),
            comment: as_string(row.comment.as_ref()).unwrap_or_default(),
            date: as_string(row.date.as_ref()).unwrap_or_default(),
            verified: as_bool(row.verified.as_ref()).unwrap_or(false),
        })
        .collect()
}

/// Category listing entries: plain names or `{ id, name }` style objects.
///
/// Returns the de-duplicated names in first-seen order and the id-to-name
/// pairs found along the way.
pub fn convert_categories(entries: &[Value]) -> (Vec<String>, Vec<(String, String)>) {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for entry in entries {
        let name = match entry {
            Value::Null => None,
            Value::Object(obj) => {
                let id = as_non_empty_string(obj.get("id"))
                    .or_else(|| as_non_empty_string(obj.get("category_id")))
                    .or_else(|| as_non_empty_string(obj.get("key")));
                let name = as_non_empty_string(obj.get("name"))
                    .or_else(|| as_non_empty_string(obj.get("category_name")))
                    .or_else(|| as_non_empty_string(obj.get("title")))
                    .or_else(|| id.clone());
                if let (Some(id), Some(name)) = (&id, &name) {
                    pairs.push((id.clone(), name.clone()));
                }
                name
            }
            other => as_non_empty_string(Some(other)),
        };

        if let Some(name) = name
            && seen.insert(name.clone())
        {
            names.push(name);
        }
    }

    (names, pairs)
}

/// Category lookup body: a bare name or an object with a name-like field.
pub fn convert_category_name(body: &Value) -> Option<String> {
    match body {
        Value::Object(obj) => ["name", "category_name", "title", "label"]
            .iter()
            .find_map(|key| as_non_empty_string(obj.get(*key))),
        other => as_non_empty_string(Some(other)),
    }
}

/// Whether a raw category label is really an id that needs a lookup:
/// all digits, or a UUID-like run of hex digits and dashes.
pub fn looks_like_category_id(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    NUMERIC_ID_RE.is_match(trimmed) || (UUID_LIKE_RE.is_match(trimmed) && trimmed.contains('-'))
}
