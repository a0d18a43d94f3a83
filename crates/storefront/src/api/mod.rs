//! Commerce REST API client.
//!
//! Uses `reqwest` 0.13 for HTTP. Product listings, product details and
//! category names are cached with `moka` (TTL and capacity from
//! [`ApiConfig`]). Stock and reviews are always fetched fresh and degrade to
//! fallbacks instead of failing.

mod cache;
mod conversions;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shopfront_core::{OrderId, Product, ProductId, Review};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::checkout::OrderRequest;
use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use conversions::{UNCATEGORIZED, image_url, looks_like_category_id};
use conversions::{
    convert_categories, convert_category_name, convert_product, convert_products,
    convert_reviews, convert_stock,
};
pub use types::{CartLineRequest, NewReview};
use types::{ApiProduct, ApiReview};

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Whether the error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// First 200 characters of a response body, for error messages.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// GET a path and return the body of a successful response.
    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            warn!(
                status = %status,
                body = %snippet(&body),
                path,
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get_text(path).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %snippet(&body),
                path,
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// POST a JSON body and return the body of a successful response.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %snippet(&text),
                path,
                "API rejected request"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: snippet(&text),
            });
        }

        Ok(text)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let rows: Vec<ApiProduct> = self.get_json("/products").await?;
        let products = convert_products(rows, &self.inner.base_url);

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another error if
    /// the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/products/{}", urlencoding::encode(id.as_str()));
        let row: ApiProduct = self.get_json(&path).await?;
        let product = convert_product(row, &self.inner.base_url, Some(id))
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Current stock for a product, or `None` when it cannot be determined.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn stock(&self, id: &ProductId) -> Option<u32> {
        let path = format!("/products/{}/in_stock", urlencoding::encode(id.as_str()));
        match self.get_json::<Value>(&path).await {
            Ok(body) => {
                let stock = convert_stock(&body);
                if stock.is_none() {
                    warn!(body = %body, "Unrecognized stock response");
                }
                stock
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch stock");
                None
            }
        }
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Reviews for a product. Failures yield an empty list.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn reviews(&self, id: &ProductId) -> Vec<Review> {
        let path = format!(
            "/product-reviews/product/{}",
            urlencoding::encode(id.as_str())
        );
        match self.get_json::<Vec<ApiReview>>(&path).await {
            Ok(rows) => convert_reviews(rows, id),
            Err(e) => {
                warn!(error = %e, "Failed to fetch reviews");
                Vec::new()
            }
        }
    }

    /// Submit a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the review.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn submit_review(&self, review: &NewReview) -> Result<(), ApiError> {
        self.post_json("/product-reviews", review).await?;
        info!("Review submitted");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All category names, de-duplicated in listing order.
    ///
    /// Id-to-name pairs found in the listing are cached for later lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an array.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let entries: Vec<Value> = self.get_json("/categories").await?;
        let (names, pairs) = convert_categories(&entries);

        for (id, name) in pairs {
            self.inner
                .cache
                .insert(CacheKey::CategoryName(id), CacheValue::CategoryName(name))
                .await;
        }

        Ok(names)
    }

    /// Display name for a category id. Falls back to the id itself.
    #[instrument(skip(self))]
    pub async fn category_name(&self, id: &str) -> String {
        let key = CacheKey::CategoryName(id.to_string());
        if let Some(CacheValue::CategoryName(name)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category name");
            return name;
        }

        let path = format!("/categories/{}", urlencoding::encode(id));
        let name = match self.get_json::<Value>(&path).await {
            Ok(body) => convert_category_name(&body),
            Err(e) => {
                warn!(error = %e, "Failed to look up category");
                None
            }
        };

        match name {
            Some(name) => {
                self.inner
                    .cache
                    .insert(key, CacheValue::CategoryName(name.clone()))
                    .await;
                name
            }
            None => id.to_string(),
        }
    }

    /// Label to show for a product's raw category.
    ///
    /// Only labels that look like ids trigger a lookup; anything else is
    /// already a display name.
    pub async fn resolve_category_label(&self, raw: &str) -> String {
        if looks_like_category_id(raw) {
            self.category_name(raw.trim()).await
        } else {
            raw.to_string()
        }
    }

    // =========================================================================
    // Cart & orders
    // =========================================================================

    /// Add a line to the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_cart_item(&self, id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        let line = CartLineRequest {
            product_id: id.to_string(),
            quantity,
        };
        self.post_json("/cart", &line).await?;
        Ok(())
    }

    /// Submit an order. Returns the backend's order id when it reports one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<Option<OrderId>, ApiError> {
        let body = self.post_json("/orders", order).await?;

        let order_id = serde_json::from_str::<Value>(&body).ok().and_then(|v| {
            ["order_id", "id"].iter().find_map(|key| match v.get(*key)? {
                Value::String(s) if !s.is_empty() => Some(OrderId::new(s.clone())),
                Value::Number(n) => Some(OrderId::new(n.to_string())),
                _ => None,
            })
        });

        Ok(order_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(ApiError::NotFound("/products/1".into()).is_not_found());
        assert!(
            !ApiError::Status {
                status: 500,
                body: String::new()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 200);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_client_keeps_normalized_base_url() {
        let config = ApiConfig::new("http://shop.test/").unwrap();
        let client = CatalogClient::new(&config);
        assert_eq!(client.base_url(), "http://shop.test");
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades_to_fallbacks() {
        // Port 9 (discard) on loopback refuses connections.
        let config = ApiConfig::new("http://127.0.0.1:9").unwrap();
        let client = CatalogClient::new(&config);
        let id = ProductId::new("1");

        assert_eq!(client.stock(&id).await, None);
        assert!(client.reviews(&id).await.is_empty());
        assert_eq!(client.category_name("12").await, "12");
        assert_eq!(client.resolve_category_label("Audio").await, "Audio");
        assert!(client.products().await.is_err());
    }
}
