//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Tests run the storefront library against [`FakeBackend`], an `axum` app
//! serving the commerce REST endpoints from in-memory fixtures on an
//! ephemeral loopback port. No external services are needed.
//!
//! # Test Categories
//!
//! - `catalog_client` - REST mapping, caching and fallbacks
//! - `cards` - Concurrent card loading, cancellation, product detail
//! - `checkout_flow` - Order placement against the backend

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shopfront_storefront::CatalogClient;
use shopfront_storefront::config::ApiConfig;

/// Fixtures served by the fake backend and requests it has recorded.
#[derive(Debug, Default)]
pub struct BackendState {
    pub products: Vec<Value>,
    /// Stock bodies by product id; missing ids answer 500.
    pub stock: HashMap<String, Value>,
    /// Review arrays by product id; missing ids answer 500.
    pub reviews: HashMap<String, Value>,
    pub categories: Vec<Value>,
    /// Category lookup bodies by id; missing ids answer 404.
    pub category_names: HashMap<String, Value>,
    /// Delay before answering stock requests.
    pub stock_delay: Option<Duration>,
    /// Answer order submissions with 503.
    pub reject_orders: bool,

    pub product_list_requests: usize,
    pub category_requests: usize,
    pub orders: Vec<Value>,
    pub submitted_reviews: Vec<Value>,
    pub cart_lines: Vec<Value>,
}

type Shared = Arc<Mutex<BackendState>>;

/// An in-process commerce API.
pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    /// Serve `state` on an ephemeral port.
    pub async fn start(state: BackendState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/products/{id}/in_stock", get(get_stock))
            .route("/product-reviews/product/{id}", get(get_reviews))
            .route("/product-reviews", post(post_review))
            .route("/categories", get(list_categories))
            .route("/categories/{id}", get(get_category))
            .route("/cart", post(post_cart))
            .route("/orders", post(post_order))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Serve [`sample_catalog`].
    pub async fn sample() -> Self {
        Self::start(sample_catalog()).await
    }

    /// Inspect or change the backend state.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// A fresh client (with its own cache) pointed at this backend.
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&ApiConfig::new(&self.base_url).unwrap())
    }
}

/// Three products in two categories, one referenced by a category id.
pub fn sample_catalog() -> BackendState {
    let mut state = BackendState {
        products: vec![
            json!({
                "product_id": 1,
                "name": "Wireless Headphones",
                "description": "Noise cancelling over-ear headphones",
                "price": "199.99",
                "original_price": "249.99",
                "category": "Audio",
                "rating": 4.7,
                "review_count": 2,
                "stock_quantity": 12,
                "features": ["Bluetooth 5.3", "30h battery"],
                "featured": true
            }),
            json!({
                "id": "2",
                "name": "budget earbuds",
                "description": "Everyday earbuds",
                "price": 19.5,
                "category": "Audio",
                "rating": 3.9,
                "stock_quantity": 0
            }),
            json!({
                "product_id": "3",
                "name": "Smartphone X",
                "description": "Flagship phone",
                "price": 899,
                "category": "7",
                "rating": "4.4",
                "in_stock": 5
            }),
        ],
        categories: vec![
            json!("Audio"),
            json!({"id": 7, "name": "Mobile"}),
            json!("Audio"),
        ],
        ..BackendState::default()
    };

    state.stock.insert("1".into(), json!({"in_stock": 9}));
    state.stock.insert("2".into(), json!(0));
    state.stock.insert("3".into(), json!(5));
    state.reviews.insert(
        "1".into(),
        json!([
            {"id": 10, "product_id": 1, "user_name": "Ana", "rating": 5, "comment": "Superb", "date": "2024-03-01", "verified": true},
            {"id": 11, "product_id": 1, "userName": "Ben", "rating": 4, "comment": "Good", "date": "2024-03-02"}
        ]),
    );
    state.reviews.insert("2".into(), json!([]));
    state
        .category_names
        .insert("7".into(), json!({"category_name": "Mobile"}));
    state
}

// =============================================================================
// Handlers
// =============================================================================

fn product_id_of(row: &Value) -> Option<String> {
    ["product_id", "id"].iter().find_map(|key| match row.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

async fn list_products(State(state): State<Shared>) -> Json<Vec<Value>> {
    let mut state = state.lock().unwrap();
    state.product_list_requests += 1;
    Json(state.products.clone())
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    state
        .products
        .iter()
        .find(|row| product_id_of(row).as_deref() == Some(id.as_str()))
        .map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            |row| Json(row.clone()).into_response(),
        )
}

async fn get_stock(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let (delay, body) = {
        let state = state.lock().unwrap();
        (state.stock_delay, state.stock.get(&id).cloned())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    body.map_or_else(
        || StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        |body| Json(body).into_response(),
    )
}

async fn get_reviews(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    state.reviews.get(&id).cloned().map_or_else(
        || StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        |body| Json(body).into_response(),
    )
}

async fn post_review(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    state.lock().unwrap().submitted_reviews.push(body);
    StatusCode::CREATED
}

async fn list_categories(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(state.lock().unwrap().categories.clone())
}

async fn get_category(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    state.category_requests += 1;
    state.category_names.get(&id).cloned().map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |body| Json(body).into_response(),
    )
}

async fn post_cart(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    state.lock().unwrap().cart_lines.push(body);
    StatusCode::CREATED
}

async fn post_order(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if state.reject_orders {
        return (StatusCode::SERVICE_UNAVAILABLE, "payments offline").into_response();
    }
    state.orders.push(body);
    let order_id = state.orders.len() + 1000;
    (StatusCode::CREATED, Json(json!({ "order_id": order_id }))).into_response()
}
