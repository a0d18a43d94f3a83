//! Product card and product detail loading.
//!
//! Each card needs three independent lookups (live stock, reviews, and a
//! category label that may need resolving). They run concurrently and are
//! bound to a [`CardScope`]: once the scope is cancelled or dropped, pending
//! loads stop and their results are discarded.

use shopfront_core::{
    FilterOptions, Product, ProductId, Review, ReviewStats, SortKey, StockStatus, filter_products,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::{ApiError, CatalogClient};

/// Per-card data fetched after the product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    /// Live stock, `None` when it could not be fetched.
    pub stock: Option<u32>,
    pub reviews: ReviewStats,
    /// Display name of the product's category.
    pub category_label: String,
}

impl CardDetails {
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.stock)
    }

    #[must_use]
    pub fn stock_label(&self) -> String {
        self.stock_status().label()
    }
}

/// Lifetime of the cards on one view.
///
/// Cancelled explicitly with [`CardScope::cancel`] or implicitly on drop.
#[derive(Debug, Default)]
pub struct CardScope {
    token: CancellationToken,
}

impl CardScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token for one card, cancelled together with the scope.
    #[must_use]
    pub fn card_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Abandon every pending card load.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Load a card's details on a background task.
    ///
    /// The task resolves to `None` if the scope goes away first.
    #[must_use]
    pub fn spawn(&self, client: CatalogClient, product: Product) -> JoinHandle<Option<CardDetails>> {
        let token = self.card_token();
        tokio::spawn(async move { load_card(&client, &product, &token).await })
    }
}

impl Drop for CardScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Fetch stock, reviews and the category label for a card concurrently.
///
/// Returns `None` when `token` is cancelled before the results are in.
/// Individual lookups never fail; they fall back instead.
pub async fn load_card(
    client: &CatalogClient,
    product: &Product,
    token: &CancellationToken,
) -> Option<CardDetails> {
    if token.is_cancelled() {
        return None;
    }

    let fetch = async {
        let (stock, reviews, category_label) = tokio::join!(
            client.stock(&product.id),
            client.reviews(&product.id),
            client.resolve_category_label(&product.category),
        );
        CardDetails {
            stock,
            reviews: ReviewStats::from_reviews(&reviews),
            category_label,
        }
    };

    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!(product_id = %product.id, "Card load cancelled");
            None
        }
        details = fetch => Some(details),
    }
}

// =============================================================================
// Product detail
// =============================================================================

/// Everything shown on a product page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    /// The product with its stock refreshed from the stock endpoint when
    /// that succeeded.
    pub product: Product,
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
    pub category_label: String,
}

/// Load a product page.
///
/// # Errors
///
/// Returns an error if the product itself cannot be fetched. Stock, reviews
/// and the category label fall back instead of failing.
pub async fn load_product_detail(
    client: &CatalogClient,
    id: &ProductId,
) -> Result<ProductDetail, ApiError> {
    let mut product = client.product(id).await?;

    let (stock, reviews, category_label) = tokio::join!(
        client.stock(id),
        client.reviews(id),
        client.resolve_category_label(&product.category),
    );

    if let Some(stock) = stock {
        product.stock_quantity = Some(stock);
    }

    Ok(ProductDetail {
        stats: ReviewStats::from_reviews(&reviews),
        product,
        reviews,
        category_label,
    })
}

// =============================================================================
// Catalog page
// =============================================================================

/// State of the product listing, so an empty result can be told apart from
/// loading or a failed fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Failed(String),
    Ready(Vec<Product>),
}

impl CatalogState {
    /// Fetch the listing.
    pub async fn load(client: &CatalogClient) -> Self {
        match client.products().await {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                Self::Ready(products)
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                Self::Failed(e.to_string())
            }
        }
    }

    /// The loaded products; empty while loading or after a failure.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Ready(products) => products,
            Self::Loading | Self::Failed(_) => &[],
        }
    }

    /// The filtered, sorted listing, or `None` unless the catalog is ready.
    #[must_use]
    pub fn visible(
        &self,
        options: &FilterOptions,
        sort: SortKey,
        search: &str,
    ) -> Option<Vec<Product>> {
        match self {
            Self::Ready(products) => Some(filter_products(products, options, sort, search)),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use shopfront_core::Price;

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            description: String::new(),
            price: Price::from_dollars(5),
            original_price: None,
            category: category.to_string(),
            rating: 3.0,
            review_count: 0,
            stock_quantity: Some(1),
            features: Vec::new(),
            image: String::new(),
            featured: false,
        }
    }

    fn offline_client() -> CatalogClient {
        CatalogClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap())
    }

    #[test]
    fn test_card_stock_label() {
        let mut details = CardDetails {
            stock: Some(4),
            reviews: ReviewStats::default(),
            category_label: "Audio".into(),
        };
        assert_eq!(details.stock_label(), "4 left");
        details.stock = None;
        assert_eq!(details.stock_label(), "Out");
    }

    #[test]
    fn test_dropping_scope_cancels_card_tokens() {
        let scope = CardScope::new();
        let token = scope.card_token();
        assert!(!token.is_cancelled());
        drop(scope);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_token_discards_results() {
        let token = CancellationToken::new();
        token.cancel();
        let details = load_card(&offline_client(), &product("1", "Audio"), &token).await;
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookups_fall_back() {
        let token = CancellationToken::new();
        let details = load_card(&offline_client(), &product("1", "Audio"), &token)
            .await
            .unwrap();

        assert_eq!(details.stock, None);
        assert_eq!(details.reviews, ReviewStats::default());
        assert_eq!(details.category_label, "Audio");
    }

    #[test]
    fn test_catalog_state_distinguishes_empty_from_loading() {
        let options = FilterOptions::default();
        assert_eq!(
            CatalogState::Loading.visible(&options, SortKey::Featured, ""),
            None
        );
        assert_eq!(
            CatalogState::Failed("boom".into()).visible(&options, SortKey::Featured, ""),
            None
        );
        let ready = CatalogState::Ready(vec![product("1", "Audio")]);
        assert_eq!(
            ready.visible(&options, SortKey::Featured, "nothing matches"),
            Some(Vec::new())
        );
    }
}
