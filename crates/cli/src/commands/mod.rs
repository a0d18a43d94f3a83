//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;

use std::sync::Arc;

use shopfront_core::{Product, ProductId};
use shopfront_storefront::cards::CardDetails;
use shopfront_storefront::storage::{FileStorage, Storage};
use shopfront_storefront::{
    AppError, CartStore, CatalogClient, FavoritesStore, Notifier, StoreEvent,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Services shared by every subcommand.
pub struct Context {
    pub client: CatalogClient,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    events: broadcast::Receiver<StoreEvent>,
}

impl Context {
    pub fn new(config: &shopfront_storefront::StorefrontConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        Self::with_storage(CatalogClient::new(&config.api), storage)
    }

    pub fn with_storage(client: CatalogClient, storage: Arc<dyn Storage>) -> Self {
        let notifier = Notifier::default();
        let events = notifier.subscribe();
        Self {
            client,
            cart: CartStore::load(storage.clone(), notifier.clone()),
            favorites: FavoritesStore::load(storage, notifier),
            events,
        }
    }

    /// Print toasts and persistence warnings published since the last call.
    pub fn print_notifications(&mut self) {
        for event in drain_events(&mut self.events) {
            match event {
                StoreEvent::Notification(n) => println!("{}: {}", n.title, n.description),
                StoreEvent::PersistFailed { key, error } => {
                    eprintln!("warning: could not save {key}: {error}");
                }
                StoreEvent::CartChanged { .. } | StoreEvent::FavoritesChanged { .. } => {}
            }
        }
    }
}

/// Everything still buffered on `events`. A lagged receiver skips the
/// overwritten events and keeps reading the rest.
fn drain_events(events: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Dropped store events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return drained,
        }
    }
}

/// Parse a product id argument.
pub fn product_id(raw: &str) -> Result<ProductId, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("product id cannot be empty".to_string()));
    }
    Ok(ProductId::new(trimmed))
}

/// Fetch a product snapshot, mapping a missing product to `NotFound`.
pub async fn fetch_product(ctx: &Context, id: &ProductId) -> Result<Product, AppError> {
    ctx.client.product(id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("product {id}"))
        } else {
            AppError::Api(e)
        }
    })
}

/// One listing line for a product.
pub fn product_line(product: &Product, details: Option<&CardDetails>) -> String {
    let mut line = format!("{:<8} {:<40} {:>10}", product.id, product.name, product.price.to_string());
    if let Some(original) = product.original_price.filter(|_| product.is_on_sale()) {
        line.push_str(&format!(" (was {original})"));
    }
    match details {
        Some(details) => line.push_str(&format!(
            "  {:.1}★ ({} reviews)  {}  [{}]",
            details.reviews.average,
            details.reviews.count,
            details.stock_label(),
            details.category_label,
        )),
        None => line.push_str(&format!(
            "  {:.1}★  {}  [{}]",
            product.rating,
            product.stock_status().label(),
            product.category,
        )),
    }
    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::Price;

    fn product() -> Product {
        Product {
            id: ProductId::new("42"),
            name: "Headphones".into(),
            description: String::new(),
            price: Price::from_cents(7999),
            original_price: Some(Price::from_cents(9999)),
            category: "Audio".into(),
            rating: 4.5,
            review_count: 3,
            stock_quantity: Some(2),
            features: Vec::new(),
            image: String::new(),
            featured: false,
        }
    }

    #[test]
    fn test_cart_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let client = CatalogClient::new(
            &shopfront_storefront::config::ApiConfig::new("http://127.0.0.1:9").unwrap(),
        );

        let mut ctx = Context::with_storage(client.clone(), Arc::new(FileStorage::new(dir.path())));
        ctx.cart.add_to_cart(&product(), 2);
        ctx.favorites.add_to_favorites(&product());
        ctx.print_notifications();

        let ctx = Context::with_storage(client, Arc::new(FileStorage::new(dir.path())));
        assert_eq!(ctx.cart.total_items(), 2);
        assert_eq!(ctx.favorites.favorites_count(), 1);
    }

    #[test]
    fn test_drain_continues_past_lag() {
        let notifier = Notifier::new(2);
        let mut events = notifier.subscribe();
        for n in 0..5 {
            notifier.notify(format!("n{n}"), "");
        }

        let titles: Vec<String> = drain_events(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                StoreEvent::Notification(n) => Some(n.title),
                _ => None,
            })
            .collect();
        assert_eq!(titles, ["n3", "n4"]);
        assert!(drain_events(&mut events).is_empty());
    }

    #[test]
    fn test_product_id_rejects_blank() {
        assert!(product_id("  ").is_err());
        assert_eq!(product_id(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn test_product_line_shows_sale_and_stock() {
        let line = product_line(&product(), None);
        assert!(line.contains("$79.99"));
        assert!(line.contains("(was $99.99)"));
        assert!(line.contains("2 left"));
        assert!(line.contains("[Audio]"));
    }
}
