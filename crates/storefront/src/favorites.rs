//! Favorites store.
//!
//! A set of liked product snapshots keyed by product id, kept in the order
//! they were liked. Independent of the cart; the two stores share nothing
//! beyond holding products by value.

use std::sync::Arc;

use shopfront_core::{Product, ProductId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::add_breadcrumb;
use crate::events::{Notifier, StoreEvent};
use crate::storage::{Storage, load_json, save_json};

/// The shopper's liked products.
pub struct FavoritesStore {
    favorites: Vec<Product>,
    storage: Arc<dyn Storage>,
    notifier: Notifier,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("favorites", &self.favorites)
            .finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Storage key of the persisted favorites blob.
    pub const STORAGE_KEY: &'static str = "favorites";

    /// Create a store hydrated from `storage`.
    ///
    /// A missing or corrupt blob yields an empty set.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, notifier: Notifier) -> Self {
        let mut favorites: Vec<Product> = load_json(storage.as_ref(), Self::STORAGE_KEY);

        let mut seen = std::collections::HashSet::new();
        favorites.retain(|p| seen.insert(p.id.clone()));

        info!(count = favorites.len(), "Favorites loaded");
        Self {
            favorites,
            storage,
            notifier,
        }
    }

    /// Subscribe to change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    /// Persist and publish after a committed change.
    fn commit(&self, action: &str) {
        add_breadcrumb("favorites", action, None);

        if let Err(e) = save_json(self.storage.as_ref(), Self::STORAGE_KEY, &self.favorites) {
            warn!(error = %e, "Failed to persist favorites");
            self.notifier.emit(StoreEvent::PersistFailed {
                key: Self::STORAGE_KEY,
                error: e.to_string(),
            });
        }

        self.notifier.emit(StoreEvent::FavoritesChanged {
            count: self.favorites.len(),
        });
    }

    /// Like a product. No-op if it is already a favorite.
    pub fn add_to_favorites(&mut self, product: &Product) {
        if self.is_favorite(&product.id) {
            debug!(product_id = %product.id, "Already a favorite");
            return;
        }

        self.favorites.push(product.clone());
        self.commit("add");
        self.notifier.notify(
            "Added to Favorites",
            format!("{} has been added to your favorites", product.name),
        );
    }

    /// Unlike a product. No-op if it is not a favorite.
    pub fn remove_from_favorites(&mut self, product_id: &ProductId) {
        let Some(index) = self.favorites.iter().position(|p| &p.id == product_id) else {
            debug!(%product_id, "Not a favorite");
            return;
        };

        let removed = self.favorites.remove(index);
        self.commit("remove");
        self.notifier.notify(
            "Removed from Favorites",
            format!("{} has been removed from your favorites", removed.name),
        );
    }

    /// Remove the product if liked, otherwise like it.
    pub fn toggle_favorite(&mut self, product: &Product) {
        if self.is_favorite(&product.id) {
            self.remove_from_favorites(&product.id);
        } else {
            self.add_to_favorites(product);
        }
    }

    /// Remove every favorite.
    pub fn clear_favorites(&mut self) {
        self.favorites.clear();
        self.commit("clear");
        self.notifier.notify(
            "Favorites Cleared",
            "All items have been removed from your favorites",
        );
    }

    #[must_use]
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.favorites.iter().any(|p| &p.id == product_id)
    }

    #[must_use]
    pub fn favorites_count(&self) -> usize {
        self.favorites.len()
    }

    /// Liked products in the order they were liked.
    #[must_use]
    pub fn favorites(&self) -> &[Product] {
        &self.favorites
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::events::Notification;
    use crate::storage::MemoryStorage;
    use shopfront_core::Price;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Gadget {id}"),
            description: String::new(),
            price: Price::from_dollars(10),
            original_price: Some(Price::from_dollars(12)),
            category: "Mobile".to_string(),
            rating: 4.0,
            review_count: 2,
            stock_quantity: None,
            features: Vec::new(),
            image: String::new(),
            featured: true,
        }
    }

    fn store() -> (FavoritesStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (
            FavoritesStore::load(storage.clone(), Notifier::default()),
            storage,
        )
    }

    fn notifications(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<Notification> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|e| match e {
                StoreEvent::Notification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut favorites, _) = store();
        let mut events = favorites.subscribe();
        let p = product("1");

        favorites.add_to_favorites(&p);
        favorites.add_to_favorites(&p);

        assert_eq!(favorites.favorites_count(), 1);
        assert_eq!(notifications(&mut events).len(), 1);
    }

    #[test]
    fn test_remove_names_the_product() {
        let (mut favorites, _) = store();
        favorites.add_to_favorites(&product("1"));
        let mut events = favorites.subscribe();

        favorites.remove_from_favorites(&ProductId::new("1"));
        favorites.remove_from_favorites(&ProductId::new("1"));

        let sent = notifications(&mut events);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Removed from Favorites");
        assert!(sent[0].description.starts_with("Gadget 1"));
    }

    #[test]
    fn test_toggle_twice_restores_prior_state() {
        let (mut favorites, _) = store();
        favorites.add_to_favorites(&product("keep"));
        let before = favorites.favorites().to_vec();

        let p = product("2");
        favorites.toggle_favorite(&p);
        assert!(favorites.is_favorite(&p.id));
        favorites.toggle_favorite(&p);

        assert_eq!(favorites.favorites(), before.as_slice());
    }

    #[test]
    fn test_clear_notifies_even_when_empty() {
        let (mut favorites, _) = store();
        let mut events = favorites.subscribe();
        favorites.clear_favorites();

        assert_eq!(favorites.favorites_count(), 0);
        assert_eq!(notifications(&mut events)[0].title, "Favorites Cleared");
    }

    #[test]
    fn test_persists_and_reloads() {
        let (mut favorites, storage) = store();
        favorites.add_to_favorites(&product("1"));
        favorites.add_to_favorites(&product("2"));

        let reloaded = FavoritesStore::load(storage, Notifier::default());
        assert_eq!(reloaded.favorites(), favorites.favorites());
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let storage = Arc::new(MemoryStorage::with_blob(
            FavoritesStore::STORAGE_KEY,
            "not json",
        ));
        let favorites = FavoritesStore::load(storage, Notifier::default());
        assert_eq!(favorites.favorites_count(), 0);
    }

    #[test]
    fn test_independent_of_cart_blob() {
        let storage = Arc::new(MemoryStorage::with_blob("cart", "[]"));
        let mut favorites = FavoritesStore::load(storage.clone(), Notifier::default());
        favorites.add_to_favorites(&product("1"));
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("[]"));
    }
}
