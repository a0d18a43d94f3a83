//! Cart store.
//!
//! Holds the shopper's in-progress line items and exposes derived totals.
//!
//! # Invariants
//!
//! - At most one line per product id; adding an existing product merges
//!   quantities.
//! - Lines keep insertion order across updates.
//! - Quantities are at least one; setting a quantity to zero or below removes
//!   the line.
//! - Totals use the price captured when the product was added, not a fresh
//!   backend price.
//!
//! Every mutation goes through [`CartStore::execute`], which applies a
//! [`CartCommand`] in memory, persists the whole cart, and then notifies
//! subscribers. A failed write never rolls back the in-memory change.

use std::sync::Arc;

use shopfront_core::{CartItem, Price, Product, ProductId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::add_breadcrumb;
use crate::events::{Notification, Notifier, StoreEvent};
use crate::storage::{Storage, load_json, save_json};

/// A cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    /// Add `quantity` units of a product snapshot.
    Add { product: Product, quantity: u32 },
    /// Set a line's quantity exactly; zero or below removes the line.
    SetQuantity { product_id: ProductId, quantity: i64 },
    /// Remove a line.
    Remove { product_id: ProductId },
    /// Remove every line.
    Clear,
}

impl CartCommand {
    /// Apply to the line items. Returns `None` when nothing changed, otherwise
    /// the notification to show (if any).
    fn apply(self, items: &mut Vec<CartItem>) -> Option<Option<Notification>> {
        match self {
            Self::Add { quantity: 0, .. } => None,
            Self::Add { product, quantity } => {
                let name = product.name.clone();
                if let Some(item) = items.iter_mut().find(|i| i.product.id == product.id) {
                    item.quantity = item.quantity.saturating_add(quantity);
                } else {
                    items.push(CartItem { product, quantity });
                }
                Some(Some(Notification::new(
                    "Added to cart",
                    format!("{name} has been added to your cart"),
                )))
            }
            Self::SetQuantity {
                product_id,
                quantity,
            } => {
                let index = items.iter().position(|i| i.product.id == product_id)?;
                if quantity <= 0 {
                    items.remove(index);
                } else {
                    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                    let item = items.get_mut(index)?;
                    if item.quantity == quantity {
                        return None;
                    }
                    item.quantity = quantity;
                }
                Some(None)
            }
            Self::Remove { product_id } => {
                let index = items.iter().position(|i| i.product.id == product_id)?;
                items.remove(index);
                Some(None)
            }
            Self::Clear => {
                items.clear();
                Some(None)
            }
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::SetQuantity { .. } => "set_quantity",
            Self::Remove { .. } => "remove",
            Self::Clear => "clear",
        }
    }
}

/// The shopper's cart.
pub struct CartStore {
    items: Vec<CartItem>,
    storage: Arc<dyn Storage>,
    notifier: Notifier,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Storage key of the persisted cart blob.
    pub const STORAGE_KEY: &'static str = "cart";

    /// Create a store hydrated from `storage`.
    ///
    /// A missing or corrupt blob yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, notifier: Notifier) -> Self {
        let mut items: Vec<CartItem> = load_json(storage.as_ref(), Self::STORAGE_KEY);

        // Blobs written by hand or by older versions may violate the
        // invariants; repair instead of rejecting.
        let before = items.len();
        items.retain(|i| i.quantity > 0);
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if let Some(existing) = merged.iter_mut().find(|m| m.product.id == item.product.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                merged.push(item);
            }
        }
        if merged.len() != before {
            warn!(
                dropped = before - merged.len(),
                "Repaired persisted cart lines"
            );
        }

        info!(lines = merged.len(), "Cart loaded");
        Self {
            items: merged,
            storage,
            notifier,
        }
    }

    /// Subscribe to change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    /// The channel this store publishes on.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Apply a command, persist, and notify. Returns whether anything changed.
    pub fn execute(&mut self, command: CartCommand) -> bool {
        let name = command.name();
        let Some(notification) = command.apply(&mut self.items) else {
            debug!(command = name, "Cart command was a no-op");
            return false;
        };

        add_breadcrumb("cart", name, None);
        self.persist();
        self.notifier.emit(StoreEvent::CartChanged {
            total_items: self.total_items(),
        });
        if let Some(notification) = notification {
            self.notifier.emit(StoreEvent::Notification(notification));
        }
        true
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), Self::STORAGE_KEY, &self.items) {
            warn!(error = %e, "Failed to persist cart");
            self.notifier.emit(StoreEvent::PersistFailed {
                key: Self::STORAGE_KEY,
                error: e.to_string(),
            });
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// A quantity of zero is ignored.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        self.execute(CartCommand::Add {
            product: product.clone(),
            quantity,
        });
    }

    /// Set a line's quantity exactly. Zero or below removes the line; an
    /// unknown product id is ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        self.execute(CartCommand::SetQuantity {
            product_id: product_id.clone(),
            quantity,
        });
    }

    /// Remove a line if present.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        self.execute(CartCommand::Remove {
            product_id: product_id.clone(),
        });
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.execute(CartCommand::Clear);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for a product, if any.
    #[must_use]
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (badge count), not the number of lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals at the captured prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
