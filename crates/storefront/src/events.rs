//! Store change events and user-facing notifications.
//!
//! Stores publish a [`StoreEvent`] after every committed mutation. Views
//! subscribe through a [`Notifier`] and re-render from the store's accessors;
//! [`Notification`] events carry the toast text shown to the shopper.

use tokio::sync::broadcast;
use tracing::debug;

/// Default number of buffered events per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// A short message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    /// Create a notification.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Events published by the cart and favorites stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The cart contents changed.
    CartChanged { total_items: u64 },
    /// The favorites set changed.
    FavoritesChanged { count: usize },
    /// A toast for the shopper.
    Notification(Notification),
    /// A mutation was applied in memory but could not be persisted.
    PersistFailed { key: &'static str, error: String },
}

/// Fan-out of store events to any number of subscribers.
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    /// Create a notifier buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: StoreEvent) {
        if self.tx.send(event).is_err() {
            debug!("Store event dropped, no subscribers");
        }
    }

    /// Publish a notification.
    pub fn notify(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(StoreEvent::Notification(Notification::new(title, description)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let notifier = Notifier::default();
        notifier.notify("Hello", "world");
    }

    #[test]
    fn test_every_subscriber_receives_events() {
        let notifier = Notifier::default();
        let mut a = notifier.subscribe();
        let mut b = notifier.clone().subscribe();

        notifier.emit(StoreEvent::FavoritesChanged { count: 2 });

        assert_eq!(a.try_recv().unwrap(), StoreEvent::FavoritesChanged { count: 2 });
        assert_eq!(b.try_recv().unwrap(), StoreEvent::FavoritesChanged { count: 2 });
    }
}
