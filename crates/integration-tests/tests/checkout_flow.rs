//! Integration tests for placing orders.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use shopfront_core::{Price, ProductId};
use shopfront_integration_tests::FakeBackend;
use shopfront_storefront::checkout::{
    CheckoutError, OrderSummary, ShippingDetails, ShippingMethod, place_order,
};
use shopfront_storefront::storage::MemoryStorage;
use shopfront_storefront::{CartStore, Notifier, StoreEvent};

fn shipping() -> ShippingDetails {
    ShippingDetails {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: "grace@navy.mil".into(),
        phone: "555-0100".into(),
        address: "1 Compiler Ct".into(),
        city: "Arlington".into(),
        state: "VA".into(),
        zip: "22201".into(),
        ..ShippingDetails::default()
    }
}

async fn filled_cart(backend: &FakeBackend) -> CartStore {
    let client = backend.client();
    let mut cart = CartStore::load(Arc::new(MemoryStorage::new()), Notifier::default());
    let earbuds = client.product(&ProductId::new("2")).await.unwrap();
    cart.add_to_cart(&earbuds, 2);
    cart
}

#[tokio::test]
async fn test_order_clears_cart_and_notifies() {
    let backend = FakeBackend::sample().await;
    let mut cart = filled_cart(&backend).await;
    let mut events = cart.subscribe();

    let receipt = place_order(
        &backend.client(),
        &mut cart,
        &shipping(),
        ShippingMethod::Standard,
    )
    .await
    .unwrap();

    // 2 x $19.50 = $39.00, tax $3.12, shipping $9.99
    assert_eq!(receipt.summary.subtotal, Price::from_cents(3900));
    assert_eq!(receipt.summary.total, Price::from_cents(5211));
    assert_eq!(receipt.order_id.unwrap().as_str(), "1001");
    assert!(cart.is_empty());

    let titles: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|e| match e {
            StoreEvent::Notification(n) => Some(n.title),
            _ => None,
        })
        .collect();
    assert!(titles.contains(&"Order Placed Successfully!".to_string()));

    let state = backend.state();
    let order = &state.orders[0];
    assert_eq!(order["items"][0]["product_id"], "2");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["shipping_method"], "standard");
    assert_eq!(order["customer"]["email"], "grace@navy.mil");
    assert_eq!(order["total"], "52.11");
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let backend = FakeBackend::sample().await;
    backend.state().reject_orders = true;
    let mut cart = filled_cart(&backend).await;
    let before = cart.items().to_vec();

    let err = place_order(
        &backend.client(),
        &mut cart,
        &shipping(),
        ShippingMethod::Overnight,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(cart.items(), before.as_slice());
    assert!(backend.state().orders.is_empty());
}

#[tokio::test]
async fn test_summary_matches_submitted_totals() {
    let backend = FakeBackend::sample().await;
    let mut cart = filled_cart(&backend).await;
    let headphones = backend
        .client()
        .product(&ProductId::new("1"))
        .await
        .unwrap();
    cart.add_to_cart(&headphones, 1);

    let summary = OrderSummary::for_cart(&cart, ShippingMethod::Standard);
    assert!(summary.shipping.is_zero());
    assert_eq!(summary.free_shipping_remaining, None);

    let receipt = place_order(
        &backend.client(),
        &mut cart,
        &shipping(),
        ShippingMethod::Standard,
    )
    .await
    .unwrap();
    assert_eq!(receipt.summary, summary);
}
