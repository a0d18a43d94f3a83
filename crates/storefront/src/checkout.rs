//! Order summary and order placement.
//!
//! Tax is a flat 8 % of the subtotal. Standard shipping is free above $50;
//! express and overnight are flat rates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, EmailError, OrderId, Price, ProductId};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::{ApiError, CatalogClient};
use crate::cart::CartStore;
use crate::error::add_breadcrumb;

/// Sales tax rate in percent.
pub const TAX_RATE_PERCENT: u32 = 8;

/// Subtotal above which standard shipping is free.
#[must_use]
pub fn free_shipping_threshold() -> Price {
    Price::from_dollars(50)
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required shipping field is blank.
    #[error("Missing required field: {0}")]
    InvalidField(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend rejected or never received the order.
    #[error("Order submission failed: {0}")]
    Api(#[from] ApiError),
}

// =============================================================================
// Shipping
// =============================================================================

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl ShippingMethod {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    /// Parse from a form value. Unknown values fall back to standard.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "express" => Self::Express,
            "overnight" => Self::Overnight,
            _ => Self::Standard,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping (5-7 business days)",
            Self::Express => "Express Shipping (2-3 business days)",
            Self::Overnight => "Overnight Shipping (1 business day)",
        }
    }

    /// Shipping cost for an order with the given subtotal.
    #[must_use]
    pub fn cost(self, subtotal: Price) -> Price {
        match self {
            Self::Standard if subtotal > free_shipping_threshold() => Price::ZERO,
            Self::Standard => Price::from_cents(999),
            Self::Express => Price::from_cents(1599),
            Self::Overnight => Price::from_cents(2999),
        }
    }
}

/// Who the order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Default for ShippingDetails {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            country: "US".to_string(),
        }
    }
}

impl ShippingDetails {
    /// Check required fields and parse the email. Phone is optional.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field, or the email parse error.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::InvalidField(*field));
        }

        Ok(Email::parse(&self.email)?)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Money breakdown shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
    /// How much more to spend for free standard shipping.
    pub free_shipping_remaining: Option<Price>,
}

impl OrderSummary {
    #[must_use]
    pub fn for_cart(cart: &CartStore, method: ShippingMethod) -> Self {
        Self::for_subtotal(cart.total_price(), method)
    }

    #[must_use]
    pub fn for_subtotal(subtotal: Price, method: ShippingMethod) -> Self {
        let subtotal = subtotal.rounded();
        let tax = subtotal.percent(TAX_RATE_PERCENT).rounded();
        let shipping = method.cost(subtotal);
        let threshold = free_shipping_threshold();

        let free_shipping_remaining = (method == ShippingMethod::Standard
            && subtotal < threshold)
            .then(|| threshold.saturating_sub(subtotal));

        Self {
            subtotal,
            tax,
            shipping,
            total: (subtotal + tax + shipping).rounded(),
            free_shipping_remaining,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Client-generated reference, also used as an idempotency key.
    pub reference: Uuid,
    pub items: Vec<OrderLine>,
    pub customer: ShippingDetails,
    pub shipping_method: ShippingMethod,
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}

/// Confirmation of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub reference: Uuid,
    /// Backend order id, when the backend reports one.
    pub order_id: Option<OrderId>,
    pub summary: OrderSummary,
    pub placed_at: DateTime<Utc>,
}

fn build_request(
    cart: &CartStore,
    details: &ShippingDetails,
    email: &Email,
    method: ShippingMethod,
    summary: &OrderSummary,
) -> OrderRequest {
    let items = cart
        .items()
        .iter()
        .map(|item| OrderLine {
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.product.price,
            line_total: item.line_total(),
        })
        .collect();

    OrderRequest {
        reference: Uuid::new_v4(),
        items,
        customer: ShippingDetails {
            email: email.to_string(),
            ..details.clone()
        },
        shipping_method: method,
        subtotal: summary.subtotal,
        tax: summary.tax,
        shipping: summary.shipping,
        total: summary.total,
        placed_at: Utc::now(),
    }
}

/// Submit the cart as an order.
///
/// On success the cart is cleared and an "Order Placed Successfully!"
/// notification naming the total is published. On any failure the cart is
/// left untouched.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart, a validation error
/// for incomplete shipping details, or `CheckoutError::Api` if the backend
/// rejects the order.
#[instrument(skip_all, fields(method = method.as_str()))]
pub async fn place_order(
    client: &CatalogClient,
    cart: &mut CartStore,
    details: &ShippingDetails,
    method: ShippingMethod,
) -> Result<OrderReceipt, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let email = details.validate()?;

    let summary = OrderSummary::for_cart(cart, method);
    let request = build_request(cart, details, &email, method, &summary);
    add_breadcrumb("checkout", "submit_order", None);

    let order_id = client.submit_order(&request).await?;

    cart.clear_cart();
    cart.notifier().notify(
        "Order Placed Successfully!",
        format!("Your order totaling {} has been placed", summary.total),
    );
    info!(
        reference = %request.reference,
        order_id = ?order_id,
        total = %summary.total,
        "Order placed"
    );

    Ok(OrderReceipt {
        reference: request.reference,
        order_id,
        summary,
        placed_at: request.placed_at,
    })
}
