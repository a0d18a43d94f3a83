//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. Nothing in the stores or
//! the catalog pipeline is fatal; `AppError` only carries failures that a
//! caller decided to surface (a page that could not load, a rejected checkout).

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the failure is on our side (or the backend's) rather than the
    /// shopper's input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Api(err) => !err.is_not_found(),
            Self::Storage(_) | Self::Config(_) => true,
            Self::Checkout(err) => matches!(err, CheckoutError::Api(_)),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error and capture internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error. Without an initialized Sentry client this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be a number");
    }

    #[test]
    fn test_internal_classification() {
        assert!(!AppError::NotFound("x".to_string()).is_internal());
        assert!(!AppError::Checkout(CheckoutError::EmptyCart).is_internal());
        assert!(!AppError::Api(ApiError::NotFound("p1".to_string())).is_internal());
        assert!(
            AppError::Api(ApiError::Status {
                status: 502,
                body: String::new()
            })
            .is_internal()
        );
        assert!(AppError::Storage(StorageError::Poisoned).is_internal());
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("cart", "Cleared cart", None);
        add_breadcrumb("favorites", "Toggled", Some(&[("product_id", "p1")]));
    }
}
