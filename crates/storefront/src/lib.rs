//! Shopfront storefront library.
//!
//! Client-side state and services for a storefront backed by a remote
//! commerce REST API:
//!
//! - [`cart`] and [`favorites`] - Stores with local persistence and change events
//! - [`api`] - Cached REST client for products, stock, reviews, categories and orders
//! - [`cards`] - Cancellable per-card loading, product detail and catalog state
//! - [`checkout`] - Order summary and placement
//! - [`config`], [`error`], [`storage`], [`events`] - Ambient plumbing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cards;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod favorites;
pub mod storage;

pub use api::{ApiError, CatalogClient};
pub use cart::{CartCommand, CartStore};
pub use config::StorefrontConfig;
pub use error::{AppError, Result};
pub use events::{Notification, Notifier, StoreEvent};
pub use favorites::FavoritesStore;
