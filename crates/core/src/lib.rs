//! Shopfront Core - Shared types library.
//!
//! This crate provides the types and pure logic shared by every Shopfront
//! component:
//! - `storefront` - Cart and favorites stores, persistence, the REST catalog client
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, products and stock status
//! - [`catalog`] - The product filter/sort pipeline

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::{FilterOptions, SortKey, filter_products};
pub use types::*;
