//! Kirana Core - Domain types and pure storefront logic.
//!
//! This crate provides the types and decision logic shared by all Kirana
//! components:
//! - `client` - Async client for the store API (cart, checkout, addresses)
//! - `cli` - Terminal storefront built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. Cart reconciliation and checkout validation are plain
//! functions over plain data, so they can be tested without any backend.
//!
//! # Modules
//!
//! - [`types`] - Products, cart entries, addresses, credential validation
//! - [`reconcile`] - Join of minimal cart entries against a catalog snapshot
//! - [`checkout`] - Ordered gating checks for placing an order

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod reconcile;
pub mod types;

pub use checkout::{CheckoutBlocker, validate};
pub use reconcile::{reconcile, total_value};
pub use types::*;
