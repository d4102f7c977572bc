//! Core types for Kirana.
//!
//! This module provides the data model shared between the pure logic in this
//! crate and the client layer: catalog products, cart entries and their
//! reconciled line items, shipping addresses, and credential validation.
//! Serde attributes on these types match the store API's wire names.

pub mod address;
pub mod cart;
pub mod credential;
pub mod product;

pub use address::{AddressRecord, AddressSelection};
pub use cart::{CartEntry, CartLineItem};
pub use credential::{CredentialError, Password, RegistrationForm, Username};
pub use product::ProductRecord;
