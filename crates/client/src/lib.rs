//! Kirana Client - async client layer for the Kirana store API.
//!
//! This crate wires the pure logic from `kirana-core` to the outside world:
//! the HTTP store API, the persisted session, and the user-facing message
//! sink. Every collaborator is a trait, so all flows can run against
//! in-memory doubles in tests and against [`api::HttpStoreClient`] plus
//! [`session::FileSessionStore`] in production.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven client configuration
//! - [`api`] - Store API traits, wire types, and the reqwest implementation
//! - [`session`] - Whole-value persisted session (token, username, balance)
//! - [`notice`] - User-facing message sink with severities
//! - [`cart`] - Cart mutation gateway (duplicate policy, authoritative cache)
//! - [`addresses`] - Address book with id-keyed selection
//! - [`checkout`] - Checkout flow state machine
//! - [`search`] - Debounced live catalog search
//! - [`auth`] - Register, login, and logout flows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod notice;
pub mod search;
pub mod session;
