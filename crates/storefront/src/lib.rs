//! Kedai storefront client library.
//!
//! The customer-side half of the storefront: a REST client for the backend,
//! the session cart with best-effort persistence, and checkout.
//!
//! # Modules
//!
//! - [`api`] - Backend client and the [`api::CartBackend`] seam
//! - [`cart`] - [`cart::CartStore`] and its background sync worker
//! - [`checkout`] - Order placement
//! - [`config`] - Environment-driven configuration
//! - [`session`] - Bearer token login/logout
//! - [`state`] - Shared client state
//! - [`storage`] - Key/value persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod state;
pub mod storage;
