//! Kedai Core - Shared types library.
//!
//! This crate provides common types used across all Kedai components:
//! - `storefront` - REST client, cart store, and background cart sync
//! - `cli` - Command-line front end for browsing, cart, and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart arithmetic - no I/O, no
//! HTTP clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog entities, cart lines, and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
