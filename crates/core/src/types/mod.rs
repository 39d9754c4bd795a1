//! Core types for Kedai.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use cart::{CartLineItem, RemoteCartItem};
pub use catalog::{Category, CategoryRef, OpeningHours, PriceRange, Product, StoreInfo};
pub use id::*;
pub use order::{Order, OrderDraft, OrderLine};
pub use price::Price;
pub use status::OrderStatus;
