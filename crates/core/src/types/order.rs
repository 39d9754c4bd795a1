//! Orders: the checkout payload and the backend's order document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLineItem;
use super::catalog::StoreInfo;
use super::id::{OrderId, ProductId};
use super::price::Price;
use super::status::OrderStatus;

/// One ordered product with the customer's free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
}

/// Body of an order creation request, built from a cart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub store_info: StoreInfo,
    pub payment_method: String,
    pub total_amount: Price,
    pub order_date: DateTime<Utc>,
}

impl OrderDraft {
    /// Build an order from the cart's current lines.
    ///
    /// The total is the cart subtotal; lines without notes send an empty
    /// string.
    #[must_use]
    pub fn from_cart(
        items: &[CartLineItem],
        store_info: StoreInfo,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            items: items
                .iter()
                .map(|line| OrderLine {
                    product: line.id.clone(),
                    quantity: line.quantity,
                    notes: line.notes.clone().unwrap_or_default(),
                })
                .collect(),
            store_info,
            payment_method: payment_method.into(),
            total_amount: items.iter().map(CartLineItem::line_total).sum(),
            order_date: Utc::now(),
        }
    }
}

/// An order as returned by the backend.
///
/// Only the fields the client acts on are typed; everything else is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Price>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
