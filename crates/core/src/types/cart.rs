//! Cart line items and their remote representation.

use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;
use super::price::Price;

/// One row in the cart: a product plus a quantity plus optional notes.
///
/// Identity is the product id. The cart keeps at most one line per id and
/// every stored line has `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CartLineItem {
    /// Create a line with a quantity of one and no notes.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            quantity: 1,
            notes: None,
        }
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }

    /// The identity-plus-quantity shape the remote cart accepts.
    #[must_use]
    pub fn to_remote(&self) -> RemoteCartItem {
        RemoteCartItem {
            product: self.id.clone(),
            quantity: self.quantity,
        }
    }
}

impl From<&Product> for CartLineItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image_url.clone(),
            quantity: 1,
            notes: None,
        }
    }
}

/// A cart line as sent to the remote upsert endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub product: ProductId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLineItem::new("p1", "Tea", Price::from_rupiah(10_000)).with_quantity(3);
        assert_eq!(line.line_total(), Price::from_rupiah(30_000));
    }

    #[test]
    fn test_remote_shape_drops_client_fields() {
        let mut line = CartLineItem::new("p1", "Tea", Price::from_rupiah(10_000)).with_quantity(2);
        line.notes = Some("less sugar".to_string());

        let json = serde_json::to_value(line.to_remote()).unwrap();
        assert_eq!(json, serde_json::json!({"product": "p1", "quantity": 2}));
    }

    #[test]
    fn test_local_shape_uses_underscore_id() {
        let line = CartLineItem::new("p1", "Tea", Price::from_rupiah(10_000)).with_image("tea.png");

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["_id"], "p1");
        assert_eq!(json["image"], "tea.png");
        assert_eq!(json["quantity"], 1);
        assert!(json.get("notes").is_none());
    }
}
