//! Catalog entities served by the backend.
//!
//! These mirror the backend's JSON documents (`_id` keys, camelCase fields)
//! and are read-only from the cart's point of view.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A product's category, either populated or left as a bare reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// The backend populated the category document.
    Embedded(Category),
    /// Only the category id was sent.
    Id(CategoryId),
}

impl CategoryRef {
    /// The referenced category id.
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Embedded(category) => &category.id,
            Self::Id(id) => id,
        }
    }
}

/// Price range for products sold in several sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub featured: bool,
}

/// Store opening hours, as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
}

/// The pickup store an order is placed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
}

impl StoreInfo {
    /// Create store info with just a name and address.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: None,
            image_url: None,
            latitude: None,
            longitude: None,
            opening_hours: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_with_embedded_category() {
        let json = r#"{
            "_id": "p1",
            "name": "Teh Tarik",
            "description": "Pulled milk tea",
            "price": 10000,
            "imageUrl": "https://cdn.example.com/teh.png",
            "category": {"_id": "c1", "name": "Drinks", "slug": "drinks"},
            "featured": true
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::from_rupiah(10_000));
        assert!(product.featured);
        assert_eq!(product.category.unwrap().id().as_str(), "c1");
    }

    #[test]
    fn test_product_with_category_id_and_defaults() {
        let json = r#"{"_id": "p2", "name": "Kopi", "price": 8000, "category": "c9"}"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, Some(CategoryRef::Id(CategoryId::new("c9"))));
        assert!(product.description.is_empty());
        assert!(!product.featured);
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_store_info_serializes_camel_case() {
        let mut store = StoreInfo::new("Kedai Pusat", "Jl. Merdeka 1");
        store.opening_hours = Some(OpeningHours {
            open: "08:00".to_string(),
            close: "22:00".to_string(),
        });

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["openingHours"]["open"], "08:00");
        assert!(json.get("phone").is_none());
    }
}
