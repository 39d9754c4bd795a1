//! Cache types for catalog responses.

use kedai_core::{Category, CategoryId, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Products { category_id: Option<CategoryId> },
    ProductsBySlug { slug: Option<String>, limit: Option<u32> },
    FeaturedProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
}
