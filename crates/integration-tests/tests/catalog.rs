//! Catalog reads and caching against the stub backend.

#![allow(clippy::unwrap_used)]

use kedai_core::{CategoryId, Price};
use kedai_integration_tests::StubBackend;

#[tokio::test]
async fn test_categories_are_cached() {
    let stub = StubBackend::spawn().await;
    let api = stub.client();

    let first = api.categories().await.unwrap();
    let second = api.categories().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(stub.state().catalog_hits, 1);

    api.invalidate_catalog();
    api.categories().await.unwrap();
    assert_eq!(stub.state().catalog_hits, 2);
}

#[tokio::test]
async fn test_products_parse_both_category_shapes() {
    let stub = StubBackend::spawn().await;

    let products = stub.client().products(None).await.unwrap();

    assert_eq!(products.len(), 3);
    let ids: Vec<&str> = products
        .iter()
        .map(|p| p.category.as_ref().unwrap().id().as_str())
        .collect();
    assert_eq!(ids, vec!["c1", "c1", "c2"]);

    let toast = products.get(2).unwrap();
    assert_eq!(toast.description, "Toasted, with kaya");
    assert_eq!(toast.price_range.as_ref().unwrap().max, Price::from_rupiah(32_000));
}

#[tokio::test]
async fn test_filters_are_cached_separately() {
    let stub = StubBackend::spawn().await;
    let api = stub.client();

    let drinks = api.products_by_category(Some("drinks"), None).await.unwrap();
    let one_drink = api.products_by_category(Some("drinks"), Some(1)).await.unwrap();
    let snacks = api.products(Some(&CategoryId::new("c2"))).await.unwrap();
    let featured = api.featured_products().await.unwrap();

    assert_eq!(drinks.len(), 2);
    assert_eq!(one_drink.len(), 1);
    assert_eq!(snacks.first().unwrap().name, "Roti Bakar");
    assert_eq!(featured.len(), 1);
    assert!(featured.first().unwrap().featured);
    assert_eq!(stub.state().catalog_hits, 4);

    api.products_by_category(Some("drinks"), Some(1)).await.unwrap();
    assert_eq!(stub.state().catalog_hits, 4);
}
