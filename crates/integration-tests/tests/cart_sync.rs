//! Background cart sync against the stub backend.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use secrecy::SecretString;

use kedai_core::{CartLineItem, Price};
use kedai_integration_tests::{StubBackend, TOKEN};
use kedai_storefront::cart::{CartStore, discard_remote_cart, spawn_sync_worker};
use kedai_storefront::storage::{FileStorage, LocalStorage, MemoryStorage, keys};

fn tea() -> CartLineItem {
    CartLineItem::new("p1", "Es Teh", Price::from_rupiah(10_000))
}

fn coffee() -> CartLineItem {
    CartLineItem::new("p2", "Kopi Susu", Price::from_rupiah(18_000))
}

async fn logged_in() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.set_item(keys::TOKEN, TOKEN).await.unwrap();
    storage
}

#[tokio::test]
async fn test_mutations_reach_backend_in_order() {
    let stub = StubBackend::spawn().await;
    let storage = logged_in().await;

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(tea());
    cart.add_to_cart(tea());
    cart.add_to_cart(coffee());
    cart.update_quantity("p2", 4);
    drop(cart);
    worker.await.unwrap();

    let state = stub.state();
    assert_eq!(state.upserts.len(), 4);
    assert_eq!(
        state.upserts.last().unwrap(),
        &json!({ "items": [
            { "product": "p1", "quantity": 2 },
            { "product": "p2", "quantity": 4 },
        ]})
    );
}

#[tokio::test]
async fn test_upsert_body_carries_only_product_and_quantity() {
    let stub = StubBackend::spawn().await;
    let storage = logged_in().await;

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(tea().with_image("es-teh.png"));
    cart.set_notes("p1", Some("less ice".to_string()));
    drop(cart);
    worker.await.unwrap();

    let state = stub.state();
    let body = state.upserts.last().unwrap();
    assert_eq!(body, &json!({ "items": [{ "product": "p1", "quantity": 1 }] }));

    // Notes survive locally
    let stored: Vec<CartLineItem> =
        serde_json::from_str(&storage.get_item(keys::CART).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.first().unwrap().notes.as_deref(), Some("less ice"));
}

#[tokio::test]
async fn test_clearing_keeps_remote_cart() {
    let stub = StubBackend::spawn().await;
    let storage = logged_in().await;

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(tea());
    cart.add_to_cart(coffee());
    cart.update_quantity("p2", 3);
    cart.clear_cart();
    drop(cart);
    worker.await.unwrap();

    assert_eq!(storage.get_item(keys::CART).await.unwrap().as_deref(), Some("[]"));

    let state = stub.state();
    assert_eq!(state.upserts.len(), 3);
    assert!(state.cart.as_ref().is_some_and(|items| items.len() == 2));
}

#[tokio::test]
async fn test_no_session_stays_in_memory() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(tea());
    drop(cart);
    worker.await.unwrap();

    assert!(storage.is_empty().await);
    assert!(stub.state().upserts.is_empty());
}

#[tokio::test]
async fn test_backend_errors_do_not_touch_cart() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    storage.set_item(keys::TOKEN, "expired").await.unwrap();

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(tea());
    cart.add_to_cart(tea());

    assert_eq!(cart.line("p1").unwrap().quantity, 2);
    drop(cart);
    worker.await.unwrap();

    assert!(stub.state().upserts.is_empty());
    // The local mirror is written before the rejected upsert
    assert!(storage.get_item(keys::CART).await.unwrap().is_some());
}

#[tokio::test]
async fn test_file_storage_mirror() {
    let stub = StubBackend::spawn().await;
    let dir = std::env::temp_dir().join(format!("kedai-it-{}", uuid::Uuid::new_v4()));
    let storage = FileStorage::new(&dir);
    storage.set_item(keys::TOKEN, TOKEN).await.unwrap();

    let (sync, worker) = spawn_sync_worker(storage.clone(), stub.client());
    let mut cart = CartStore::new(sync);
    cart.add_to_cart(coffee());
    drop(cart);
    worker.await.unwrap();

    let stored: Vec<CartLineItem> =
        serde_json::from_str(&storage.get_item(keys::CART).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored, vec![coffee()]);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_explicit_clear_survives_next_hydration() {
    let stub = StubBackend::spawn().await;
    stub.seed_cart(&[("p1", 2)]);
    let storage = logged_in().await;
    let api = stub.client();
    let token = SecretString::from(TOKEN);

    let (sync, worker) = spawn_sync_worker(storage.clone(), api.clone());
    let mut cart = CartStore::new(sync);
    cart.hydrate(&api, &token).await.unwrap();
    assert_eq!(cart.len(), 1);

    cart.clear_cart();
    cart.scheduler().flush().await;
    discard_remote_cart(&api, &token).await.unwrap();
    drop(cart);
    worker.await.unwrap();

    let mut next = CartStore::new(());
    assert_eq!(next.hydrate(&api, &token).await.unwrap(), 0);
    assert!(next.is_empty());

    // Discarding a cart that is already gone is not an error
    discard_remote_cart(&api, &token).await.unwrap();
}

#[tokio::test]
async fn test_clear_without_discard_is_restored() {
    let stub = StubBackend::spawn().await;
    stub.seed_cart(&[("p1", 2)]);
    let storage = logged_in().await;
    let api = stub.client();
    let token = SecretString::from(TOKEN);

    let (sync, worker) = spawn_sync_worker(storage.clone(), api.clone());
    let mut cart = CartStore::new(sync);
    cart.hydrate(&api, &token).await.unwrap();
    cart.clear_cart();
    drop(cart);
    worker.await.unwrap();

    let mut next = CartStore::new(());
    assert_eq!(next.hydrate(&api, &token).await.unwrap(), 1);
}

#[tokio::test]
async fn test_quantity_zero_then_discard_survives_next_hydration() {
    let stub = StubBackend::spawn().await;
    stub.seed_cart(&[("p1", 2), ("p2", 1)]);
    let storage = logged_in().await;
    let api = stub.client();
    let token = SecretString::from(TOKEN);

    let (sync, worker) = spawn_sync_worker(storage.clone(), api.clone());
    let mut cart = CartStore::new(sync);
    cart.hydrate(&api, &token).await.unwrap();

    // The first removal still leaves a line, so it is pushed as an upsert
    cart.update_quantity("p1", 0);
    cart.update_quantity("p2", 0);
    assert!(cart.is_empty());
    cart.scheduler().flush().await;
    discard_remote_cart(&api, &token).await.unwrap();
    drop(cart);
    worker.await.unwrap();

    assert!(stub.state().cart.is_none());
    let mut next = CartStore::new(());
    assert_eq!(next.hydrate(&api, &token).await.unwrap(), 0);
    assert_eq!(storage.get_item(keys::CART).await.unwrap().as_deref(), Some("[]"));
}
