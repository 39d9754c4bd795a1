//! Login and logout against the stub backend.

#![allow(clippy::unwrap_used)]

use secrecy::ExposeSecret;

use kedai_integration_tests::{PASSWORD, StubBackend, TOKEN, VERIFY_CODE};
use kedai_storefront::api::ApiError;
use kedai_storefront::api::types::SignupRequest;
use kedai_storefront::session::{self, SessionError};
use kedai_storefront::storage::{LocalStorage, MemoryStorage, keys};

#[tokio::test]
async fn test_login_persists_token_and_user() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();

    let user = session::login(&stub.client(), &storage, "sari@example.com", PASSWORD)
        .await
        .unwrap();

    assert_eq!(user.id.as_str(), "u1");
    assert_eq!(user.email.as_deref(), Some("sari@example.com"));
    assert!(user.extra.contains_key("role"));

    let token = session::current_token(&storage).await.unwrap().unwrap();
    assert_eq!(token.expose_secret(), TOKEN);
    assert_eq!(session::current_user(&storage).await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_bad_password_stores_nothing() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();

    let err = session::login(&stub.client(), &storage, "sari@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ApiError::Unauthorized)));
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_logout_forgets_everything() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    session::login(&stub.client(), &storage, "sari@example.com", PASSWORD)
        .await
        .unwrap();
    storage.set_item(keys::CART, "[]").await.unwrap();

    session::logout(&storage).await.unwrap();

    assert!(session::current_token(&storage).await.unwrap().is_none());
    assert!(storage.is_empty().await);
}

fn signup_request(email: &str) -> SignupRequest<'_> {
    SignupRequest {
        name: "Budi",
        email,
        phone_number: "08129876543",
        password: PASSWORD,
    }
}

#[tokio::test]
async fn test_signup_then_verify() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();

    let user_id = session::signup(&stub.client(), &storage, &signup_request("budi@example.com"))
        .await
        .unwrap();

    assert_eq!(
        storage.get_item(keys::PENDING_USER).await.unwrap().as_deref(),
        Some(user_id.as_str())
    );
    assert!(session::current_token(&storage).await.unwrap().is_none());
    assert_eq!(stub.state().signups[0]["phoneNumber"], "08129876543");

    let message = session::verify(&stub.client(), &storage, "budi@example.com", VERIFY_CODE)
        .await
        .unwrap();

    assert_eq!(message.as_deref(), Some("Email verified"));
    assert!(storage.is_empty().await);
    assert_eq!(stub.state().verified, ["budi@example.com"]);
}

#[tokio::test]
async fn test_invalid_signup_sends_nothing() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();

    let err = session::signup(&stub.client(), &storage, &signup_request("not-an-email"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::InvalidInput(_)));
    assert!(stub.state().signups.is_empty());
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    session::signup(&stub.client(), &storage, &signup_request("budi@example.com"))
        .await
        .unwrap();

    let err = session::signup(&stub.client(), &storage, &signup_request("budi@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ApiError::Status { status: 409, .. })));
}

#[tokio::test]
async fn test_wrong_code_keeps_pending_user() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    session::signup(&stub.client(), &storage, &signup_request("budi@example.com"))
        .await
        .unwrap();

    let err = session::verify(&stub.client(), &storage, "budi@example.com", "000000")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ApiError::Status { status: 400, .. })));
    assert!(storage.get_item(keys::PENDING_USER).await.unwrap().is_some());
    assert!(stub.state().verified.is_empty());
}

#[tokio::test]
async fn test_refresh_user_replaces_stored_profile() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    session::login(&stub.client(), &storage, "sari@example.com", PASSWORD)
        .await
        .unwrap();

    let user = session::refresh_user(&stub.client(), &storage).await.unwrap();

    assert_eq!(user.name.as_deref(), Some("Sari Dewi"));
    assert_eq!(session::current_user(&storage).await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_refresh_user_with_rejected_token() {
    let stub = StubBackend::spawn().await;
    let storage = MemoryStorage::new();
    storage.set_item(keys::TOKEN, "expired").await.unwrap();

    let err = session::refresh_user(&stub.client(), &storage).await.unwrap_err();

    assert!(matches!(err, SessionError::Api(ApiError::Unauthorized)));
    assert!(session::current_user(&storage).await.unwrap().is_none());
}
