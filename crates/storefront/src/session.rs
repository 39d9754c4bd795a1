//! Session credential handling.
//!
//! The bearer token lives in local storage under [`keys::TOKEN`]. Its presence
//! is what turns remote cart sync on; without it the cart is in-memory only.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument};

use kedai_core::UserId;

use crate::api::types::{SessionUser, SignupRequest};
use crate::api::{ApiClient, ApiError};
use crate::storage::{LocalStorage, StorageError, keys};

/// Loose email shape check, matching what the signup form accepts.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Errors that can occur during signup, login, or logout.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),

    /// Rejected locally before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not logged in")]
    NotLoggedIn,
}

/// Read the current bearer token, if any.
///
/// An empty stored value counts as no token.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be read.
pub async fn current_token<S: LocalStorage>(storage: &S) -> Result<Option<SecretString>, StorageError> {
    Ok(storage
        .get_item(keys::TOKEN)
        .await?
        .filter(|token| !token.is_empty())
        .map(SecretString::from))
}

/// Log in and persist the token and profile.
///
/// # Errors
///
/// Returns `SessionError::Api` if the backend rejects the credentials, or
/// `SessionError::Storage` if the session cannot be persisted.
#[instrument(skip(api, storage, password))]
pub async fn login<S: LocalStorage>(
    api: &ApiClient,
    storage: &S,
    email: &str,
    password: &str,
) -> Result<SessionUser, SessionError> {
    let response = api.login(email, password).await?;

    storage.set_item(keys::TOKEN, &response.token).await?;
    let user_json = serde_json::to_string(&response.user).map_err(StorageError::from)?;
    storage.set_item(keys::USER, &user_json).await?;

    info!(user_id = %response.user.id, "Logged in");
    Ok(response.user)
}

/// Check signup fields the way the backend expects them.
///
/// # Errors
///
/// Returns `SessionError::InvalidInput` naming the first bad field.
pub fn validate_signup(request: &SignupRequest<'_>) -> Result<(), SessionError> {
    if request.name.trim().is_empty() {
        return Err(SessionError::InvalidInput("name is required".into()));
    }
    if !EMAIL_RE.is_match(request.email) {
        return Err(SessionError::InvalidInput(format!("'{}' is not an email address", request.email)));
    }
    if request.phone_number.is_empty() || !request.phone_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionError::InvalidInput("phone number must contain digits only".into()));
    }
    if request.password.is_empty() {
        return Err(SessionError::InvalidInput("password is required".into()));
    }
    Ok(())
}

/// Register an account and remember it as pending verification.
///
/// No token is stored; the account must be verified and then logged in.
///
/// # Errors
///
/// Returns `SessionError::InvalidInput` for malformed fields,
/// `SessionError::Api` if the backend rejects the signup, or
/// `SessionError::Storage` if the pending id cannot be saved.
#[instrument(skip(api, storage, request), fields(email = request.email))]
pub async fn signup<S: LocalStorage>(
    api: &ApiClient,
    storage: &S,
    request: &SignupRequest<'_>,
) -> Result<UserId, SessionError> {
    validate_signup(request)?;

    let response = api.signup(request).await?;
    storage.set_item(keys::PENDING_USER, response.user_id.as_str()).await?;

    info!(user_id = %response.user_id, "Signed up, awaiting verification");
    Ok(response.user_id)
}

/// Confirm a pending account with the emailed code.
///
/// Returns the backend's message, if it sent one.
///
/// # Errors
///
/// Returns `SessionError::InvalidInput` for an empty code, `SessionError::Api`
/// if the backend rejects it, or `SessionError::Storage` if the pending id
/// cannot be removed.
#[instrument(skip(api, storage, code))]
pub async fn verify<S: LocalStorage>(
    api: &ApiClient,
    storage: &S,
    email: &str,
    code: &str,
) -> Result<Option<String>, SessionError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(SessionError::InvalidInput("verification code is required".into()));
    }

    let response = api.verify(email, code).await?;
    storage.remove_item(keys::PENDING_USER).await?;

    info!("Account verified");
    Ok(response.message)
}

/// Re-fetch the profile of the logged-in user and store it.
///
/// # Errors
///
/// Returns `SessionError::NotLoggedIn` without a token, `SessionError::Api`
/// if the backend rejects it, or `SessionError::Storage` on store failure.
#[instrument(skip_all)]
pub async fn refresh_user<S: LocalStorage>(api: &ApiClient, storage: &S) -> Result<SessionUser, SessionError> {
    let token = current_token(storage).await?.ok_or(SessionError::NotLoggedIn)?;
    let user = api.me(&token).await?;

    let user_json = serde_json::to_string(&user).map_err(StorageError::from)?;
    storage.set_item(keys::USER, &user_json).await?;
    Ok(user)
}

/// Read the stored user profile, if any.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be read or holds malformed JSON.
pub async fn current_user<S: LocalStorage>(storage: &S) -> Result<Option<SessionUser>, StorageError> {
    match storage.get_item(keys::USER).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Forget the session: token, profile, and the local cart mirror.
///
/// # Errors
///
/// Returns `StorageError` if any key cannot be removed.
#[instrument(skip(storage))]
pub async fn logout<S: LocalStorage>(storage: &S) -> Result<(), StorageError> {
    storage.remove_item(keys::TOKEN).await?;
    storage.remove_item(keys::USER).await?;
    storage.remove_item(keys::CART).await?;
    info!("Logged out");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_current_token() {
        let storage = MemoryStorage::new();
        assert!(current_token(&storage).await.unwrap().is_none());

        storage.set_item(keys::TOKEN, "").await.unwrap();
        assert!(current_token(&storage).await.unwrap().is_none());

        storage.set_item(keys::TOKEN, "jwt-123").await.unwrap();
        let token = current_token(&storage).await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "jwt-123");
    }

    #[tokio::test]
    async fn test_logout_clears_session_keys() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::TOKEN, "jwt-123").await.unwrap();
        storage.set_item(keys::USER, r#"{"_id":"u1"}"#).await.unwrap();
        storage.set_item(keys::CART, "[]").await.unwrap();

        logout(&storage).await.unwrap();

        assert!(storage.is_empty().await);
        assert!(current_user(&storage).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_user_parses_profile() {
        let storage = MemoryStorage::new();
        storage
            .set_item(keys::USER, r#"{"_id":"u1","name":"Sari","isProfileComplete":true}"#)
            .await
            .unwrap();

        let user = current_user(&storage).await.unwrap().unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.name.as_deref(), Some("Sari"));
        assert!(user.is_profile_complete);
    }

    fn request<'a>(name: &'a str, email: &'a str, phone_number: &'a str) -> SignupRequest<'a> {
        SignupRequest {
            name,
            email,
            phone_number,
            password: "secret",
        }
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup(&request("Sari", "sari@example.com", "08123456789")).is_ok());

        for bad in [
            request(" ", "sari@example.com", "0812"),
            request("Sari", "sari@example", "0812"),
            request("Sari", "sari example@mail.com", "0812"),
            request("Sari", "sari@example.com", "+62 812"),
            request("Sari", "sari@example.com", ""),
        ] {
            assert!(
                matches!(validate_signup(&bad), Err(SessionError::InvalidInput(_))),
                "accepted {bad:?}"
            );
        }

        let mut no_password = request("Sari", "sari@example.com", "0812");
        no_password.password = "";
        assert!(validate_signup(&no_password).is_err());
    }

    #[tokio::test]
    async fn test_verify_rejects_empty_code_before_request() {
        // Unroutable base URL: reaching the network would fail with Http
        let api = ApiClient::new(&crate::config::ApiConfig::new("http://127.0.0.1:9/api").unwrap()).unwrap();
        let storage = MemoryStorage::new();
        storage.set_item(keys::PENDING_USER, "u9").await.unwrap();

        let result = verify(&api, &storage, "sari@example.com", "  ").await;

        assert!(matches!(result, Err(SessionError::InvalidInput(_))));
        assert_eq!(storage.get_item(keys::PENDING_USER).await.unwrap().as_deref(), Some("u9"));
    }

    #[tokio::test]
    async fn test_refresh_user_requires_token() {
        let api = ApiClient::new(&crate::config::ApiConfig::new("http://127.0.0.1:9/api").unwrap()).unwrap();
        let storage = MemoryStorage::new();

        let result = refresh_user(&api, &storage).await;
        assert!(matches!(result, Err(SessionError::NotLoggedIn)));
    }
}
