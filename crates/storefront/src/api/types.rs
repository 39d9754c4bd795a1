//! Wire types for the REST backend.
//!
//! These are request and response bodies only; the domain types they carry
//! live in `kedai_core`.

use serde::{Deserialize, Serialize};

use kedai_core::{Price, ProductId, RemoteCartItem, UserId};

/// Body of the cart upsert request.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertCartRequest<'a> {
    pub items: &'a [RemoteCartItem],
}

/// One entry of the remote cart as returned by `GET /cart`.
///
/// `product` is `null` when the product was deleted after it was carted.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartEntry {
    pub product: Option<RemoteCartProduct>,
    pub quantity: u32,
}

/// Product data nested in a remote cart entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Price,
}

/// Body of the login request.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of the signup request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub password: &'a str,
}

/// Signup response. The account stays pending until its email is verified.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the email verification request.
#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

/// Generic `{ message }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Login response: a bearer token plus the user's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_profile_complete: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
