//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, bearer-token auth on user-scoped endpoints
//! - The backend is the source of truth for the cart whenever a session
//!   token exists; see [`crate::cart`] for the local side
//! - In-memory caching via `moka` for catalog responses
//!
//! # Endpoints
//!
//! ## Catalog (public, cached)
//! - `GET /categories`
//! - `GET /products`, `GET /products/category/{id}`, `GET /products?category=&limit=`
//! - `GET /products/featured`
//!
//! ## Session
//! - `POST /auth/signup`, `POST /auth/verify`, `POST /auth/login`
//! - `GET /auth/me` (bearer token)
//!
//! ## Cart (bearer token)
//! - `GET /cart` - 404 means the user has no cart yet
//! - `POST /cart` - upsert the full item list
//! - `DELETE /cart`
//!
//! ## Orders (bearer token)
//! - `POST /orders/create`, `GET /orders`, `GET /orders/{id}`

mod cache;
mod conversions;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use kedai_core::{
    CartLineItem, Category, CategoryId, Order, OrderDraft, OrderId, Product, RemoteCartItem,
};

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
use conversions::convert_remote_cart;
use types::{
    LoginRequest, LoginResponse, MessageResponse, RemoteCartEntry, SessionUser, SignupRequest,
    SignupResponse, UpsertCartRequest, VerifyRequest,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
}

/// The cart-facing subset of the backend.
///
/// [`ApiClient`] is the production implementation; the cart store and the
/// sync worker only depend on this trait.
pub trait CartBackend: Send + Sync {
    /// Fetch the authoritative cart, flattened into local line items.
    ///
    /// A missing remote cart resolves to an empty list.
    fn fetch_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartLineItem>, ApiError>> + Send;

    /// Create or overwrite the remote cart with `items`.
    fn upsert_cart(
        &self,
        token: &SecretString,
        items: &[RemoteCartItem],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete the remote cart.
    fn delete_cart(&self, token: &SecretString) -> impl Future<Output = Result<(), ApiError>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheaply cloneable. Catalog reads are cached for the configured TTL.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and map non-success statuses to [`ApiError`].
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(response.url().path().to_string())),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                Err(ApiError::RateLimited(retry_after))
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                tracing::error!(
                    status = %status,
                    body = %message.chars().take(500).collect::<String>(),
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: message.chars().take(200).collect(),
                })
            }
        }
    }

    /// Send a request and decode its JSON body.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;

        // Read as text first for better error diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn cached_products(
        &self,
        key: CacheKey,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.execute_json(request).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint("categories")?;
        let categories: Vec<Category> = self.execute_json(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List products, optionally restricted to one category id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, category_id: Option<&CategoryId>) -> Result<Vec<Product>, ApiError> {
        let url = match category_id {
            Some(id) => self.endpoint(&format!("products/category/{id}"))?,
            None => self.endpoint("products")?,
        };

        let key = CacheKey::Products {
            category_id: category_id.cloned(),
        };
        self.cached_products(key, self.inner.client.get(url)).await
    }

    /// List products filtered by category slug, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        slug: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("products")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(slug) = slug {
                query.append_pair("category", slug);
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        // Avoid a dangling `?` when neither filter is set
        if url.query() == Some("") {
            url.set_query(None);
        }

        let key = CacheKey::ProductsBySlug {
            slug: slug.map(str::to_string),
            limit,
        };
        self.cached_products(key, self.inner.client.get(url)).await
    }

    /// List featured products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products/featured")?;
        self.cached_products(CacheKey::FeaturedProducts, self.inner.client.get(url))
            .await
    }

    /// Drop all cached catalog responses.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Session Methods
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or another error
    /// if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        let request = self
            .inner
            .client
            .post(url)
            .json(&LoginRequest { email, password });
        self.execute_json(request).await
    }

    /// Register a new account. The account must be verified before login.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration or the request
    /// fails.
    #[instrument(skip(self, request), fields(email = request.email))]
    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<SignupResponse, ApiError> {
        let url = self.endpoint("auth/signup")?;
        self.execute_json(self.inner.client.post(url).json(request)).await
    }

    /// Confirm an account with the code sent to `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the request fails.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, email: &str, code: &str) -> Result<MessageResponse, ApiError> {
        let url = self.endpoint("auth/verify")?;
        let request = self.inner.client.post(url).json(&VerifyRequest { email, code });
        let response = self.execute(request).await?;

        // Some deployments answer with an empty body
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the profile behind `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected, or another
    /// error if the request fails.
    #[instrument(skip_all)]
    pub async fn me(&self, token: &SecretString) -> Result<SessionUser, ApiError> {
        let url = self.endpoint("auth/me")?;
        let request = self.inner.client.get(url).bearer_auth(token.expose_secret());
        self.execute_json(request).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip_all, fields(lines = draft.items.len()))]
    pub async fn create_order(&self, token: &SecretString, draft: &OrderDraft) -> Result<Order, ApiError> {
        let url = self.endpoint("orders/create")?;
        let request = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(draft);
        self.execute_json(request).await
    }

    /// List the user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("orders")?;
        let request = self.inner.client.get(url).bearer_auth(token.expose_secret());
        self.execute_json(request).await
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no such order exists, or another error
    /// if the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn order(&self, token: &SecretString, order_id: &OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("orders/{order_id}"))?;
        let request = self.inner.client.get(url).bearer_auth(token.expose_secret());
        self.execute_json(request).await
    }
}

// =============================================================================
// Cart Methods
// =============================================================================

impl CartBackend for ApiClient {
    #[instrument(skip_all)]
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLineItem>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self.inner.client.get(url).bearer_auth(token.expose_secret());

        match self.execute_json::<Vec<RemoteCartEntry>>(request).await {
            Ok(entries) => Ok(convert_remote_cart(entries)),
            Err(ApiError::NotFound(_)) => {
                debug!("No remote cart yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all, fields(lines = items.len()))]
    async fn upsert_cart(&self, token: &SecretString, items: &[RemoteCartItem]) -> Result<(), ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&UpsertCartRequest { items });
        self.execute(request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn delete_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        let url = self.endpoint("cart")?;
        let request = self.inner.client.delete(url).bearer_auth(token.expose_secret());
        self.execute(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("/cart".to_string());
        assert_eq!(err.to_string(), "Not found: /cart");

        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");

        assert_eq!(
            ApiError::RateLimited(30).to_string(),
            "Rate limited, retry after 30 seconds"
        );
    }

    #[tokio::test]
    async fn test_endpoints_join_under_base_path() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.endpoint("cart").unwrap().as_str(),
            "http://localhost:5000/api/cart"
        );
        assert_eq!(
            api.endpoint("products/category/c1").unwrap().as_str(),
            "http://localhost:5000/api/products/category/c1"
        );
    }
}
