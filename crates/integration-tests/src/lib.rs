//! Integration tests for Kedai.
//!
//! Tests drive the real storefront client against [`StubBackend`], an
//! in-process `axum` server that mimics the REST backend closely enough to
//! exercise hydration, sync, and checkout end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kedai-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use kedai_storefront::api::ApiClient;
use kedai_storefront::config::ApiConfig;

/// The only bearer token the stub accepts.
pub const TOKEN: &str = "jwt-test";

/// Password accepted for any email.
pub const PASSWORD: &str = "secret";

/// The only verification code the stub accepts.
pub const VERIFY_CODE: &str = "123456";

/// Recorded traffic and scripted behavior.
#[derive(Debug, Default)]
pub struct StubState {
    /// Stored cart as `{ product, quantity }` pairs; `None` until first upsert.
    pub cart: Option<Vec<Value>>,
    /// Every upsert body, in arrival order.
    pub upserts: Vec<Value>,
    /// Every order creation body.
    pub orders: Vec<Value>,
    /// Every signup body.
    pub signups: Vec<Value>,
    /// Emails confirmed through `POST /auth/verify`.
    pub verified: Vec<String>,
    /// Catalog requests served (cache misses on the client side).
    pub catalog_hits: usize,
    /// Answer `DELETE /cart` with 500.
    pub fail_delete: bool,
    /// Answer `POST /orders/create` with 400.
    pub fail_create: bool,
    /// Answer `GET /cart` with 500.
    pub fail_fetch: bool,
}

type Shared = Arc<Mutex<StubState>>;

/// A running stub backend.
pub struct StubBackend {
    addr: SocketAddr,
    state: Shared,
}

impl StubBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();

        let app = Router::new()
            .route("/api/categories", get(categories))
            .route("/api/products", get(products))
            .route("/api/products/featured", get(featured))
            .route("/api/products/category/{id}", get(products_in_category))
            .route("/api/auth/login", post(login))
            .route("/api/auth/signup", post(signup))
            .route("/api/auth/verify", post(verify))
            .route("/api/auth/me", get(me))
            .route("/api/cart", get(fetch_cart).post(upsert_cart).delete(delete_cart))
            .route("/api/orders/create", post(create_order))
            .route("/api/orders", get(list_orders))
            .route("/api/orders/{id}", get(get_order))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A fresh client pointed at this stub.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&self.base_url()).unwrap()).unwrap()
    }

    /// Lock the recorded state for inspection or scripting.
    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    /// Seed the remote cart directly.
    pub fn seed_cart(&self, items: &[(&str, u32)]) {
        self.state().cart = Some(
            items
                .iter()
                .map(|(product, quantity)| json!({ "product": product, "quantity": quantity }))
                .collect(),
        );
    }
}

// =============================================================================
// Catalog
// =============================================================================

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "_id": "p1", "name": "Es Teh", "price": 10000,
            "imageUrl": "es-teh.png", "category": { "_id": "c1", "name": "Drinks", "slug": "drinks" },
        }),
        json!({
            "_id": "p2", "name": "Kopi Susu", "price": 18000, "featured": true,
            "category": "c1",
        }),
        json!({
            "_id": "p3", "name": "Roti Bakar", "price": 25000, "description": "Toasted, with kaya",
            "priceRange": { "min": 25000, "max": 32000 },
            "category": { "_id": "c2", "name": "Snacks", "slug": "snacks" },
        }),
    ]
}

fn category_id(product: &Value) -> Option<&str> {
    let category = product.get("category")?;
    category
        .get("_id")
        .and_then(Value::as_str)
        .or_else(|| category.as_str())
}

fn slug_to_id(slug: &str) -> &'static str {
    match slug {
        "drinks" => "c1",
        "snacks" => "c2",
        _ => "",
    }
}

async fn categories(State(state): State<Shared>) -> Json<Value> {
    state.lock().unwrap().catalog_hits += 1;
    Json(json!([
        { "_id": "c1", "name": "Drinks", "slug": "drinks" },
        { "_id": "c2", "name": "Snacks", "slug": "snacks" },
    ]))
}

#[derive(Deserialize)]
struct ProductQuery {
    category: Option<String>,
    limit: Option<usize>,
}

async fn products(State(state): State<Shared>, Query(query): Query<ProductQuery>) -> Json<Vec<Value>> {
    state.lock().unwrap().catalog_hits += 1;

    let wanted = query.category.as_deref().map(slug_to_id);
    let products = catalog()
        .into_iter()
        .filter(|p| wanted.is_none_or(|id| category_id(p) == Some(id)))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    Json(products)
}

async fn featured(State(state): State<Shared>) -> Json<Vec<Value>> {
    state.lock().unwrap().catalog_hits += 1;
    Json(
        catalog()
            .into_iter()
            .filter(|p| p.get("featured").and_then(Value::as_bool) == Some(true))
            .collect(),
    )
}

async fn products_in_category(State(state): State<Shared>, Path(id): Path<String>) -> Json<Vec<Value>> {
    state.lock().unwrap().catalog_hits += 1;
    Json(
        catalog()
            .into_iter()
            .filter(|p| category_id(p) == Some(id.as_str()))
            .collect(),
    )
}

// =============================================================================
// Session
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad credentials" }))).into_response();
    }

    Json(json!({
        "token": TOKEN,
        "user": { "_id": "u1", "name": "Sari", "email": body.email, "isProfileComplete": true, "role": "customer" },
    }))
    .into_response()
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let taken = state.signups.iter().any(|s| s["email"] == body["email"]);
    if taken {
        return (StatusCode::CONFLICT, Json(json!({ "message": "Email already registered" }))).into_response();
    }

    let user_id = format!("u{}", state.signups.len() + 2);
    state.signups.push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "userId": user_id, "message": "Verification code sent" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct VerifyBody {
    email: String,
    code: String,
}

async fn verify(State(state): State<Shared>, Json(body): Json<VerifyBody>) -> Response {
    if body.code != VERIFY_CODE {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid code" }))).into_response();
    }

    state.lock().unwrap().verified.push(body.email);
    Json(json!({ "message": "Email verified" })).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "_id": "u1", "name": "Sari Dewi", "email": "sari@example.com",
        "phoneNumber": "08123456789", "isProfileComplete": true, "role": "customer",
    }))
    .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

// =============================================================================
// Cart
// =============================================================================

async fn fetch_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let state = state.lock().unwrap();
    if state.fail_fetch {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database offline").into_response();
    }
    let Some(cart) = &state.cart else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Cart not found" }))).into_response();
    };

    let catalog = catalog();
    let entries: Vec<Value> = cart
        .iter()
        .map(|item| {
            let id = item.get("product").and_then(Value::as_str).unwrap_or_default();
            let product = catalog
                .iter()
                .find(|p| p.get("_id").and_then(Value::as_str) == Some(id))
                .map_or(Value::Null, |p| {
                    json!({ "_id": p["_id"], "name": p["name"], "price": p["price"], "image": p.get("imageUrl") })
                });
            json!({ "product": product, "quantity": item["quantity"] })
        })
        .collect();

    Json(entries).into_response()
}

async fn upsert_cart(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut state = state.lock().unwrap();
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    state.cart = Some(items);
    state.upserts.push(body);

    Json(json!({ "message": "Cart updated" })).into_response()
}

async fn delete_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut state = state.lock().unwrap();
    if state.fail_delete {
        return (StatusCode::INTERNAL_SERVER_ERROR, "delete failed").into_response();
    }
    if state.cart.take().is_none() {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Cart not found" }))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Orders
// =============================================================================

fn order_document(index: usize, body: &Value) -> Value {
    json!({
        "_id": format!("o{}", index + 1),
        "status": "Pending",
        "deliveryMethod": "pickup",
        "totalAmount": body["totalAmount"],
        "items": body["items"],
        "storeInfo": body["storeInfo"],
    })
}

async fn create_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut state = state.lock().unwrap();
    if state.fail_create {
        return (StatusCode::BAD_REQUEST, "store closed").into_response();
    }

    let order = order_document(state.orders.len(), &body);
    state.orders.push(body);
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let state = state.lock().unwrap();
    let orders: Vec<Value> = state
        .orders
        .iter()
        .enumerate()
        .map(|(i, body)| order_document(i, body))
        .collect();
    Json(orders).into_response()
}

async fn get_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let state = state.lock().unwrap();
    state
        .orders
        .iter()
        .enumerate()
        .map(|(i, body)| order_document(i, body))
        .find(|order| order["_id"] == id.as_str())
        .map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            |order| Json(order).into_response(),
        )
}
