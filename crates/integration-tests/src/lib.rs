//! Integration test support for shopcart.
//!
//! [`MockCartApi`] serves the cart REST API from memory on a random local
//! port, so the real [`HttpCartService`] and [`CartStore`] can be driven end
//! to end without a storefront backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```
//!
//! # Behavior
//!
//! - Requests without `Authorization: Bearer test-token` get a 401.
//! - Adding or updating beyond stock gets a 400 with a `message`.
//! - Unknown line ids get a 404 with a `message`.
//! - Adding a variant already in the cart merges into the existing line.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopcart_client::{CartStore, ClientConfig, HttpCartService};

/// Token the mock API accepts.
pub const TEST_TOKEN: &str = "test-token";

pub const OUT_OF_STOCK: &str = "Vượt quá số lượng tồn kho";
pub const LINE_NOT_FOUND: &str = "Không tìm thấy sản phẩm trong giỏ hàng";
pub const VARIANT_NOT_FOUND: &str = "Không tìm thấy sản phẩm";

/// A purchasable variant in the mock catalog.
#[derive(Debug, Clone)]
pub struct Variant {
    pub product_id: i64,
    pub name: &'static str,
    pub color: &'static str,
    pub price: i64,
    pub stock: u32,
}

/// Catalog every mock API starts with, keyed by variant id.
#[must_use]
pub fn default_catalog() -> BTreeMap<i64, Variant> {
    BTreeMap::from([
        (
            11,
            Variant {
                product_id: 1,
                name: "Áo thun cotton",
                color: "Trắng",
                price: 150_000,
                stock: 20,
            },
        ),
        (
            12,
            Variant {
                product_id: 1,
                name: "Áo thun cotton",
                color: "Đen",
                price: 150_000,
                stock: 3,
            },
        ),
        (
            21,
            Variant {
                product_id: 2,
                name: "Quần jean",
                color: "Xanh",
                price: 450_000,
                stock: 10,
            },
        ),
    ])
}

#[derive(Debug, Clone)]
struct Line {
    id: i64,
    variant_id: i64,
    quantity: u32,
}

#[derive(Debug)]
struct Backend {
    catalog: BTreeMap<i64, Variant>,
    lines: Vec<Line>,
    next_line_id: i64,
    requests: usize,
}

impl Backend {
    fn cart_json(&self) -> Value {
        let mut total = 0i64;
        let items: Vec<Value> = self
            .lines
            .iter()
            .filter_map(|line| {
                let variant = self.catalog.get(&line.variant_id)?;
                let sub_total = variant.price * i64::from(line.quantity);
                total += sub_total;
                Some(json!({
                    "id": line.id,
                    "productId": variant.product_id,
                    "productName": variant.name,
                    "productImage": null,
                    "variantAttributes": { "Màu": variant.color },
                    "sku": format!("SKU-{}", line.variant_id),
                    "unitPrice": variant.price,
                    "quantity": line.quantity,
                    "stockAvailable": variant.stock,
                    "subTotal": sub_total,
                }))
            })
            .collect();

        json!({ "items": items, "totalAmount": total })
    }

    fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(backend: &Shared) -> MutexGuard<'_, Backend> {
    backend.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process cart API bound to `127.0.0.1` on a random port.
///
/// The server task is aborted when this value is dropped.
pub struct MockCartApi {
    base_url: String,
    backend: Shared,
    server: JoinHandle<()>,
}

impl MockCartApi {
    /// Start the mock API with [`default_catalog`] and an empty cart.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let backend: Shared = Arc::new(Mutex::new(Backend {
            catalog: default_catalog(),
            lines: Vec::new(),
            next_line_id: 1,
            requests: 0,
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&backend));

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}/api"),
            backend,
            server,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests that reached the API, including rejected ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.backend).requests
    }

    /// Current lines as `(line id, variant id, quantity)`.
    #[must_use]
    pub fn lines(&self) -> Vec<(i64, i64, u32)> {
        lock(&self.backend)
            .lines
            .iter()
            .map(|line| (line.id, line.variant_id, line.quantity))
            .collect()
    }

    /// Put a line in the cart directly, bypassing the API.
    pub fn seed_line(&self, variant_id: i64, quantity: u32) -> i64 {
        let mut backend = lock(&self.backend);
        let id = backend.next_line_id;
        backend.next_line_id += 1;
        backend.lines.push(Line {
            id,
            variant_id,
            quantity,
        });
        id
    }

    /// Configuration for a signed-in shopper.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is rejected.
    pub fn config(&self) -> Result<ClientConfig, shopcart_client::ConfigError> {
        Ok(ClientConfig::new(&self.base_url)?.with_token(TEST_TOKEN))
    }

    /// A store for a signed-in shopper.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be configured.
    pub fn store(&self) -> Result<CartStore<HttpCartService>, Box<dyn std::error::Error>> {
        Ok(CartStore::new(HttpCartService::new(&self.config()?)?))
    }

    /// A store with no token, as for a signed-out visitor.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be configured.
    pub fn anonymous_store(&self) -> Result<CartStore<HttpCartService>, Box<dyn std::error::Error>> {
        let config = ClientConfig::new(&self.base_url)?;
        Ok(CartStore::new(HttpCartService::new(&config)?))
    }
}

impl Drop for MockCartApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(backend: Shared) -> Router {
    Router::new()
        .route("/api/cart", get(show_cart).delete(clear_cart))
        .route("/api/cart/count", get(cart_count))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/{id}", put(update_item).delete(remove_item))
        .with_state(backend)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    variant_id: i64,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateItemRequest {
    quantity: u32,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "status": status.as_u16() }))).into_response()
}

/// Count the request and check the bearer token.
fn authorize(backend: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    lock(backend).requests += 1;

    let expected = format!("Bearer {TEST_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);

    if authorized {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

async fn show_cart(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    Json(lock(&backend).cart_json()).into_response()
}

async fn cart_count(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    Json(json!({ "count": lock(&backend).count() })).into_response()
}

async fn add_item(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<AddItemRequest>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let mut backend = lock(&backend);
    let Some(stock) = backend.catalog.get(&request.variant_id).map(|v| v.stock) else {
        return error(StatusCode::NOT_FOUND, VARIANT_NOT_FOUND);
    };

    let existing = backend
        .lines
        .iter_mut()
        .find(|line| line.variant_id == request.variant_id);
    let in_cart = existing.as_ref().map_or(0, |line| line.quantity);
    if in_cart.saturating_add(request.quantity) > stock {
        return error(StatusCode::BAD_REQUEST, OUT_OF_STOCK);
    }

    if let Some(line) = existing {
        line.quantity += request.quantity;
    } else {
        let id = backend.next_line_id;
        backend.next_line_id += 1;
        backend.lines.push(Line {
            id,
            variant_id: request.variant_id,
            quantity: request.quantity,
        });
    }

    (StatusCode::CREATED, Json(backend.cart_json())).into_response()
}

async fn update_item(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<UpdateItemRequest>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let mut backend = lock(&backend);
    let Some(variant_id) = backend
        .lines
        .iter()
        .find(|line| line.id == id)
        .map(|line| line.variant_id)
    else {
        return error(StatusCode::NOT_FOUND, LINE_NOT_FOUND);
    };
    let stock = backend.catalog.get(&variant_id).map_or(0, |v| v.stock);
    if request.quantity > stock {
        return error(StatusCode::BAD_REQUEST, OUT_OF_STOCK);
    }

    if let Some(line) = backend.lines.iter_mut().find(|line| line.id == id) {
        line.quantity = request.quantity;
    }
    Json(backend.cart_json()).into_response()
}

async fn remove_item(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }

    let mut backend = lock(&backend);
    let before = backend.lines.len();
    backend.lines.retain(|line| line.id != id);
    if backend.lines.len() == before {
        return error(StatusCode::NOT_FOUND, LINE_NOT_FOUND);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_cart(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&backend, &headers) {
        return response;
    }
    lock(&backend).lines.clear();
    StatusCode::NO_CONTENT.into_response()
}
