//! REST implementation of [`CartService`].
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | get cart | `GET {base}/cart` |
//! | add | `POST {base}/cart/items` with `{"variantId", "quantity"}` |
//! | update | `PUT {base}/cart/items/{id}` with `{"quantity"}` |
//! | remove | `DELETE {base}/cart/items/{id}` |
//! | clear | `DELETE {base}/cart` |
//! | count | `GET {base}/cart/count` |
//!
//! Error responses carry a JSON body with a `message` field that is shown to
//! the shopper. A 401 is reported separately so the store can treat it as
//! "signed out".

use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use shopcart_core::{Cart, CartItemId, CartService, Quantity, ServiceError, VariantId};

use crate::config::ClientConfig;

/// Header carrying the per-request correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum number of body characters copied into logs.
const LOG_BODY_LIMIT: usize = 500;

/// Cart service client over HTTP.
///
/// Cheaply cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct HttpCartService {
    inner: Arc<HttpCartServiceInner>,
}

struct HttpCartServiceInner {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpCartService {
    /// Create a new cart service client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpCartServiceInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: config.token.clone(),
            }),
        })
    }

    /// Base URL requests are issued against, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let request_id = Uuid::new_v4().to_string();
        debug!(%method, %url, %request_id, "cart service request");

        let builder = self
            .inner
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, request_id);

        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and map non-success statuses to [`ServiceError`].
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("cart service reported shopper as signed out");
            return Err(ServiceError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                body = %truncate(&body),
                "cart service returned non-success status"
            );
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(transport)?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse cart service response"
            );
            ServiceError::Decode(e.to_string())
        })
    }
}

impl CartService for HttpCartService {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ServiceError> {
        self.send_json(self.request(Method::GET, "/cart")).await
    }

    #[instrument(skip(self), fields(variant_id = %variant_id, quantity = %quantity))]
    async fn add_to_cart(
        &self,
        variant_id: VariantId,
        quantity: Quantity,
    ) -> Result<(), ServiceError> {
        let body = AddItemBody {
            variant_id,
            quantity,
        };
        self.send(self.request(Method::POST, "/cart/items").json(&body))
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(item_id = %item_id, quantity = %quantity))]
    async fn update_cart_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), ServiceError> {
        let path = format!("/cart/items/{item_id}");
        self.send(
            self.request(Method::PUT, &path)
                .json(&UpdateItemBody { quantity }),
        )
        .await
        .map(drop)
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ServiceError> {
        let path = format!("/cart/items/{item_id}");
        self.send(self.request(Method::DELETE, &path))
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ServiceError> {
        self.send(self.request(Method::DELETE, "/cart"))
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn get_cart_count(&self) -> Result<u32, ServiceError> {
        let count: CountBody = self
            .send_json(self.request(Method::GET, "/cart/count"))
            .await?;
        Ok(count.into())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    variant_id: VariantId,
    quantity: Quantity,
}

#[derive(Debug, Serialize)]
struct UpdateItemBody {
    quantity: Quantity,
}

/// Count endpoint accepts both a bare number and `{"count": n}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountBody {
    Bare(u32),
    Wrapped { count: u32 },
}

impl From<CountBody> for u32 {
    fn from(body: CountBody) -> Self {
        match body {
            CountBody::Bare(count) | CountBody::Wrapped { count } => count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Extract the user-facing `message` from an error response body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

fn transport(err: reqwest::Error) -> ServiceError {
    warn!(error = %err, "cart service unreachable");
    ServiceError::Transport(err.to_string())
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
