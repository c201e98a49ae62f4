//! Shopcart client - talks to the remote cart service and keeps the
//! shopper's cart state.
//!
//! # Architecture
//!
//! - [`HttpCartService`] implements [`shopcart_core::CartService`] over REST
//!   with `reqwest`
//! - [`CartStore`] is the single writer of [`shopcart_core::CartState`] and
//!   publishes snapshots through a `tokio::sync::watch` channel
//! - Every mutation is followed by a full re-fetch; the service is the
//!   source of truth and nothing is patched optimistically
//!
//! # Example
//!
//! ```rust,ignore
//! use shopcart_client::{CartStore, ClientConfig, HttpCartService};
//!
//! let config = ClientConfig::from_env()?;
//! let store = CartStore::new(HttpCartService::new(&config)?);
//!
//! store.fetch_cart().await?;
//! store.add_to_cart(VariantId::new(12), 2).await?;
//!
//! store.select_all_items();
//! let total = store.selected_total();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod http;
pub mod store;

pub use config::{ClientConfig, ConfigError};
pub use http::HttpCartService;
pub use store::CartStore;
