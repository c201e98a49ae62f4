//! Shopcart Core - Cart types and state shared by every shopcart component.
//!
//! This crate provides the pieces of the storefront cart that do not touch
//! the network:
//! - `client` - REST implementation of [`CartService`] and the `CartStore`
//! - `cli` - Command-line front end driving a `CartStore`
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure state transitions -
//! no HTTP clients, no async runtime. The remote cart service is reached
//! through the [`CartService`] trait, and every state change goes through
//! [`CartState`] so it can be tested without I/O.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and validated quantities
//! - [`cart`] - The server-owned cart snapshot
//! - [`selection`] - Client-only checkout selection set
//! - [`state`] - Store snapshot and its transitions
//! - [`service`] - Remote cart service contract
//! - [`error`] - Errors surfaced by store operations
//! - [`messages`] - User-facing notices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod messages;
pub mod selection;
pub mod service;
pub mod state;
pub mod types;

pub use cart::{Cart, CartItem};
pub use error::CartError;
pub use selection::Selection;
pub use service::{CartService, ServiceError};
pub use state::{CartState, FetchOutcome};
pub use types::*;
