//! Core types for shopcart.
//!
//! This module provides type-safe wrappers for the cart's domain values.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::*;
pub use price::Price;
pub use quantity::{Quantity, QuantityError};
