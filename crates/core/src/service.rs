//! Remote cart service contract.
//!
//! The store never talks HTTP itself; it drives an implementation of
//! [`CartService`]. `shopcart-client` provides the REST implementation and
//! tests substitute in-memory fakes.

use std::future::Future;

use thiserror::Error;

use crate::cart::Cart;
use crate::types::{CartItemId, Quantity, VariantId};

/// Errors reported by a [`CartService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The shopper is not signed in (HTTP 401).
    #[error("not authenticated")]
    Unauthorized,

    /// The service refused the request.
    #[error("cart service returned {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// User-facing message from the response body, if any.
        message: Option<String>,
    },

    /// The request never produced a response (connection, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A successful response carried an unexpected body.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Message supplied by the service for display, if any.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Operations offered by the remote cart service.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - A 401 must be reported as [`ServiceError::Unauthorized`], never as
///   `Rejected`, so the store can treat it as "no cart"
/// - Mutations return nothing; callers re-fetch the cart afterwards
pub trait CartService: Send + Sync {
    /// Fetch the current cart.
    fn get_cart(&self) -> impl Future<Output = Result<Cart, ServiceError>> + Send;

    /// Add `quantity` units of a variant.
    fn add_to_cart(
        &self,
        variant_id: VariantId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Set the quantity of an existing line.
    fn update_cart_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Remove a line.
    fn remove_cart_item(
        &self,
        item_id: CartItemId,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Remove every line.
    fn clear_cart(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Total number of units in the cart.
    fn get_cart_count(&self) -> impl Future<Output = Result<u32, ServiceError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = ServiceError::Rejected {
            status: 400,
            message: Some("Vượt quá số lượng tồn kho".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "cart service returned 400: Vượt quá số lượng tồn kho"
        );
        assert_eq!(err.user_message(), Some("Vượt quá số lượng tồn kho"));
    }

    #[test]
    fn test_rejected_without_message() {
        let err = ServiceError::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "cart service returned 502: (no message)");
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_only_rejections_carry_user_messages() {
        assert_eq!(ServiceError::Unauthorized.user_message(), None);
        assert_eq!(
            ServiceError::Transport("connection refused".to_string()).user_message(),
            None
        );
    }
}
