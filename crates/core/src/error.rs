//! Errors returned by cart store operations.
//!
//! Display text is user-facing; the store also records it in
//! [`CartState::error`](crate::CartState::error).

use thiserror::Error;

use crate::service::ServiceError;
use crate::types::QuantityError;

/// Outcome of a failed cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Rejected locally before any request was made.
    #[error(transparent)]
    Validation(#[from] QuantityError),

    /// The cart service requires a signed-in shopper.
    #[error("Vui lòng đăng nhập để sử dụng giỏ hàng")]
    Unauthenticated,

    /// The cart service failed or refused the request.
    #[error("{0}")]
    Remote(String),
}

impl CartError {
    /// Map a service failure, preferring the service's own message over
    /// `fallback`.
    #[must_use]
    pub fn from_service(err: &ServiceError, fallback: &str) -> Self {
        match err {
            ServiceError::Unauthorized => Self::Unauthenticated,
            other => Self::Remote(other.user_message().unwrap_or(fallback).to_owned()),
        }
    }

    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if the error was raised without contacting the service.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages;

    #[test]
    fn test_validation_message() {
        let err = CartError::from(QuantityError::OutOfRange { value: 150 });
        assert_eq!(err.message(), "Số lượng phải từ 1 đến 100");
        assert!(err.is_validation());
    }

    #[test]
    fn test_service_message_wins_over_fallback() {
        let err = ServiceError::Rejected {
            status: 400,
            message: Some("Sản phẩm đã hết hàng".to_string()),
        };
        assert_eq!(
            CartError::from_service(&err, messages::ADD_FAILED),
            CartError::Remote("Sản phẩm đã hết hàng".to_string())
        );
    }

    #[test]
    fn test_fallback_when_service_is_silent() {
        let err = ServiceError::Transport("timed out".to_string());
        assert_eq!(
            CartError::from_service(&err, messages::UPDATE_FAILED).message(),
            messages::UPDATE_FAILED
        );
    }

    #[test]
    fn test_unauthorized_maps_to_unauthenticated() {
        let err = CartError::from_service(&ServiceError::Unauthorized, messages::CLEAR_FAILED);
        assert_eq!(err, CartError::Unauthenticated);
        assert!(!err.is_validation());
    }
}
