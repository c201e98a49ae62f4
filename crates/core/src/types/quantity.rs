//! Validated line quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
///
/// The display text is shown to shoppers as-is.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The requested quantity is outside `Quantity::MIN..=Quantity::MAX`.
    #[error("Số lượng phải từ 1 đến 100")]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
}

/// A quantity the cart service will accept for a single line.
///
/// ## Constraints
///
/// - At least [`Quantity::MIN`] (1)
/// - At most [`Quantity::MAX`] (100)
///
/// Stock limits are enforced by the cart service, not here.
///
/// ## Examples
///
/// ```
/// use shopcart_core::Quantity;
///
/// assert!(Quantity::new(1).is_ok());
/// assert!(Quantity::new(100).is_ok());
///
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: u32 = 1;

    /// Largest accepted quantity.
    pub const MAX: u32 = 100;

    /// Validate a requested quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::OutOfRange`] if `value` is below 1 or above 100.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        u32::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(QuantityError::OutOfRange { value })
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
