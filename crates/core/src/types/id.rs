//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing a cart item id with a product or variant id.

/// Error returned when a textual id is not a base-10 integer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid id: {0:?}")]
pub struct IdParseError(pub String);

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
/// - `FromStr`, which normalizes textual ids (`" 7 "` parses as `7`)
///
/// # Example
///
/// ```rust
/// # use shopcart_core::define_id;
/// define_id!(OrderId);
/// define_id!(ShipmentId);
///
/// let order_id = OrderId::new(7);
/// let parsed: OrderId = " 7 ".parse().unwrap();
/// assert_eq!(order_id, parsed);
///
/// // These are different types, so this won't compile:
/// // let _: ShipmentId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| $crate::IdParseError(s.to_owned()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(CartItemId);
define_id!(ProductId);
define_id!(VariantId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_whitespace() {
        let id: CartItemId = "  42\n".parse().unwrap();
        assert_eq!(id, CartItemId::new(42));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = "abc".parse::<CartItemId>().unwrap_err();
        assert_eq!(err, IdParseError("abc".to_string()));
        assert!("".parse::<CartItemId>().is_err());
        assert!("4.5".parse::<CartItemId>().is_err());
    }

    #[test]
    fn test_textual_and_numeric_ids_compare_equal() {
        let from_text: VariantId = "15".parse().unwrap();
        assert_eq!(from_text, VariantId::from(15));
        assert_eq!(i64::from(from_text), 15);
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&ProductId::new(9)).unwrap();
        assert_eq!(json, "9");

        let parsed: ProductId = serde_json::from_str("9").unwrap();
        assert_eq!(parsed.as_i64(), 9);
    }

    #[test]
    fn test_display() {
        assert_eq!(CartItemId::new(5).to_string(), "5");
    }
}
