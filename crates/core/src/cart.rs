//! The cart as reported by the cart service.
//!
//! The service is the source of truth: a [`Cart`] is always replaced
//! wholesale from a fetch, never patched locally.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CartItemId, Price, ProductId};

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Server-assigned line id.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    /// Product image URL.
    #[serde(default)]
    pub product_image: Option<String>,
    /// Variant attributes (e.g., "Màu" → "Đỏ").
    #[serde(default, deserialize_with = "null_as_default")]
    pub variant_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    /// Units in stock for this variant.
    pub stock_available: u32,
    /// `quantity * unit_price`, computed by the service.
    pub sub_total: Price,
}

impl CartItem {
    /// Variant attributes rendered as `name: value` pairs, or `None` when the
    /// variant has no attributes.
    #[must_use]
    pub fn variant_label(&self) -> Option<String> {
        if self.variant_attributes.is_empty() {
            return None;
        }

        Some(
            self.variant_attributes
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// The current shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: Price,
}

impl Cart {
    /// A cart with no items and a zero total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_amount: Price::ZERO,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Line ids in stored order.
    pub fn item_ids(&self) -> impl Iterator<Item = CartItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    /// Find a line by id.
    #[must_use]
    pub fn get(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns true if the cart has a line with this id.
    #[must_use]
    pub fn contains(&self, id: CartItemId) -> bool {
        self.get(id).is_some()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(id: i64, quantity: u32, unit_price: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(id * 10),
            product_name: format!("Sản phẩm {id}"),
            product_image: None,
            variant_attributes: BTreeMap::new(),
            sku: Some(format!("SKU-{id}")),
            unit_price: Price::from_dong(unit_price),
            quantity,
            stock_available: 50,
            sub_total: Price::from_dong(unit_price * i64::from(quantity)),
        }
    }

    pub(crate) fn cart(items: Vec<CartItem>) -> Cart {
        let total_amount = items.iter().map(|i| i.sub_total).sum();
        Cart {
            items,
            total_amount,
        }
    }

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{
            "items": [{
                "id": 1,
                "productId": 10,
                "productName": "Áo thun",
                "productImage": "https://cdn.example.vn/ao.jpg",
                "variantAttributes": {"Màu": "Đỏ", "Size": "M"},
                "sku": "AT-DO-M",
                "unitPrice": 100000,
                "quantity": 2,
                "stockAvailable": 5,
                "subTotal": 200000
            }],
            "totalAmount": 200000
        }"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        let line = &cart.items[0];
        assert_eq!(line.id, CartItemId::new(1));
        assert_eq!(line.sub_total, Price::from_dong(200_000));
        assert_eq!(line.variant_label().as_deref(), Some("Màu: Đỏ, Size: M"));
        assert_eq!(cart.total_amount, Price::from_dong(200_000));
    }

    #[test]
    fn test_deserialize_tolerates_nulls() {
        let json = r#"{
            "items": [{
                "id": 3,
                "productId": 30,
                "productName": "Mũ",
                "productImage": null,
                "variantAttributes": null,
                "sku": null,
                "unitPrice": "50000",
                "quantity": 1,
                "stockAvailable": 9,
                "subTotal": "50000"
            }],
            "totalAmount": "50000"
        }"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert!(cart.items[0].variant_attributes.is_empty());
        assert_eq!(cart.items[0].variant_label(), None);

        let cart: Cart = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert_eq!(cart, Cart::empty());
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let cart = cart(vec![item(1, 2, 100_000), item(2, 3, 10_000)]);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(Cart::empty().item_count(), 0);
    }

    #[test]
    fn test_lookup() {
        let cart = cart(vec![item(4, 1, 1_000), item(2, 1, 1_000)]);
        assert!(cart.contains(CartItemId::new(2)));
        assert!(!cart.contains(CartItemId::new(3)));
        assert_eq!(
            cart.item_ids().collect::<Vec<_>>(),
            vec![CartItemId::new(4), CartItemId::new(2)]
        );
    }
}
