//! Checkout selection set.
//!
//! The selection lives only on the client. It may hold ids of lines that
//! have since been removed from the cart; those stale ids are filtered out
//! whenever selected lines are derived, so callers never see them.

use std::collections::BTreeSet;

use crate::cart::{Cart, CartItem};
use crate::types::{CartItemId, Price};

/// Set of cart line ids chosen for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<CartItemId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Flip membership of `id`. Returns true if `id` is now selected.
    pub fn toggle(&mut self, id: CartItemId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Replace the selection with every line currently in `cart`.
    pub fn select_all(&mut self, cart: &Cart) {
        self.ids = cart.item_ids().collect();
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer refer to a line in `cart`.
    pub fn retain_in(&mut self, cart: &Cart) {
        self.ids.retain(|id| cart.contains(*id));
    }

    #[must_use]
    pub fn contains(&self, id: CartItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected ids, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order, stale ones included.
    pub fn ids(&self) -> impl Iterator<Item = CartItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Lines of `cart` that are selected, in the cart's stored order.
    #[must_use]
    pub fn selected_items<'a>(&self, cart: &'a Cart) -> Vec<&'a CartItem> {
        cart.items
            .iter()
            .filter(|item| self.ids.contains(&item.id))
            .collect()
    }

    /// Sum of `sub_total` over the selected lines of `cart`.
    #[must_use]
    pub fn selected_total(&self, cart: &Cart) -> Price {
        self.selected_items(cart)
            .into_iter()
            .map(|item| item.sub_total)
            .sum()
    }

    /// Returns true if `cart` is non-empty and every line is selected.
    #[must_use]
    pub fn covers(&self, cart: &Cart) -> bool {
        !cart.is_empty() && cart.item_ids().all(|id| self.ids.contains(&id))
    }
}
