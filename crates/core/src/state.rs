//! Store snapshot and its transitions.
//!
//! [`CartState`] is what observers of the store see. Every change the store
//! makes goes through one of the methods below, so the transitions can be
//! tested without a runtime or a service.
//!
//! # Ordering
//!
//! Responses from the cart service can complete out of order. Each write
//! derived from a response carries a sequence number issued by the store.
//! Cart writes (fetch, clear) and count writes are ordered separately:
//!
//! - a cart write is dropped unless it is newer than the last cart write;
//! - a count write is dropped unless it is newer than both the last count
//!   write and the last cart write.
//!
//! A count therefore never causes a cart to be dropped, while a count
//! issued before a newer cart write cannot overwrite the count that write
//! derived.
//!
//! [`reset`](CartState::reset) starts a new generation. Writes whose
//! operation began in an earlier generation are dropped.

use chrono::{DateTime, Utc};

use crate::cart::{Cart, CartItem};
use crate::selection::Selection;
use crate::types::{CartItemId, Price};

/// Result of a cart fetch, as fed into [`CartState::apply_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The service returned the cart.
    Loaded(Cart),
    /// The shopper is not signed in; there is no cart.
    Unauthenticated,
    /// The fetch failed with this user-facing message.
    Failed(String),
}

/// Snapshot of the cart store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    cart: Option<Cart>,
    cart_count: u32,
    error: Option<String>,
    selection: Selection,
    synced_at: Option<DateTime<Utc>>,
    in_flight: u32,
    cart_seq: u64,
    count_seq: u64,
    generation: u64,
}

impl CartState {
    /// Last cart received from the service, or `None` before the first
    /// fetch and when signed out.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Badge count: total units in the cart.
    #[must_use]
    pub const fn cart_count(&self) -> u32 {
        self.cart_count
    }

    /// Message of the last failed operation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// When the cart was last loaded from the service.
    #[must_use]
    pub const fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    /// True while any operation is waiting on the service.
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of resets so far. Operations capture it when issued.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Request lifecycle
    // =========================================================================

    pub const fn begin_request(&mut self) {
        self.in_flight = self.in_flight.saturating_add(1);
    }

    pub const fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Accept a cart write tagged `seq` if it is newer than the last one.
    const fn admit_cart(&mut self, seq: u64) -> bool {
        if seq <= self.cart_seq {
            return false;
        }
        self.cart_seq = seq;
        true
    }

    /// Accept a count write tagged `seq` if it is newer than the last count
    /// and the last cart write.
    const fn admit_count(&mut self, seq: u64) -> bool {
        if seq <= self.count_seq || seq <= self.cart_seq {
            return false;
        }
        self.count_seq = seq;
        true
    }

    // =========================================================================
    // Service results
    // =========================================================================

    /// Apply the result of a fetch issued with sequence number `seq`.
    ///
    /// Returns false if the result was stale and dropped.
    pub fn apply_fetch(&mut self, seq: u64, outcome: FetchOutcome) -> bool {
        if !self.admit_cart(seq) {
            return false;
        }

        match outcome {
            FetchOutcome::Loaded(cart) => {
                self.cart_count = cart.item_count();
                self.cart = Some(cart);
                self.error = None;
                self.synced_at = Some(Utc::now());
            }
            FetchOutcome::Unauthenticated => {
                self.cart = None;
                self.cart_count = 0;
                self.error = None;
            }
            // Keep the last known-good cart
            FetchOutcome::Failed(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Apply a confirmed clear issued in `generation`. The cart becomes
    /// empty without a resync.
    pub fn apply_cleared(&mut self, seq: u64, generation: u64) -> bool {
        if generation != self.generation || !self.admit_cart(seq) {
            return false;
        }

        self.cart = Some(Cart::empty());
        self.cart_count = 0;
        self.error = None;
        true
    }

    /// Apply a count reported by the service.
    pub const fn apply_count(&mut self, seq: u64, count: u32) -> bool {
        if !self.admit_count(seq) {
            return false;
        }

        self.cart_count = count;
        true
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Record the error of an operation issued in `generation`; dropped if
    /// the store was reset since.
    pub fn record_error_in(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.record_error(message);
        true
    }

    /// Back to the initial state (logout/unmount). Responses issued before
    /// `seq` are dropped when they arrive, as are writes of operations
    /// issued before the reset.
    pub fn reset(&mut self, seq: u64) {
        *self = Self {
            in_flight: self.in_flight,
            cart_seq: self.cart_seq.max(seq),
            count_seq: self.count_seq.max(seq),
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        };
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub const fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Select every line of the current cart (nothing if there is no cart).
    pub fn select_all(&mut self) {
        match &self.cart {
            Some(cart) => self.selection.select_all(cart),
            None => self.selection.clear(),
        }
    }

    /// Drop selected ids that no longer refer to a line.
    pub fn prune_selection(&mut self) {
        match &self.cart {
            Some(cart) => self.selection.retain_in(cart),
            None => self.selection.clear(),
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: CartItemId) -> bool {
        self.selection.contains(id)
    }

    /// Selected lines in stored cart order; stale ids are skipped.
    #[must_use]
    pub fn selected_items(&self) -> Vec<&CartItem> {
        self.cart
            .as_ref()
            .map_or_else(Vec::new, |cart| self.selection.selected_items(cart))
    }

    #[must_use]
    pub fn selected_total(&self) -> Price {
        self.cart
            .as_ref()
            .map_or(Price::ZERO, |cart| self.selection.selected_total(cart))
    }

    /// True if the cart is non-empty and every line is selected.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.cart
            .as_ref()
            .is_some_and(|cart| self.selection.covers(cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::{cart, item};

    fn loaded(items: Vec<CartItem>) -> CartState {
        let mut state = CartState::default();
        assert!(state.apply_fetch(1, FetchOutcome::Loaded(cart(items))));
        state
    }

    #[test]
    fn test_initial_state() {
        let state = CartState::default();
        assert_eq!(state.cart(), None);
        assert_eq!(state.cart_count(), 0);
        assert_eq!(state.error(), None);
        assert!(!state.loading());
    }

    #[test]
    fn test_fetch_loaded_recomputes_count() {
        let state = loaded(vec![item(1, 2, 100_000), item(2, 3, 1_000)]);
        assert_eq!(state.cart_count(), 5);
        assert_eq!(state.cart().map(|c| c.items.len()), Some(2));
        assert!(state.synced_at().is_some());
    }

    #[test]
    fn test_fetch_unauthenticated_is_not_an_error() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        state.record_error("old failure");

        assert!(state.apply_fetch(2, FetchOutcome::Unauthenticated));
        assert_eq!(state.cart(), None);
        assert_eq!(state.cart_count(), 0);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_fetch_failure_preserves_cart() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        let before = state.cart().cloned();

        assert!(state.apply_fetch(2, FetchOutcome::Failed("Không thể tải giỏ hàng".into())));
        assert_eq!(state.cart().cloned(), before);
        assert_eq!(state.cart_count(), 2);
        assert_eq!(state.error(), Some("Không thể tải giỏ hàng"));
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut state = CartState::default();
        assert!(state.apply_fetch(2, FetchOutcome::Loaded(cart(vec![item(1, 1, 10)]))));

        // An older request completing late must not overwrite the newer result
        assert!(!state.apply_fetch(1, FetchOutcome::Loaded(cart(vec![item(1, 9, 10)]))));
        assert_eq!(state.cart_count(), 1);

        assert!(!state.apply_fetch(2, FetchOutcome::Unauthenticated));
        assert!(state.cart().is_some());
    }

    #[test]
    fn test_clear_sets_empty_cart() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        state.selection_mut().toggle(CartItemId::new(1));

        assert!(state.apply_cleared(2, state.generation()));
        assert_eq!(state.cart(), Some(&Cart::empty()));
        assert_eq!(state.cart_count(), 0);
        // Selection is left alone; the stale id is filtered on read
        assert!(state.is_selected(CartItemId::new(1)));
        assert!(state.selected_items().is_empty());

        assert!(!state.apply_fetch(1, FetchOutcome::Loaded(cart(vec![item(1, 2, 10)]))));
    }

    #[test]
    fn test_apply_count() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        assert!(state.apply_count(2, 7));
        assert_eq!(state.cart_count(), 7);
        assert!(!state.apply_count(2, 8));
    }

    #[test]
    fn test_count_never_blocks_older_fetch() {
        let mut state = CartState::default();

        // Count issued after the fetch lands first
        assert!(state.apply_count(3, 9));
        assert!(state.apply_fetch(2, FetchOutcome::Loaded(cart(vec![item(1, 2, 10)]))));
        assert_eq!(state.cart().map(|c| c.items.len()), Some(1));
        assert_eq!(state.cart_count(), 2);
    }

    #[test]
    fn test_count_older_than_fetch_is_dropped() {
        let mut state = CartState::default();
        assert!(state.apply_fetch(4, FetchOutcome::Loaded(cart(vec![item(1, 2, 10)]))));

        assert!(!state.apply_count(3, 9));
        assert_eq!(state.cart_count(), 2);
        assert!(state.apply_count(5, 3));
        assert_eq!(state.cart_count(), 3);
    }

    #[test]
    fn test_writes_from_before_reset_are_dropped() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        let before = state.generation();

        state.reset(2);
        assert_ne!(state.generation(), before);

        assert!(!state.apply_cleared(3, before));
        assert!(!state.record_error_in(before, "Không thể xóa giỏ hàng"));
        assert_eq!(state.cart(), None);
        assert_eq!(state.error(), None);

        assert!(state.apply_cleared(3, state.generation()));
        assert_eq!(state.cart(), Some(&Cart::empty()));
    }

    #[test]
    fn test_request_counter() {
        let mut state = CartState::default();
        state.begin_request();
        state.begin_request();
        state.end_request();
        assert!(state.loading());
        state.end_request();
        assert!(!state.loading());
        state.end_request();
        assert!(!state.loading());
    }

    #[test]
    fn test_reset_drops_earlier_responses() {
        let mut state = loaded(vec![item(1, 2, 100_000)]);
        state.select_all();
        state.begin_request();

        state.reset(5);
        assert_eq!(state.cart(), None);
        assert!(state.selection().is_empty());
        assert!(state.loading());

        assert!(!state.apply_fetch(4, FetchOutcome::Loaded(cart(vec![item(1, 2, 10)]))));
        assert!(state.apply_fetch(6, FetchOutcome::Unauthenticated));
    }

    #[test]
    fn test_selection_queries() {
        let mut state = CartState::default();
        state.select_all();
        assert!(state.selection().is_empty());
        assert_eq!(state.selected_total(), Price::ZERO);
        assert!(!state.all_selected());

        let mut state = loaded(vec![item(1, 2, 100_000), item(2, 1, 50_000)]);
        state.select_all();
        assert!(state.all_selected());
        assert_eq!(state.selected_total(), Price::from_dong(250_000));

        state.selection_mut().toggle(CartItemId::new(2));
        assert!(!state.all_selected());
        assert_eq!(state.selected_items().len(), 1);
    }

    #[test]
    fn test_prune_selection() {
        let mut state = loaded(vec![item(1, 1, 10)]);
        state.selection_mut().toggle(CartItemId::new(1));
        state.selection_mut().toggle(CartItemId::new(8));
        state.prune_selection();
        assert_eq!(state.selection().len(), 1);
    }
}
