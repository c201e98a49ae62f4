//! Cart store: the single writer of [`CartState`].
//!
//! Every cart mutation goes through the remote service and is followed by a
//! full re-fetch, so after each operation the store mirrors what the service
//! reports. Selection changes are local and never reach the service.
//!
//! Observers hold a `watch::Receiver` from [`CartStore::subscribe`] and
//! re-render when it changes.
//!
//! # Concurrency
//!
//! Operations may overlap (e.g., rapid quantity clicks). Fetches and count
//! refreshes are tagged with a sequence number when issued and [`CartState`]
//! drops results older than the last one applied, so the latest issued
//! request wins. Operations also capture the reset generation when issued;
//! after [`CartStore::reset`] their late results are dropped and mutations
//! skip the resync. No operation retries.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use shopcart_core::{
    CartError, CartItem, CartItemId, CartService, CartState, FetchOutcome, IdParseError, Price,
    Quantity, ServiceError, VariantId, messages,
};

/// Holds the shopper's cart and checkout selection.
pub struct CartStore<S> {
    service: S,
    state: watch::Sender<CartState>,
    seq: AtomicU64,
}

/// Marks an operation as in flight until dropped.
///
/// Dropping the operation's future also releases it, so a cancelled call
/// never leaves the store loading.
struct InFlight<'a> {
    state: &'a watch::Sender<CartState>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a watch::Sender<CartState>) -> Self {
        state.send_modify(CartState::begin_request);
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_modify(CartState::end_request);
    }
}

impl<S: CartService> CartStore<S> {
    /// Create a store with no cart loaded.
    #[must_use]
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            service,
            state,
            seq: AtomicU64::new(0),
        }
    }

    /// The underlying cart service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Run a state transition that may be rejected as stale.
    fn apply(&self, transition: impl FnOnce(&mut CartState) -> bool) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            applied = transition(state);
            applied
        });
        if !applied {
            debug!("discarded stale cart response");
        }
        applied
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation()
    }

    fn record_error(&self, err: &CartError, generation: u64) {
        let message = err.message();
        self.state
            .send_if_modified(|state| state.record_error_in(generation, message));
    }

    fn validate(&self, quantity: i64) -> Result<Quantity, CartError> {
        Quantity::new(quantity).map_err(|e| {
            let err = CartError::from(e);
            debug!(quantity, "rejected quantity before calling cart service");
            self.record_error(&err, self.generation());
            err
        })
    }

    // =========================================================================
    // Remote Operations
    // =========================================================================

    /// Load the cart from the service.
    ///
    /// A signed-out shopper (401) is not an error: the store is reset to
    /// "no cart" and `Ok(())` is returned. Any other failure keeps the last
    /// known cart and records the error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the service fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<(), CartError> {
        let _loading = InFlight::begin(&self.state);
        let seq = self.next_seq();

        let (outcome, result) = match self.service.get_cart().await {
            Ok(cart) => (FetchOutcome::Loaded(cart), Ok(())),
            Err(ServiceError::Unauthorized) => (FetchOutcome::Unauthenticated, Ok(())),
            Err(err) => {
                warn!(error = %err, "failed to fetch cart");
                let message = CartError::from_service(&err, messages::FETCH_FAILED).message();
                (
                    FetchOutcome::Failed(message.clone()),
                    Err(CartError::Remote(message)),
                )
            }
        };

        self.apply(|state| state.apply_fetch(seq, outcome));
        result
    }

    /// Add `quantity` units of a variant, then resync.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` without calling the service if
    /// `quantity` is outside 1..=100, or the service's error otherwise.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<&'static str, CartError> {
        let quantity = self.validate(quantity)?;
        self.mutate(
            self.service.add_to_cart(variant_id, quantity),
            messages::ADDED,
            messages::ADD_FAILED,
        )
        .await
    }

    /// Set a line's quantity, then resync.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` without calling the service if
    /// `quantity` is outside 1..=100, or the service's error otherwise.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<&'static str, CartError> {
        let quantity = self.validate(quantity)?;
        self.mutate(
            self.service.update_cart_item_quantity(item_id, quantity),
            messages::UPDATED,
            messages::UPDATE_FAILED,
        )
        .await
    }

    /// Remove a line, then resync.
    ///
    /// # Errors
    ///
    /// Returns the service's error if the removal fails.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, item_id: CartItemId) -> Result<&'static str, CartError> {
        self.mutate(
            self.service.remove_cart_item(item_id),
            messages::REMOVED,
            messages::REMOVE_FAILED,
        )
        .await
    }

    /// Empty the cart. On success the local cart is emptied directly.
    ///
    /// # Errors
    ///
    /// Returns the service's error if the clear fails; the cart is untouched.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<&'static str, CartError> {
        let _loading = InFlight::begin(&self.state);
        let generation = self.generation();

        match self.service.clear_cart().await {
            Ok(()) => {
                // Numbered on completion so fetches issued meanwhile lose
                let seq = self.next_seq();
                self.apply(|state| state.apply_cleared(seq, generation));
                Ok(messages::CLEARED)
            }
            Err(err) => Err(self.fail(&err, messages::CLEAR_FAILED, generation)),
        }
    }

    /// Refresh the badge count without loading the whole cart.
    ///
    /// A signed-out shopper counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the service fails.
    #[instrument(skip(self))]
    pub async fn refresh_count(&self) -> Result<u32, CartError> {
        let _loading = InFlight::begin(&self.state);
        let generation = self.generation();
        let seq = self.next_seq();

        let count = match self.service.get_cart_count().await {
            Ok(count) => count,
            Err(ServiceError::Unauthorized) => 0,
            Err(err) => return Err(self.fail(&err, messages::COUNT_FAILED, generation)),
        };

        self.apply(|state| state.apply_count(seq, count));
        Ok(count)
    }

    async fn mutate(
        &self,
        call: impl Future<Output = Result<(), ServiceError>>,
        success: &'static str,
        fallback: &'static str,
    ) -> Result<&'static str, CartError> {
        let _loading = InFlight::begin(&self.state);
        let generation = self.generation();

        match call.await {
            Ok(()) if self.generation() != generation => {
                debug!("store was reset during mutation, skipping resync");
                Ok(success)
            }
            Ok(()) => {
                debug!("cart mutated, resyncing");
                // A failed resync is recorded by fetch_cart; the mutation
                // itself went through.
                if let Err(err) = self.fetch_cart().await {
                    debug!(error = %err, "resync after mutation failed");
                }
                Ok(success)
            }
            Err(err) => Err(self.fail(&err, fallback, generation)),
        }
    }

    fn fail(&self, err: &ServiceError, fallback: &str, generation: u64) -> CartError {
        warn!(error = %err, "cart operation failed");
        let err = CartError::from_service(err, fallback);
        self.record_error(&err, generation);
        err
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Flip a line's membership in the checkout selection. Returns true if
    /// the line is now selected.
    pub fn toggle_item_selection(&self, id: impl Into<CartItemId>) -> bool {
        let id = id.into();
        let mut selected = false;
        self.state
            .send_modify(|state| selected = state.selection_mut().toggle(id));
        selected
    }

    /// Like [`toggle_item_selection`](Self::toggle_item_selection) for ids
    /// that arrive as text.
    ///
    /// # Errors
    ///
    /// Returns `IdParseError` if `id` is not a base-10 integer.
    pub fn toggle_item_selection_str(&self, id: &str) -> Result<bool, IdParseError> {
        let id: CartItemId = id.parse()?;
        Ok(self.toggle_item_selection(id))
    }

    /// Select every line currently in the cart.
    pub fn select_all_items(&self) {
        self.state.send_modify(CartState::select_all);
    }

    /// Empty the checkout selection.
    pub fn deselect_all_items(&self) {
        self.state
            .send_modify(|state| state.selection_mut().clear());
    }

    #[must_use]
    pub fn is_selected(&self, id: CartItemId) -> bool {
        self.state.borrow().is_selected(id)
    }

    /// True if the cart is non-empty and every line is selected.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.state.borrow().all_selected()
    }

    /// Selected lines in stored cart order; ids of removed lines are skipped.
    #[must_use]
    pub fn selected_items(&self) -> Vec<CartItem> {
        self.state
            .borrow()
            .selected_items()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Sum of `sub_total` over [`selected_items`](Self::selected_items).
    #[must_use]
    pub fn selected_total(&self) -> Price {
        self.state.borrow().selected_total()
    }

    /// Return to the initial state (logout/unmount). Responses to requests
    /// issued before the reset are ignored.
    pub fn reset(&self) {
        let seq = self.next_seq();
        self.state.send_modify(|state| state.reset(seq));
    }
}
