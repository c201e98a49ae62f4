//! Checkout preview: select cart lines and print what would be paid.
//!
//! Nothing is submitted; the selection only lives for this invocation.

use shopcart_client::CartStore;
use shopcart_core::{CartItemId, CartService};

use super::CommandError;
use crate::output;

/// Select `item_ids` (or every line with `all`) and print the selected lines
/// with their total.
///
/// Ids that do not refer to a line of the cart are reported and left out
/// of the total.
pub async fn preview<S: CartService>(
    store: &CartStore<S>,
    item_ids: &[String],
    all: bool,
) -> Result<(), CommandError> {
    store.fetch_cart().await?;

    if all {
        store.select_all_items();
    } else {
        for raw in item_ids {
            let id: CartItemId = raw.parse()?;
            // Repeated ids must not toggle the line back off
            if !store.is_selected(id) {
                store.toggle_item_selection(id);
            }
        }
    }

    let state = store.snapshot();
    let unknown: Vec<CartItemId> = state
        .selection()
        .ids()
        .filter(|id| !state.cart().is_some_and(|cart| cart.contains(*id)))
        .collect();
    if !unknown.is_empty() {
        tracing::warn!(?unknown, "ignoring ids that are not in the cart");
    }

    output::emit(&output::render_checkout(
        &store.selected_items(),
        store.selected_total(),
        store.all_selected(),
    ));
    Ok(())
}
