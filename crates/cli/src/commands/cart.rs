//! Cart commands: show, count, add, update, remove, clear.
//!
//! Each command loads the cart first so the printed summary reflects what
//! the service holds after the change.

use shopcart_client::CartStore;
use shopcart_core::{CartItemId, CartService, VariantId};

use super::CommandError;
use crate::output;

/// Print every line of the cart with totals.
pub async fn show<S: CartService>(store: &CartStore<S>) -> Result<(), CommandError> {
    store.fetch_cart().await?;
    output::emit(&output::render_cart(&store.snapshot()));
    Ok(())
}

/// Print the badge count reported by the service.
pub async fn count<S: CartService>(store: &CartStore<S>) -> Result<(), CommandError> {
    let count = store.refresh_count().await?;
    output::emit(&count.to_string());
    Ok(())
}

pub async fn add<S: CartService>(
    store: &CartStore<S>,
    variant_id: VariantId,
    quantity: i64,
) -> Result<(), CommandError> {
    let notice = store.add_to_cart(variant_id, quantity).await?;
    report(store, notice);
    Ok(())
}

pub async fn update<S: CartService>(
    store: &CartStore<S>,
    item_id: CartItemId,
    quantity: i64,
) -> Result<(), CommandError> {
    let notice = store.update_quantity(item_id, quantity).await?;
    report(store, notice);
    Ok(())
}

pub async fn remove<S: CartService>(
    store: &CartStore<S>,
    item_id: CartItemId,
) -> Result<(), CommandError> {
    let notice = store.remove_from_cart(item_id).await?;
    report(store, notice);
    Ok(())
}

pub async fn clear<S: CartService>(store: &CartStore<S>) -> Result<(), CommandError> {
    let notice = store.clear_cart().await?;
    report(store, notice);
    Ok(())
}

/// Print the success notice followed by the cart as it stands now.
fn report<S: CartService>(store: &CartStore<S>, notice: &str) {
    let state = store.snapshot();
    // A failed resync after a successful mutation is logged, not fatal
    if let Some(error) = state.error() {
        tracing::warn!(%error, "cart may be out of date");
    }
    output::emit(&output::render_notice(notice, &state));
}
