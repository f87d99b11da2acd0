//! Cart screen.

use artisan_bazaar_core::{CartItem, CartItemId, CartSummary, Order};
use tracing::{info, instrument};

use super::{ListState, load_list, mutation};
use crate::api::keys;
use crate::error::{Notice, ViewError, add_breadcrumb};
use crate::state::AppState;

/// The cart as rendered: its lines and their totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub items: ListState<CartItem>,
    pub summary: CartSummary,
}

impl CartView {
    #[must_use]
    pub fn new(items: ListState<CartItem>) -> Self {
        let summary = CartSummary::of(items.items());
        Self { items, summary }
    }

    /// Whether checkout can start.
    #[must_use]
    pub const fn can_checkout(&self) -> bool {
        matches!(self.items, ListState::Ready(_))
    }
}

/// Load the cart.
pub async fn load(state: &AppState) -> CartView {
    let api = state.api().clone();
    let items = load_list(state, keys::CART, move || async move { api.cart().await }).await;
    CartView::new(items)
}

/// Change a line's quantity. Zero removes the line.
///
/// # Errors
///
/// Returns the translated backend error.
#[instrument(skip(state), fields(item_id = %id))]
pub async fn update_quantity(
    state: &AppState,
    id: CartItemId,
    quantity: u32,
) -> Result<Notice, ViewError> {
    if quantity == 0 {
        return remove(state, id).await;
    }

    // The cart prefix also covers the line's own key.
    let _line: CartItem =
        mutation(state, &[keys::CART], state.api().update_cart_item(id, quantity)).await?;
    Ok(Notice::success("Cart updated."))
}

/// Remove a line.
///
/// # Errors
///
/// Returns the translated backend error.
#[instrument(skip(state), fields(item_id = %id))]
pub async fn remove(state: &AppState, id: CartItemId) -> Result<Notice, ViewError> {
    mutation(state, &[keys::CART], state.api().remove_cart_item(id)).await?;
    Ok(Notice::success("Item removed from your cart."))
}

/// Place an order for the cart's contents.
///
/// Checkout turns the cart into an order, so both are invalidated.
///
/// # Errors
///
/// Returns `ViewError::ValidationFailed` for an empty cart (no request is
/// sent), or the translated backend error.
#[instrument(skip(state, cart))]
pub async fn checkout(state: &AppState, cart: &CartView) -> Result<Order, ViewError> {
    if !cart.can_checkout() {
        return Err(ViewError::ValidationFailed(
            "Your cart is empty.".to_string(),
        ));
    }

    let order = mutation(state, &[keys::CART, keys::ORDERS], state.api().checkout()).await?;

    let order_id = order.id.to_string();
    add_breadcrumb("cart", "Checked out", Some(&[("order_id", order_id.as_str())]));
    info!(order_id = %order.id, total = %order.total, "Order placed");
    Ok(order)
}
