//! Shopping cart lines.

use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, Price, ProductId};

/// One line in the buyer's cart (`GET /api/cart` returns a list of these).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Derived totals for a list of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of line totals.
    pub subtotal: Price,
    /// Sum of quantities.
    pub item_count: u32,
}

impl CartSummary {
    /// Summarize cart lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            subtotal: items.iter().map(CartItem::line_total).sum(),
            item_count: items.iter().map(|item| item.quantity).sum(),
        }
    }
}

/// Body for `POST /api/cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `PATCH /api/cart/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}
