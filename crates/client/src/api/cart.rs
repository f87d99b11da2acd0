//! Cart endpoints.

use artisan_bazaar_core::{AddToCart, CartItem, CartItemId, UpdateCartItem};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// The signed-in buyer's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Vec<CartItem>, ApiError> {
        self.get(keys::CART).await
    }

    /// Add a product to the cart, returning the resulting line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_to_cart(&self, item: &AddToCart) -> Result<CartItem, ApiError> {
        self.post(keys::CART, item).await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn update_cart_item(&self, id: CartItemId, quantity: u32) -> Result<CartItem, ApiError> {
        self.patch(&keys::cart_item(id), &UpdateCartItem { quantity })
            .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove_cart_item(&self, id: CartItemId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &keys::cart_item(id)).await
    }
}
