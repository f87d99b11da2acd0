//! Order endpoints.

use artisan_bazaar_core::Order;
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// Orders visible to the signed-in user (a buyer's purchases or a
    /// seller's sales; the backend scopes by role).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(keys::ORDERS).await
    }

    /// Place an order for the current cart contents.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Order, ApiError> {
        self.post(keys::ORDERS, &serde_json::json!({})).await
    }
}
