//! Admin moderation endpoints.

use artisan_bazaar_core::{ProductId, User};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// Every registered user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 403 for non-admins.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<User>, ApiError> {
        self.get(keys::ADMIN_USERS).await
    }

    /// Take down a product listing. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_listing(&self, id: ProductId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &keys::admin_product(id))
            .await
    }
}
