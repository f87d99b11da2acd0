//! Product modification request endpoints.

use artisan_bazaar_core::{
    ModificationRequest, ModificationRequestId, NewModificationRequest, ReviewModificationRequest,
};
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// Submit a modification request to a product's seller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn submit_modification_request(
        &self,
        request: &NewModificationRequest,
    ) -> Result<ModificationRequest, ApiError> {
        self.post(keys::MODIFICATION_REQUESTS, request).await
    }

    /// Requests the signed-in buyer has submitted.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn buyer_modification_requests(&self) -> Result<Vec<ModificationRequest>, ApiError> {
        self.get(keys::BUYER_MODIFICATION_REQUESTS).await
    }

    /// Requests addressed to the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn seller_modification_requests(
        &self,
    ) -> Result<Vec<ModificationRequest>, ApiError> {
        self.get(keys::SELLER_MODIFICATION_REQUESTS).await
    }

    /// Approve or reject a request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, review), fields(request_id = %id))]
    pub async fn review_modification_request(
        &self,
        id: ModificationRequestId,
        review: &ReviewModificationRequest,
    ) -> Result<ModificationRequest, ApiError> {
        self.patch(&keys::modification_request(id), review).await
    }
}
