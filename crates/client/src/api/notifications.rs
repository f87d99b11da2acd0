//! Notification endpoints.

use artisan_bazaar_core::{Notification, NotificationId};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// Notifications for the signed-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get(keys::NOTIFICATIONS).await
    }

    /// Mark a notification read.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &keys::notification_read(id))
            .await
    }
}
