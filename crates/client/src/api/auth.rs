//! Authentication endpoints.

use artisan_bazaar_core::{Credentials, User};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

impl ApiClient {
    /// Who am I: the identity behind the current session cookie.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when there is no session.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(keys::ME).await
    }

    /// Exchange credentials for a session cookie and the signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` (or a 4xx status) for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, ApiError> {
        let credentials = Credentials {
            email,
            password: password.expose_secret(),
        };
        self.post(keys::LOGIN, &credentials).await
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend could not be reached or refused.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send_empty(Method::POST, keys::LOGOUT).await
    }
}
