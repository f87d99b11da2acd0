//! Application state shared across views.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionManager;

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and bundles the one API
/// client, query cache, and session manager of the process. Nothing in the
/// crate keeps global state; pass this where it is needed.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    cache: QueryCache,
    session: SessionManager,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new application state. The session starts out loading; call
    /// `session().init()` to resolve it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let cache = QueryCache::new(&config.cache);
        let session = SessionManager::new(api.clone(), cache.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cache,
                session,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Get a reference to the session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }
}
