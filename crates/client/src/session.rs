//! Session manager: the client's belief about who is signed in.
//!
//! One explicitly constructed [`SessionManager`] per application, shared
//! through [`crate::AppState`]. State changes are broadcast over a `watch`
//! channel so route decisions can be re-evaluated on login and logout.
//!
//! # Lifecycle
//!
//! ```text
//! loading ──init() ok──▶ signed in ──logout() / 401──▶ anonymous
//!    │                      ▲                             │
//!    └──init() err──▶ anonymous ◀─────────────────────────┘
//!                           └──────login() / sign_in()────┘
//! ```
//!
//! Login is fail-closed (a failed credential exchange leaves the session
//! as it was). Logout is fail-open (local state is always cleared).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use artisan_bazaar_core::{Role, User};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::error::{ApiError, add_breadcrumb, clear_sentry_user, set_sentry_user};

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// Whether the initial identity request is still pending.
    pub loading: bool,
}

impl SessionState {
    /// Identity not yet resolved.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Identity resolved to `user` (or to nobody).
    #[must_use]
    pub const fn resolved(user: Option<User>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

/// Owns the session state and the operations that change it.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    cache: QueryCache,
    state: watch::Sender<SessionState>,
    init_started: AtomicBool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager in the loading state. Call [`SessionManager::init`]
    /// to resolve the identity.
    #[must_use]
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            inner: Arc::new(SessionInner {
                api,
                cache,
                state,
                init_started: AtomicBool::new(false),
            }),
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Resolve the current identity with a single "who am I" request.
    ///
    /// Only the first call sends a request; later calls return the current
    /// state. A failure (including 401) resolves to anonymous. The result is
    /// dropped if a login or logout already resolved the session.
    #[instrument(skip(self))]
    pub async fn init(&self) -> SessionState {
        if self.inner.init_started.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return self.current();
        }

        let user = match self.inner.api.me().await {
            Ok(user) => Some(user),
            Err(ApiError::Unauthorized) => {
                debug!("No active session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not resolve session, continuing anonymously");
                None
            }
        };

        let applied = self.inner.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            *state = SessionState::resolved(user.clone());
            true
        });

        if applied {
            if let Some(user) = &user {
                set_sentry_user(&user.id, Some(user.email.as_str()));
                info!(user_id = %user.id, role = %user.role, "Session restored");
            }
        } else {
            debug!("Session resolved elsewhere, discarding identity response");
        }

        self.current()
    }

    /// Record an identity from a successful credential exchange.
    ///
    /// Switching to a different user purges the cache, as logout does.
    pub fn login(&self, user: User) {
        let switched = self
            .inner
            .state
            .borrow()
            .user
            .as_ref()
            .is_some_and(|current| current.id != user.id);
        if switched {
            self.inner.cache.clear();
            info!(user_id = %user.id, "Identity changed, cache cleared");
        }

        set_sentry_user(&user.id, Some(user.email.as_str()));
        add_breadcrumb("auth", "Signed in", Some(&[("role", user.role.as_str())]));
        info!(user_id = %user.id, role = %user.role, "Signed in");

        self.inner.state.send_replace(SessionState::resolved(Some(user)));
    }

    /// Exchange credentials, then [`SessionManager::login`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the session is left unchanged.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<User, ApiError> {
        let user = self.inner.api.login(email, password).await?;
        self.login(user.clone());
        Ok(user)
    }

    /// End the session.
    ///
    /// Local identity and every cached resource are cleared even when the
    /// backend call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.inner.api.logout().await {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        self.clear("Signed out");
    }

    /// React to a 401 seen on any request: the session is gone.
    pub fn handle_unauthorized(&self) {
        if self.current().is_authenticated() {
            warn!("Session expired");
            self.clear("Session expired");
        } else {
            self.inner
                .state
                .send_if_modified(|state| std::mem::replace(&mut state.loading, false));
        }
    }

    /// Pass `result` through, handling a 401 on the way.
    ///
    /// # Errors
    ///
    /// Returns `result`'s error unchanged.
    pub fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.handle_unauthorized();
        }
        result
    }

    fn clear(&self, reason: &str) {
        self.inner.state.send_replace(SessionState::resolved(None));
        self.inner.cache.clear();
        clear_sentry_user();
        add_breadcrumb("auth", reason, None);
        info!(reason, "Session cleared");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisan_bazaar_core::{Email, UserId};

    use super::*;
    use crate::config::{CacheConfig, ClientConfig};

    /// A manager whose backend refuses connections.
    fn offline() -> (SessionManager, QueryCache) {
        let config = ClientConfig::new("http://127.0.0.1:9/").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let cache = QueryCache::new(&CacheConfig::default());
        (SessionManager::new(api, cache.clone()), cache)
    }

    fn buyer() -> User {
        User {
            id: UserId::new(7).unwrap(),
            name: "Ines Ward".to_string(),
            email: Email::parse("ines@bazaar.example").unwrap(),
            role: Role::Buyer,
            profile_image: None,
        }
    }

    #[test]
    fn test_starts_loading_and_anonymous() {
        let (session, _) = offline();
        let state = session.current();
        assert!(state.loading);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_login_resolves_and_notifies() {
        let (session, _) = offline();
        let mut rx = session.subscribe();

        session.login(buyer());

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(state.role(), Some(Role::Buyer));
    }

    #[tokio::test]
    async fn test_init_failure_resolves_anonymous() {
        let (session, _) = offline();
        let state = session.init().await;
        assert_eq!(state, SessionState::resolved(None));
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite_login() {
        let (session, _) = offline();
        session.login(buyer());

        let state = session.init().await;
        assert_eq!(state.user, Some(buyer()));
    }

    #[tokio::test]
    async fn test_logout_is_fail_open() {
        let (session, cache) = offline();
        session.login(buyer());
        cache
            .fetch("/api/cart", || async { Ok::<_, ApiError>(3_u32) }, cache.default_options())
            .await
            .unwrap();

        session.logout().await;

        assert_eq!(session.current(), SessionState::resolved(None));
        assert!(cache.peek::<u32>("/api/cart").is_none());
    }

    #[test]
    fn test_unauthorized_clears_identity_and_cache() {
        let (session, cache) = offline();
        session.login(buyer());

        let result: Result<(), _> = session.observe(Err(ApiError::Unauthorized));

        assert!(result.is_err());
        assert!(!session.current().is_authenticated());
        assert_eq!(cache.entry_info("/api/cart"), None);
    }

    #[test]
    fn test_other_errors_leave_session_alone() {
        let (session, _) = offline();
        session.login(buyer());

        let _ = session.observe::<()>(Err(ApiError::Status {
            status: 500,
            message: String::new(),
        }));

        assert!(session.current().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_as_other_user_purges_cache() {
        let (session, cache) = offline();
        let options = cache.default_options();
        session.login(buyer());
        cache
            .fetch("/api/orders", || async { Ok::<_, ApiError>(2_u32) }, options)
            .await
            .unwrap();

        // Same identity again keeps what it already loaded.
        session.login(buyer());
        assert_eq!(cache.peek::<u32>("/api/orders").as_deref(), Some(&2));

        let seller = User {
            id: UserId::new(2).unwrap(),
            name: "Oren Pike".to_string(),
            email: Email::parse("oren@bazaar.example").unwrap(),
            role: Role::Seller,
            profile_image: None,
        };
        session.login(seller);

        assert!(cache.peek::<u32>("/api/orders").is_none());
        assert_eq!(session.current().role(), Some(Role::Seller));
    }
}
