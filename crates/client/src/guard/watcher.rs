//! Re-evaluates the guard whenever the path or the session changes.

use tokio::sync::watch;

use super::{GuardDecision, guard};
use crate::session::SessionState;

/// Tracks the current path and re-runs [`guard`] on every change.
///
/// ```rust,ignore
/// let mut watcher = RouteWatcher::new(state.session().subscribe(), "/cart");
/// apply(watcher.decision());
/// while let Some(decision) = watcher.changed().await {
///     apply(decision);
/// }
/// ```
#[derive(Debug)]
pub struct RouteWatcher {
    session: watch::Receiver<SessionState>,
    path: String,
}

impl RouteWatcher {
    #[must_use]
    pub fn new(session: watch::Receiver<SessionState>, path: impl Into<String>) -> Self {
        Self {
            session,
            path: path.into(),
        }
    }

    /// Path currently shown.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decision for the current path and the latest session state.
    #[must_use]
    pub fn decision(&mut self) -> GuardDecision {
        let session = self.session.borrow_and_update();
        guard(&self.path, &session)
    }

    /// Move to `path` and decide it.
    pub fn navigate(&mut self, path: impl Into<String>) -> GuardDecision {
        self.path = path.into();
        self.decision()
    }

    /// Wait for the next session change and decide the current path again.
    ///
    /// Returns `None` once the session manager is gone.
    pub async fn changed(&mut self) -> Option<GuardDecision> {
        self.session.changed().await.ok()?;
        Some(self.decision())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisan_bazaar_core::{Email, Role, User, UserId};

    use super::*;

    fn seller() -> User {
        User {
            id: UserId::new(9).unwrap(),
            name: "Oren Pike".to_string(),
            email: Email::parse("oren@bazaar.example").unwrap(),
            role: Role::Seller,
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn test_session_changes_reevaluate_current_path() {
        let (tx, rx) = watch::channel(SessionState::loading());
        let mut watcher = RouteWatcher::new(rx, "/dashboard/seller/products");
        assert_eq!(watcher.decision(), GuardDecision::Pending);

        tx.send_replace(SessionState::resolved(Some(seller())));
        assert_eq!(watcher.changed().await, Some(GuardDecision::Allow));

        tx.send_replace(SessionState::resolved(None));
        assert_eq!(
            watcher.changed().await,
            Some(GuardDecision::Redirect(
                "/auth?redirect=/dashboard/seller/products".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_navigation_uses_latest_session() {
        let (tx, rx) = watch::channel(SessionState::resolved(Some(seller())));
        let mut watcher = RouteWatcher::new(rx, "/");

        assert_eq!(
            watcher.navigate("/dashboard/buyer"),
            GuardDecision::Redirect("/".to_string())
        );
        assert_eq!(watcher.path(), "/dashboard/buyer");

        drop(tx);
        assert_eq!(watcher.changed().await, None);
    }
}
