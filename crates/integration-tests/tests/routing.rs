//! Integration tests for route guarding driven by real session changes.
//!
//! Run with: cargo test -p artisan-bazaar-integration-tests --test routing

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use artisan_bazaar_client::guard::{self, GuardDecision, RouteWatcher, navigation};
use artisan_bazaar_client::views::{ViewScope, notifications};
use artisan_bazaar_core::Role;
use artisan_bazaar_integration_tests::{
    ADMIN_EMAIL, BUYER_EMAIL, MockBackend, PASSWORD, SELLER_EMAIL,
};
use secrecy::SecretString;

#[tokio::test]
async fn test_protected_route_waits_for_identity() {
    let backend = MockBackend::start().await;
    backend.delay_me(Duration::from_millis(100));
    let state = backend.client();
    let mut watcher = RouteWatcher::new(state.session().subscribe(), "/dashboard/buyer");

    assert_eq!(watcher.decision(), GuardDecision::Pending);

    let session = state.session().clone();
    tokio::spawn(async move { session.init().await });

    assert_eq!(
        watcher.changed().await,
        Some(GuardDecision::Redirect(
            "/auth?redirect=/dashboard/buyer".to_string()
        ))
    );
}

#[tokio::test]
async fn test_watcher_follows_login_and_logout() {
    let backend = MockBackend::start().await;
    let state = backend.client();
    state.session().init().await;

    let mut watcher = RouteWatcher::new(state.session().subscribe(), "/auth?redirect=/cart");
    assert_eq!(watcher.decision(), GuardDecision::Allow);

    state
        .session()
        .sign_in(BUYER_EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert_eq!(
        watcher.changed().await,
        Some(GuardDecision::Redirect("/cart".to_string()))
    );

    assert_eq!(watcher.navigate("/cart"), GuardDecision::Allow);

    state.session().logout().await;
    assert_eq!(
        watcher.changed().await,
        Some(GuardDecision::Redirect("/auth?redirect=/cart".to_string()))
    );
}

#[tokio::test]
async fn test_expired_session_sends_user_to_login() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;
    let mut watcher = RouteWatcher::new(state.session().subscribe(), "/notifications");
    assert_eq!(watcher.decision(), GuardDecision::Allow);

    backend.expire_sessions();
    notifications::load(&state).await;

    assert_eq!(
        watcher.changed().await,
        Some(GuardDecision::Redirect(
            "/auth?redirect=/notifications".to_string()
        ))
    );
}

#[tokio::test]
async fn test_each_role_lands_on_its_dashboard() {
    let backend = MockBackend::start().await;

    for (email, role) in [
        (BUYER_EMAIL, Role::Buyer),
        (SELLER_EMAIL, Role::Seller),
        (ADMIN_EMAIL, Role::Admin),
    ] {
        let state = backend.signed_in(email).await;
        let session = state.session().current();

        let landing = guard::settle("/dashboard", &session);
        assert_eq!(landing.path, role.dashboard_path());
        assert_eq!(landing.decision, GuardDecision::Allow);

        for entry in navigation(role) {
            assert_eq!(guard::guard(entry.path, &session), GuardDecision::Allow);
        }
    }
}

#[tokio::test]
async fn test_unmounted_view_discards_late_result() {
    let backend = MockBackend::start().await;
    backend.delay_me(Duration::from_millis(200));
    let state = backend.client();
    let scope = ViewScope::new();

    let session = state.session().clone();
    let task_scope = scope.clone();
    let task = tokio::spawn(async move { task_scope.run(session.init()).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    scope.unmount();

    assert_eq!(task.await.unwrap(), None);
    assert!(!scope.is_mounted());
}
