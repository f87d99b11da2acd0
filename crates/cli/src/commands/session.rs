//! Session commands.
//!
//! # Environment Variables
//!
//! - `BAZAAR_EMAIL` - Account email used when no session cookie is present
//! - `BAZAAR_PASSWORD` - Account password

use artisan_bazaar_client::AppState;
use artisan_bazaar_client::guard::{GuardDecision, guard, navigation, settle};
use artisan_bazaar_core::User;
use secrecy::SecretString;

use super::CommandError;

/// Resolve the session, signing in with environment credentials if needed.
pub async fn ensure_signed_in(state: &AppState) -> Result<User, CommandError> {
    let session = state.session().init().await;
    if let Some(user) = session.user {
        return Ok(user);
    }

    let (Ok(email), Ok(password)) = (
        std::env::var("BAZAAR_EMAIL"),
        std::env::var("BAZAAR_PASSWORD"),
    ) else {
        return Err(CommandError::NotSignedIn);
    };

    let password = SecretString::from(password);
    Ok(state.session().sign_in(&email, &password).await?)
}

/// Show the signed-in user and their navigation.
pub async fn whoami(state: &AppState) -> Result<(), CommandError> {
    let user = ensure_signed_in(state).await?;

    tracing::info!("{} ({}) <{}>", user.name, user.role, user.email);
    for entry in navigation(user.role) {
        tracing::info!("  {:<24} {}", entry.label, entry.path);
    }
    Ok(())
}

/// Sign out. Local state is cleared even if the backend call fails.
pub async fn logout(state: &AppState) -> Result<(), CommandError> {
    ensure_signed_in(state).await?;
    state.session().logout().await;
    tracing::info!("Signed out");
    Ok(())
}

/// Show the guard decision for `path`, and where it finally lands.
pub async fn route(state: &AppState, path: &str) {
    if let Err(e) = ensure_signed_in(state).await {
        tracing::info!("Checking as anonymous: {e}");
    }
    let session = state.session().current();

    match guard(path, &session) {
        GuardDecision::Allow => tracing::info!("{path}: allowed"),
        GuardDecision::Pending => tracing::info!("{path}: waiting for session"),
        GuardDecision::Redirect(target) => {
            let landing = settle(path, &session);
            tracing::info!("{path}: redirect to {target} (lands on {})", landing.path);
        }
    }
}
