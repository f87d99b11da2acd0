//! Admin moderation: users and listings.

use artisan_bazaar_core::{ProductId, Role, User};
use tracing::{info, instrument};

use super::{ListState, load_list, mutation};
use crate::api::keys;
use crate::error::{Notice, ViewError, add_breadcrumb};
use crate::state::AppState;

/// Role filter of the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Only(Role),
}

impl RoleFilter {
    #[must_use]
    pub fn matches(self, user: &User) -> bool {
        match self {
            Self::All => true,
            Self::Only(role) => user.role == role,
        }
    }
}

/// Count of users per role, for the dashboard header.
#[must_use]
pub fn role_counts(users: &[User]) -> [(Role, usize); 3] {
    Role::ALL.map(|role| (role, users.iter().filter(|u| u.role == role).count()))
}

/// All users, filtered by role.
pub async fn users(state: &AppState, filter: RoleFilter) -> ListState<User> {
    let api = state.api().clone();
    load_list(state, keys::ADMIN_USERS, move || async move {
        api.admin_users().await
    })
    .await
    .filter(|user| filter.matches(user))
}

/// Take a listing down. Every product listing is invalidated.
///
/// # Errors
///
/// Returns the translated backend error.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn remove_listing(state: &AppState, id: ProductId) -> Result<Notice, ViewError> {
    mutation(state, &[keys::PRODUCTS], state.api().remove_listing(id)).await?;

    let product_id = id.to_string();
    add_breadcrumb("admin", "Removed listing", Some(&[("product_id", product_id.as_str())]));
    info!(product_id = %id, "Listing removed");
    Ok(Notice::success("Listing removed."))
}
