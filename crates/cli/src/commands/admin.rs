//! Moderation commands.

use artisan_bazaar_client::AppState;
use artisan_bazaar_client::views::admin::{self, RoleFilter, role_counts};
use artisan_bazaar_core::{ProductId, Role};

use super::{CommandError, print_list, report};

pub async fn users(state: &AppState, role: Option<Role>) {
    let filter = role.map_or(RoleFilter::All, RoleFilter::Only);
    let list = admin::users(state, filter).await;

    if filter == RoleFilter::All {
        let counts: Vec<String> = role_counts(list.items())
            .iter()
            .map(|(role, count)| format!("{count} {role}"))
            .collect();
        tracing::info!("{}", counts.join(", "));
    }
    print_list("users", &list, |user| {
        format!("#{:<5} {:<8} {} <{}>", user.id, user.role, user.name, user.email)
    });
}

pub async fn remove_listing(state: &AppState, id: ProductId) -> Result<(), CommandError> {
    report(&admin::remove_listing(state, id).await?);
    Ok(())
}
