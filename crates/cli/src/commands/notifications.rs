//! Notification commands.

use artisan_bazaar_client::AppState;
use artisan_bazaar_client::views::notifications::{self, badge_label, unread_count};
use artisan_bazaar_core::NotificationId;

use super::{CommandError, print_list};

pub async fn list(state: &AppState) {
    let list = notifications::load(state).await;
    if let Some(label) = badge_label(unread_count(list.items())) {
        tracing::info!("{label} unread");
    }
    print_list("notifications", &list, |n| {
        let marker = if n.read { " " } else { "•" };
        let link = n.link.as_deref().map(|l| format!(" ({l})")).unwrap_or_default();
        format!("{marker} #{:<5} {}{link}", n.id, n.message)
    });
}

pub async fn mark_read(state: &AppState, id: NotificationId) -> Result<(), CommandError> {
    notifications::mark_read(state, id).await?;
    tracing::info!("Notification #{id} marked read");
    Ok(())
}
