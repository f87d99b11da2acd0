//! Notification bell and list.

use artisan_bazaar_core::{Notification, NotificationId};
use tracing::instrument;

use super::{ListState, load_list, mutation};
use crate::api::keys;
use crate::error::ViewError;
use crate::state::AppState;

/// Number of unread notifications.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Bell label: `None` when everything is read, capped at "9+".
#[must_use]
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        1..=9 => Some(unread.to_string()),
        _ => Some("9+".to_string()),
    }
}

/// The signed-in user's notifications.
pub async fn load(state: &AppState) -> ListState<Notification> {
    let api = state.api().clone();
    load_list(state, keys::NOTIFICATIONS, move || async move {
        api.notifications().await
    })
    .await
}

/// Mark one notification read.
///
/// # Errors
///
/// Returns the translated backend error.
#[instrument(skip(state), fields(notification_id = %id))]
pub async fn mark_read(state: &AppState, id: NotificationId) -> Result<(), ViewError> {
    mutation(state, &[keys::NOTIFICATIONS], state.api().mark_notification_read(id)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn notification(id: i64, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id).unwrap(),
            message: format!("Update {id}"),
            read,
            link: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unread_count() {
        let list = [notification(1, false), notification(2, true), notification(3, false)];
        assert_eq!(unread_count(&list), 2);
        assert_eq!(unread_count(&[]), 0);
    }

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(3).as_deref(), Some("3"));
        assert_eq!(badge_label(12).as_deref(), Some("9+"));
    }
}
