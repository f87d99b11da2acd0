//! Subcommand implementations.
//!
//! Output goes through `tracing` at `info` level, like every other message
//! the CLI prints.

pub mod admin;
pub mod notifications;
pub mod requests;
pub mod session;
pub mod shop;

use artisan_bazaar_client::views::ListState;
use artisan_bazaar_client::{ApiError, Notice, NoticeLevel, ViewError};
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The backend call failed outside a view.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A view rejected the operation.
    #[error("{0}")]
    View(#[from] ViewError),

    /// A command needs a session and none could be established.
    #[error("Not signed in. Set BAZAAR_EMAIL and BAZAAR_PASSWORD to sign in.")]
    NotSignedIn,
}

/// Log a notice at the level matching its severity.
fn report(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => tracing::info!("{}", notice.message),
        NoticeLevel::Warning => tracing::warn!("{}", notice.message),
        NoticeLevel::Error => tracing::error!("{}", notice.message),
    }
}

/// Log a list, one line per item, or say why there is nothing to show.
fn print_list<T>(what: &str, state: &ListState<T>, line: impl Fn(&T) -> String)
where
    T: Clone + Send + Sync + 'static,
{
    match state {
        ListState::Loading => tracing::info!("Loading {what}..."),
        ListState::Empty => tracing::info!("No {what}."),
        ListState::Ready(items) => {
            for item in items {
                tracing::info!("{}", line(item));
            }
        }
        ListState::Failed { error, stale } => {
            if let Some(notice) = error.notice() {
                report(&notice);
            }
            if !stale.is_empty() {
                tracing::warn!("Showing {} cached {what}:", stale.len());
                for item in stale {
                    tracing::info!("{}", line(item));
                }
            }
        }
    }
}
