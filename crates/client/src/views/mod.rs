//! View-models for the marketplace screens.
//!
//! Each view is a function of its own local state and queried server data.
//! Reads go through [`QueryCache::get`](crate::cache::QueryCache::get);
//! writes go through [`QueryCache::mutate`](crate::cache::QueryCache::mutate)
//! so that dependent resources are invalidated only when the write succeeds.
//! A 401 from either path is handed to the session manager.

pub mod admin;
pub mod cart;
pub mod modification_requests;
pub mod notifications;
pub mod orders;
pub mod product_card;
mod scope;

use std::future::Future;

use artisan_bazaar_core::StatusTreatment;

use crate::cache::{Query, QueryOutcome};
use crate::error::{ApiError, ViewError};
use crate::state::AppState;

pub use scope::ViewScope;

/// What a list screen shows.
///
/// An empty result is its own state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    /// Nothing cached yet and a fetch is pending.
    Loading,
    /// The backend returned no items.
    Empty,
    /// Items to render.
    Ready(Vec<T>),
    /// The fetch failed. `stale` holds whatever was cached before, which
    /// may still be rendered under the error.
    Failed { error: ViewError, stale: Vec<T> },
}

impl<T: Clone + Send + Sync + 'static> ListState<T> {
    /// `Empty` or `Ready`, depending on `items`.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Ready(items)
        }
    }

    /// State to render right away, without waiting on a pending fetch.
    #[must_use]
    pub fn from_query(query: &Query<Vec<T>>) -> Self {
        match query.data() {
            Some(items) => Self::from_items(items.clone()),
            None if query.is_loading() => Self::Loading,
            None => Self::Empty,
        }
    }

    /// State once the query has settled.
    #[must_use]
    pub fn from_outcome(outcome: QueryOutcome<Vec<T>>) -> Self {
        let items = outcome.data.map(|items| items.as_ref().clone());
        match outcome.error {
            Some(error) => Self::Failed {
                error: ViewError::from_api(&error),
                stale: items.unwrap_or_default(),
            },
            None => Self::from_items(items.unwrap_or_default()),
        }
    }

    /// Keep only the items matching `predicate`. An emptied `Ready` becomes
    /// `Empty`.
    #[must_use]
    pub fn filter(self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        match self {
            Self::Ready(mut items) => {
                items.retain(|item| predicate(item));
                Self::from_items(items)
            }
            Self::Failed { error, mut stale } => {
                stale.retain(|item| predicate(item));
                Self::Failed { error, stale }
            }
            other => other,
        }
    }

    /// Items to render, stale or not.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Ready(items) | Self::Failed { stale: items, .. } => items,
            Self::Loading | Self::Empty => &[],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// A status badge: display label plus visual treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub treatment: StatusTreatment,
}

impl StatusBadge {
    /// Badge for a wire status string (e.g. `"in_review"` -> "In review").
    #[must_use]
    pub fn new(status: &str, treatment: StatusTreatment) -> Self {
        Self {
            label: humanize(status),
            treatment,
        }
    }
}

fn humanize(status: &str) -> String {
    let words = status.trim().replace(['_', '-'], " ");
    let mut chars = words.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Read a list through the cache and settle it into a [`ListState`].
async fn load_list<T, F, Fut>(state: &AppState, key: &str, fetcher: F) -> ListState<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
{
    let cache = state.cache();
    let outcome = cache.get(key, fetcher, cache.default_options()).settle().await;
    if outcome.error.as_ref().is_some_and(ApiError::is_unauthorized) {
        state.session().handle_unauthorized();
    }
    ListState::from_outcome(outcome)
}

/// Run a write that affects the resources under `affects`.
async fn mutation<T, Fut>(state: &AppState, affects: &[&str], operation: Fut) -> Result<T, ViewError>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    let result = state.cache().mutate(affects, operation).await;
    state
        .session()
        .observe(result)
        .map_err(|e| ViewError::from_api(&e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_outcome_distinguishes_empty_from_failed() {
        let empty = ListState::<u32>::from_outcome(QueryOutcome {
            data: Some(Arc::new(Vec::new())),
            error: None,
        });
        assert_eq!(empty, ListState::Empty);

        let failed = ListState::<u32>::from_outcome(QueryOutcome {
            data: Some(Arc::new(vec![1, 2])),
            error: Some(ApiError::Status {
                status: 409,
                message: "conflict".to_string(),
            }),
        });
        assert_eq!(failed.items(), &[1, 2]);
        assert!(matches!(
            failed,
            ListState::Failed {
                error: ViewError::OperationFailed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_filter_to_nothing_is_empty() {
        let state = ListState::from_items(vec![1, 3, 5]);
        assert_eq!(state.clone().filter(|n| *n > 2), ListState::Ready(vec![3, 5]));
        assert_eq!(state.filter(|n| *n > 9), ListState::Empty);
    }

    #[test]
    fn test_humanize_status() {
        assert_eq!(humanize("awaiting_pickup"), "Awaiting pickup");
        assert_eq!(humanize("shipped"), "Shipped");
        assert_eq!(humanize(""), "");
    }
}
