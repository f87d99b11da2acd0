//! Handles returned by cache reads.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{InFlight, downcast};
use crate::error::ApiError;

/// The result of [`QueryCache::get`](super::QueryCache::get): whatever data is
/// cached right now, plus the fetch that will replace it when it is stale.
#[must_use = "a query does nothing unless its data or pending fetch is used"]
pub struct Query<T> {
    data: Option<Arc<T>>,
    pending: Option<PendingFetch<T>>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub(super) const fn settled(data: Arc<T>) -> Self {
        Self {
            data: Some(data),
            pending: None,
        }
    }

    pub(super) const fn loading(stale: Option<Arc<T>>, pending: PendingFetch<T>) -> Self {
        Self {
            data: stale,
            pending: Some(pending),
        }
    }

    /// Cached data: fresh when nothing is pending, otherwise the previous value.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Whether a fetch is pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Split into the current data and the pending fetch.
    #[must_use]
    pub fn into_parts(self) -> (Option<Arc<T>>, Option<PendingFetch<T>>) {
        (self.data, self.pending)
    }

    /// Wait for the pending fetch, if any, and return the newest data.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; use [`Query::settle`] to keep stale data
    /// alongside it.
    pub async fn resolve(self) -> Result<Arc<T>, ApiError> {
        match (self.pending, self.data) {
            (Some(pending), _) => pending.wait().await,
            (None, Some(data)) => Ok(data),
            (None, None) => Err(ApiError::Parse("query has neither data nor a fetch".to_string())),
        }
    }

    /// Wait for the pending fetch, if any, keeping stale data on failure.
    pub async fn settle(self) -> QueryOutcome<T> {
        match self.pending {
            None => QueryOutcome {
                data: self.data,
                error: None,
            },
            Some(pending) => match pending.wait().await {
                Ok(fresh) => QueryOutcome {
                    data: Some(fresh),
                    error: None,
                },
                Err(error) => QueryOutcome {
                    data: self.data,
                    error: Some(error),
                },
            },
        }
    }
}

/// Settled query: the newest data available and the error, if the fetch failed.
#[derive(Debug)]
pub struct QueryOutcome<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
}

/// A handle on an in-flight fetch. Waiting on it joins the shared fetch; it
/// never starts a second request.
#[must_use = "a pending fetch only reports its result when awaited"]
pub struct PendingFetch<T> {
    key: String,
    in_flight: InFlight,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> PendingFetch<T> {
    pub(super) fn new(key: &str, in_flight: InFlight) -> Self {
        Self {
            key: key.to_owned(),
            in_flight,
            _marker: PhantomData,
        }
    }

    /// Cache key this fetch belongs to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the fetch to finish.
    ///
    /// # Errors
    ///
    /// Returns the fetch's error, or `ApiError::Parse` if another caller
    /// cached a different type under the same key.
    pub async fn wait(self) -> Result<Arc<T>, ApiError> {
        let value = self.in_flight.await?;
        downcast::<T>(&self.key, &value).ok_or_else(|| {
            ApiError::Parse(format!("cached value for {} has an unexpected type", self.key))
        })
    }
}

impl<T> std::fmt::Debug for PendingFetch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
