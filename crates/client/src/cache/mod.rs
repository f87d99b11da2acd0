//! Query cache for backend resources.
//!
//! Resources are keyed by their request path (see [`crate::api::keys`]).
//! Each key holds the last successful response plus freshness metadata, and
//! at most one in-flight fetch.
//!
//! # Guarantees
//!
//! - **Coalescing**: while a fetch for a key is in flight, further `get`
//!   calls join it instead of issuing another request.
//! - **Stale-response suppression**: every fetch gets a generation number.
//!   A response is stored only if its generation is still the latest for its
//!   key; responses from superseded, invalidated, or purged fetches are
//!   returned to their own callers but never written back.
//! - **Errors are relayed, not swallowed**: a failed fetch leaves the previous
//!   value in place and hands the error to the caller next to it.
//!
//! Storage is a capacity-bounded `moka` cache with an idle horizon; the
//! freshness window (`stale_time`) is tracked per entry on the Tokio clock.
//! Fetch bookkeeping lives in a slot per key that exists only while a fetch
//! for that key is in flight.

mod query;

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use moka::sync::Cache;
use tokio::time::Instant;
use tracing::debug;

use crate::api::keys;
use crate::config::{CacheConfig, MAX_DURATION_SECS};
use crate::error::ApiError;

pub use query::{PendingFetch, Query, QueryOutcome};

/// A type-erased cached response.
type CachedValue = Arc<dyn Any + Send + Sync>;

/// Result of one fetch, shared by every caller that joined it.
type FetchOutcome = Result<CachedValue, ApiError>;

/// A fetch in flight. Cloning joins it.
type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;

/// Per-query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a response counts as fresh after it arrives.
    pub stale_time: Duration,
}

impl QueryOptions {
    /// Options with the given freshness window.
    #[must_use]
    pub const fn stale_after(stale_time: Duration) -> Self {
        Self { stale_time }
    }

    /// Options under which every read refetches.
    #[must_use]
    pub const fn always_stale() -> Self {
        Self {
            stale_time: Duration::ZERO,
        }
    }
}

/// Freshness metadata for a cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntryInfo {
    /// When the response arrived.
    pub fetched_at: DateTime<Utc>,
    /// Whether the next read will refetch.
    pub stale: bool,
}

#[derive(Clone)]
struct Entry {
    value: CachedValue,
    fetched_at: DateTime<Utc>,
    stale_until: Instant,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.stale_until
    }
}

/// Bookkeeping for a key with a fetch in flight.
#[derive(Default)]
struct Slot {
    /// Generation of the newest fetch for this key.
    generation: u64,
    in_flight: Option<InFlight>,
}

/// Process-wide query cache.
///
/// Cheap to clone; clones share storage. All operations are non-blocking.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

struct Inner {
    store: Cache<String, Entry>,
    slots: Mutex<HashMap<String, Slot>>,
    generations: AtomicU64,
    defaults: QueryOptions,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.store.entry_count())
            .field("defaults", &self.inner.defaults)
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let store = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(config.idle_timeout.min(max_duration()))
            .build();

        Self {
            inner: Arc::new(Inner {
                store,
                slots: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
                defaults: QueryOptions::stale_after(config.stale_time),
            }),
        }
    }

    /// Options built from the configured default stale time.
    #[must_use]
    pub fn default_options(&self) -> QueryOptions {
        self.inner.defaults
    }

    /// Read a resource.
    ///
    /// Fresh data is returned immediately with nothing pending. Otherwise the
    /// previous value (if any) is returned together with a handle on the
    /// fetch that will replace it: an already in-flight fetch is joined, or
    /// `fetcher` is called to start one. `fetcher` runs only when a new
    /// fetch starts, so it must not call back into the cache synchronously.
    ///
    /// Inside a Tokio runtime the fetch is driven by a spawned task, so it
    /// completes and is stored even if every caller drops its handle.
    pub fn get<T, F, Fut>(&self, key: &str, fetcher: F, options: QueryOptions) -> Query<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut slots = self.inner.lock_slots();
        let cached = self.inner.store.get(key);

        if let Some(entry) = &cached
            && entry.is_fresh(Instant::now())
            && let Some(data) = downcast::<T>(key, &entry.value)
        {
            debug!(key, "Cache hit");
            return Query::settled(data);
        }

        let slot = slots.entry(key.to_owned()).or_default();
        let in_flight = if let Some(in_flight) = slot.in_flight.clone() {
            debug!(key, generation = slot.generation, "Joining in-flight fetch");
            in_flight
        } else {
            self.start(slot, key, fetcher, options)
        };

        let stale = cached.and_then(|entry| downcast::<T>(key, &entry.value));
        Query::loading(stale, PendingFetch::new(key, in_flight))
    }

    /// Read a resource, waiting for a fetch when the cached copy is stale.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if a fetch was needed and failed.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: QueryOptions,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.get(key, fetcher, options).resolve().await
    }

    /// Start a new fetch for `key` even if one is in flight.
    ///
    /// The new fetch supersedes the old one: whichever order the responses
    /// arrive in, only this fetch's response is stored.
    pub fn refetch<T, F, Fut>(&self, key: &str, fetcher: F, options: QueryOptions) -> PendingFetch<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut slots = self.inner.lock_slots();
        let slot = slots.entry(key.to_owned()).or_default();
        let in_flight = self.start(slot, key, fetcher, options);
        PendingFetch::new(key, in_flight)
    }

    /// The cached value for `key`, fresh or not, without fetching.
    #[must_use]
    pub fn peek<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.inner
            .store
            .get(key)
            .and_then(|entry| downcast::<T>(key, &entry.value))
    }

    /// Freshness metadata for `key`, if anything is cached.
    #[must_use]
    pub fn entry_info(&self, key: &str) -> Option<CacheEntryInfo> {
        self.inner.store.get(key).map(|entry| CacheEntryInfo {
            fetched_at: entry.fetched_at,
            stale: !entry.is_fresh(Instant::now()),
        })
    }

    /// Whether a fetch for `key` is in flight.
    #[must_use]
    pub fn is_fetching(&self, key: &str) -> bool {
        self.inner
            .lock_slots()
            .get(key)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    /// Mark `key` stale so the next read refetches.
    ///
    /// The stale value stays readable until the refetch lands. A fetch that
    /// was in flight is detached: its callers still get its result, but it is
    /// not stored.
    pub fn invalidate(&self, key: &str) {
        let mut slots = self.inner.lock_slots();
        self.inner.mark_stale(&mut slots, key);
    }

    /// Invalidate `prefix` and every key under it (sub-paths and
    /// query-string variants).
    pub fn invalidate_prefix(&self, prefix: &str) {
        let mut slots = self.inner.lock_slots();

        let matching: BTreeSet<String> = slots
            .keys()
            .cloned()
            .chain(self.inner.store.iter().map(|(key, _)| (*key).clone()))
            .filter(|key| keys::is_under(key, prefix))
            .collect();

        for key in &matching {
            self.inner.mark_stale(&mut slots, key);
        }
        debug!(prefix, count = matching.len(), "Invalidated resources");
    }

    /// Run a write and, only if it succeeds, invalidate every resource it
    /// affects (each entry of `affects` is treated as a prefix).
    ///
    /// # Errors
    ///
    /// Returns the operation's error; the cache is left untouched.
    pub async fn mutate<T, Fut>(&self, affects: &[&str], operation: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let output = operation.await?;
        for prefix in affects {
            self.invalidate_prefix(prefix);
        }
        Ok(output)
    }

    /// Drop every cached resource and detach every in-flight fetch.
    ///
    /// Used on logout: cached data may be scoped to the previous identity.
    pub fn clear(&self) {
        let mut slots = self.inner.lock_slots();
        slots.clear();
        self.inner.store.invalidate_all();
        debug!("Query cache cleared");
    }

    fn start<T, F, Fut>(&self, slot: &mut Slot, key: &str, fetcher: F, options: QueryOptions) -> InFlight
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let generation = self.inner.next_generation();
        slot.generation = generation;
        debug!(key, generation, "Starting fetch");

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let owned_key = key.to_owned();
        let request = fetcher();

        let in_flight = async move {
            let outcome: FetchOutcome = request
                .await
                .map(|value| Arc::new(value) as CachedValue);
            if let Some(inner) = inner.upgrade() {
                inner.settle(&owned_key, generation, &outcome, options);
            }
            outcome
        }
        .boxed()
        .shared();

        slot.in_flight = Some(in_flight.clone());

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(in_flight.clone());
        }

        in_flight
    }
}

impl Inner {
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Store a fetch outcome if it is still the newest for its key.
    fn settle(&self, key: &str, generation: u64, outcome: &FetchOutcome, options: QueryOptions) {
        let mut slots = self.lock_slots();

        let Some(slot) = slots.get(key) else {
            debug!(key, generation, "Discarding response for detached fetch");
            return;
        };
        if slot.generation != generation {
            debug!(
                key,
                generation,
                latest = slot.generation,
                "Discarding superseded response"
            );
            return;
        }

        slots.remove(key);
        if let Ok(value) = outcome {
            let now = Instant::now();
            self.store.insert(
                key.to_owned(),
                Entry {
                    value: Arc::clone(value),
                    fetched_at: Utc::now(),
                    stale_until: now
                        .checked_add(options.stale_time)
                        .unwrap_or_else(|| now + max_duration()),
                },
            );
        }
    }

    /// Detach any in-flight fetch for `key` and mark its value stale.
    fn mark_stale(&self, slots: &mut HashMap<String, Slot>, key: &str) {
        slots.remove(key);
        if let Some(mut entry) = self.store.get(key) {
            entry.stale_until = Instant::now();
            self.store.insert(key.to_owned(), entry);
        }
    }
}

const fn max_duration() -> Duration {
    Duration::from_secs(MAX_DURATION_SECS)
}

fn downcast<T: Send + Sync + 'static>(key: &str, value: &CachedValue) -> Option<Arc<T>> {
    let typed = Arc::clone(value).downcast::<T>().ok();
    if typed.is_none() {
        tracing::warn!(key, "Cached value has a different type than requested");
    }
    typed
}

#[cfg(test)]
impl QueryCache {
    fn slot_count(&self) -> usize {
        self.inner.lock_slots().len()
    }
}
