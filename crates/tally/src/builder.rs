// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builders for [`InstrumentedCache`] and [`FetchCache`].

use std::time::Duration;

use tally_store::KeyedStore;
use tick::Clock;

use crate::cache::InstrumentedCache;
use crate::fetch::{FetchCache, PageFetcher};
use crate::wrapper::StoreWrapper;

/// Store calls that take longer than this fail as unavailable, unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a fetched page stays cached, unless configured otherwise.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(10);

/// Builder for [`InstrumentedCache`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tally::{InMemoryStore, InstrumentedCache};
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let cache = InstrumentedCache::builder(InMemoryStore::new(clock.clone()), clock)
///     .store_timeout(Duration::from_secs(1))
///     .build();
/// ```
#[derive(Debug)]
pub struct InstrumentedCacheBuilder<S> {
    store: S,
    clock: Clock,
    store_timeout: Duration,
}

impl<S> InstrumentedCacheBuilder<S>
where
    S: KeyedStore,
{
    pub(crate) fn new(store: S, clock: Clock) -> Self {
        Self {
            store,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Sets the upper bound on any single store call.
    #[must_use]
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> InstrumentedCache<S> {
        InstrumentedCache::from_store(StoreWrapper::new(self.store, self.clock, self.store_timeout))
    }
}

/// Builder for [`FetchCache`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use layered::Execute;
/// use tally::{FetchCache, InMemoryStore};
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let fetcher = Execute::new(|url: String| async move { Ok::<_, tally::Error>(format!("<p>{url}</p>")) });
/// let pages = FetchCache::builder(InMemoryStore::new(clock.clone()), fetcher, clock)
///     .ttl(Duration::from_secs(30))
///     .build();
/// assert_eq!(pages.ttl(), Duration::from_secs(30));
/// ```
#[derive(Debug)]
pub struct FetchCacheBuilder<S, F> {
    store: S,
    fetcher: F,
    clock: Clock,
    ttl: Duration,
    store_timeout: Duration,
}

impl<S, F> FetchCacheBuilder<S, F>
where
    S: KeyedStore,
    F: PageFetcher,
{
    pub(crate) fn new(store: S, fetcher: F, clock: Clock) -> Self {
        Self {
            store,
            fetcher,
            clock,
            ttl: DEFAULT_PAGE_TTL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Sets how long a fetched page stays cached.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the upper bound on any single store call.
    #[must_use]
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Builds the page cache.
    #[must_use]
    pub fn build(self) -> FetchCache<S, F> {
        FetchCache::from_parts(
            StoreWrapper::new(self.store, self.clock, self.store_timeout),
            self.fetcher,
            self.ttl,
        )
    }
}
