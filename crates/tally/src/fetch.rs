// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Caching of expensive page fetches.

use std::sync::Arc;
use std::time::Duration;

use layered::{Service, Stack};
use tally_store::{Error, ErrorKind, KeyedStore};
use tick::Clock;

use crate::builder::FetchCacheBuilder;
use crate::decode;
use crate::instrument::{CountCalls, CountCallsLayer, PrefixedKey};
use crate::telemetry;
use crate::wrapper::StoreWrapper;

/// Prefix of the per-URL access counters.
pub const ACCESS_COUNT_PREFIX: &str = "count:";

/// Prefix of the keys cached pages are stored under.
pub const CACHED_PAGE_PREFIX: &str = "cached:";

/// The external fetch a [`FetchCache`] fronts: URL in, page body out.
///
/// Any [`Service`] with that shape qualifies, including closures wrapped in
/// [`layered::Execute`]. Failures should carry [`ErrorKind::Fetch`]; other kinds are
/// wrapped into it.
pub trait PageFetcher: Service<String, Out = Result<String, Error>> {}

impl<T> PageFetcher for T where T: Service<String, Out = Result<String, Error>> {}

/// Base operation behind [`FetchCache::fetch_page`]: serve from cache or fetch and cache.
#[derive(Debug)]
pub(crate) struct CachedFetch<St, F> {
    store: St,
    fetcher: F,
    ttl: Duration,
}

impl<St, F> Service<String> for CachedFetch<St, F>
where
    St: KeyedStore,
    F: PageFetcher,
{
    type Out = Result<String, Error>;

    async fn execute(&self, url: String) -> Self::Out {
        let cache_key = format!("{CACHED_PAGE_PREFIX}{url}");

        if let Some(page) = self.store.get(&cache_key).await? {
            tracing::debug!(url = url.as_str(), "cache.hit");
            return decode::utf8(page);
        }
        tracing::debug!(url = url.as_str(), "cache.miss");

        let page = match self.fetcher.execute(url.clone()).await {
            Ok(page) => page,
            Err(err) => {
                let cause = telemetry::cause_chain(&err);
                tracing::warn!(
                    url = url.as_str(),
                    error.kind = err.kind().as_str(),
                    error.cause = cause.as_str(),
                    "fetch failed"
                );
                return Err(if err.kind() == ErrorKind::Fetch { err } else { Error::fetch(err) });
            }
        };

        self.store
            .put(&cache_key, page.clone().into_bytes(), Some(self.ttl))
            .await?;
        Ok(page)
    }
}

type SharedStore<S> = Arc<StoreWrapper<S>>;

/// A cache in front of an expensive page fetch.
///
/// Each [`fetch_page`](Self::fetch_page) call first increments the URL's access
/// counter under `count:{url}`. A page cached under `cached:{url}` is returned without
/// fetching; otherwise the page is fetched and cached for the configured TTL (10
/// seconds by default). Failed fetches are not cached, but they are counted.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use layered::Execute;
/// use tally::{FetchCache, InMemoryStore};
/// use tick::ClockControl;
///
/// # futures::executor::block_on(async {
/// let control = ClockControl::new();
/// let clock = control.to_clock();
/// let fetcher = Execute::new(|url: String| async move { Ok::<_, tally::Error>(format!("<p>{url}</p>")) });
/// let pages = FetchCache::new(InMemoryStore::new(clock.clone()), fetcher, clock);
///
/// assert_eq!(pages.fetch_page("http://example.com").await?, "<p>http://example.com</p>");
/// assert_eq!(pages.fetch_page("http://example.com").await?, "<p>http://example.com</p>");
/// assert_eq!(pages.access_count("http://example.com").await?, 2);
/// # Ok::<(), tally::Error>(())
/// # });
/// ```
#[derive(Debug)]
pub struct FetchCache<S, F> {
    store: SharedStore<S>,
    service: CountCalls<CachedFetch<SharedStore<S>, F>, SharedStore<S>, PrefixedKey>,
    ttl: Duration,
}

impl<S, F> FetchCache<S, F>
where
    S: KeyedStore,
    F: PageFetcher,
{
    /// Creates a page cache with default settings.
    #[must_use]
    pub fn new(store: S, fetcher: F, clock: Clock) -> Self {
        Self::builder(store, fetcher, clock).build()
    }

    /// Creates a builder for a page cache.
    ///
    /// `clock` drives both the store timeout and page expiry in stores that
    /// evaluate TTL against it.
    #[must_use]
    pub fn builder(store: S, fetcher: F, clock: Clock) -> FetchCacheBuilder<S, F> {
        FetchCacheBuilder::new(store, fetcher, clock)
    }

    pub(crate) fn from_parts(store: StoreWrapper<S>, fetcher: F, ttl: Duration) -> Self {
        let store = Arc::new(store);
        let cached_fetch = CachedFetch {
            store: Arc::clone(&store),
            fetcher,
            ttl,
        };
        let service = (
            CountCallsLayer::new(Arc::clone(&store), PrefixedKey::new(ACCESS_COUNT_PREFIX)),
            cached_fetch,
        )
            .into_service();

        Self { store, service, ttl }
    }

    /// Returns the page at `url`, from cache when possible.
    ///
    /// # Errors
    ///
    /// Fails with a fetch error if the page had to be fetched and the fetch failed, or
    /// with a store error if the store is unavailable.
    pub async fn fetch_page(&self, url: impl Into<String>) -> Result<String, Error> {
        self.service.execute(url.into()).await
    }

    /// Returns how many times `url` has been requested, or 0 if never.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable.
    pub async fn access_count(&self, url: &str) -> Result<i64, Error> {
        let key = format!("{ACCESS_COUNT_PREFIX}{url}");
        Ok(self.store.get(&key).await?.map(decode::integer).transpose()?.unwrap_or_default())
    }

    /// Returns how long fetched pages stay cached.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the bounded, logging store the cache writes through.
    #[must_use]
    pub fn store_handle(&self) -> &StoreWrapper<S> {
        &self.store
    }
}
