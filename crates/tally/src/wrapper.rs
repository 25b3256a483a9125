// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Wrapper that bounds and logs every store call.
//!
//! [`StoreWrapper`] decorates any [`KeyedStore`] so that no call can hang: each one
//! races a timer on the configured [`Clock`] and fails with
//! [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable) when the timer
//! wins. Every call also emits one structured `store.event`.

use std::time::Duration;

use tally_store::{Error, KeyedStore};
use tick::{Clock, FutureExt};

use crate::telemetry::{self, StoreOperation, StoreOutcome};

/// Wraps a store with a per-call timeout and logging.
///
/// It implements [`KeyedStore`] itself, so it can be used anywhere the inner store
/// can. Builders create it for you; construct one directly to share a bounded store
/// between several caches.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tally::StoreWrapper;
/// use tally_memory::InMemoryStore;
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let store = StoreWrapper::new(InMemoryStore::new(clock.clone()), clock, Duration::from_secs(1));
/// assert_eq!(store.timeout(), Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct StoreWrapper<S> {
    inner: S,
    clock: Clock,
    timeout: Duration,
}

impl<S> StoreWrapper<S> {
    /// Wraps `inner`, bounding each call by `timeout` as measured by `clock`.
    #[must_use]
    pub fn new(inner: S, clock: Clock, timeout: Duration) -> Self {
        Self { inner, clock, timeout }
    }

    /// Returns a reference to the wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run<T>(
        &self,
        operation: StoreOperation,
        key: Option<&str>,
        call: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        let stopwatch = self.clock.stopwatch();

        let (result, outcome) = match call.timeout(&self.clock, self.timeout).await {
            Ok(Ok(value)) => (Ok(value), StoreOutcome::Ok),
            Ok(Err(err)) => (Err(err), StoreOutcome::Error),
            Err(elapsed) => (Err(Error::store_unavailable(elapsed)), StoreOutcome::Timeout),
        };

        telemetry::emit(operation, key, outcome, stopwatch.elapsed());
        result
    }
}

impl<S> KeyedStore for StoreWrapper<S>
where
    S: KeyedStore,
{
    async fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), Error> {
        self.run(StoreOperation::Put, Some(key), self.inner.put(key, payload, ttl)).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.run(StoreOperation::Get, Some(key), self.inner.get(key)).await
    }

    async fn increment(&self, key: &str) -> Result<i64, Error> {
        self.run(StoreOperation::Increment, Some(key), self.inner.increment(key)).await
    }

    async fn append_to_list(&self, key: &str, item: Vec<u8>) -> Result<(), Error> {
        self.run(StoreOperation::Append, Some(key), self.inner.append_to_list(key, item))
            .await
    }

    async fn read_list(&self, key: &str) -> Result<Vec<Vec<u8>>, Error> {
        self.run(StoreOperation::ReadList, Some(key), self.inner.read_list(key)).await
    }

    async fn flush_all(&self) -> Result<(), Error> {
        self.run(StoreOperation::FlushAll, None, self.inner.flush_all()).await
    }

    fn len(&self) -> Option<u64> {
        self.inner.len()
    }
}
