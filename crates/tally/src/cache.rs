// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The instrumented cache.

use std::sync::Arc;

use layered::Service;
use tally_store::{Error, KeyedStore};
use tick::Clock;

use crate::builder::InstrumentedCacheBuilder;
use crate::instrument::{Instrumented, instrument};
use crate::replay::{Replay, Replayer};
use crate::wrapper::StoreWrapper;
use crate::{Key, OperationId, Payload, decode};

/// Base operation behind [`InstrumentedCache::store`]: puts the payload under a fresh key.
#[derive(Debug, Clone)]
pub(crate) struct PutPayload<St> {
    store: St,
}

impl<St> Service<Payload> for PutPayload<St>
where
    St: KeyedStore,
{
    type Out = Result<Key, Error>;

    async fn execute(&self, payload: Payload) -> Self::Out {
        let key = Key::generate();
        self.store.put(key.as_str(), payload.to_bytes(), None).await?;
        Ok(key)
    }
}

type SharedStore<S> = Arc<StoreWrapper<S>>;

/// A key-value cache whose `store` operation is counted and recorded.
///
/// Every [`store`](Self::store) call increments the `store` counter, appends its
/// argument tuple to `store:inputs`, writes the value under a fresh random [`Key`],
/// and appends that key to `store:outputs`. [`replay`](Self::replay) turns the
/// recorded history back into a readable trace.
///
/// All store calls are bounded by the configured timeout and fail with
/// [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable) when it elapses.
///
/// # Examples
///
/// ```
/// use tally::{InMemoryStore, InstrumentedCache, OperationId};
/// use tick::Clock;
///
/// # futures::executor::block_on(async {
/// let clock = Clock::new_frozen();
/// let cache = InstrumentedCache::new(InMemoryStore::new(clock.clone()), clock);
///
/// let key = cache.store("hello").await?;
/// assert_eq!(cache.get_as_string(&key).await?.as_deref(), Some("hello"));
/// assert_eq!(cache.call_count(&OperationId::STORE).await?, 1);
/// # Ok::<(), tally::Error>(())
/// # });
/// ```
#[derive(Debug)]
pub struct InstrumentedCache<S> {
    store: SharedStore<S>,
    store_op: Instrumented<PutPayload<SharedStore<S>>, SharedStore<S>>,
}

impl<S> InstrumentedCache<S>
where
    S: KeyedStore,
{
    /// Creates a cache over `store` with default settings.
    #[must_use]
    pub fn new(store: S, clock: Clock) -> Self {
        Self::builder(store, clock).build()
    }

    /// Creates a builder for a cache over `store`.
    ///
    /// `clock` drives the per-call store timeout.
    #[must_use]
    pub fn builder(store: S, clock: Clock) -> InstrumentedCacheBuilder<S> {
        InstrumentedCacheBuilder::new(store, clock)
    }

    pub(crate) fn from_store(store: StoreWrapper<S>) -> Self {
        let store = Arc::new(store);
        let put = PutPayload { store: Arc::clone(&store) };

        Self {
            store_op: instrument(Arc::clone(&store), OperationId::STORE, put),
            store,
        }
    }

    /// Stores `data` under a freshly generated key and returns the key.
    ///
    /// The call is counted under `store` before anything else happens, and its input
    /// is recorded before the value is written. If the write fails, the input stays
    /// recorded without an output.
    ///
    /// # Errors
    ///
    /// Fails with a store error if any of the counter, history or value writes fails.
    pub async fn store(&self, data: impl Into<Payload>) -> Result<Key, Error> {
        self.store_op.execute(data.into()).await
    }

    /// Returns the raw bytes stored under `key`, or `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable.
    pub async fn get(&self, key: impl AsRef<str>) -> Result<Option<Vec<u8>>, Error> {
        self.store.get(key.as_ref()).await
    }

    /// Returns the value under `key` converted by `decode`.
    ///
    /// `decode` runs only when a value is present.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable, or with whatever `decode`
    /// returns.
    pub async fn get_with<T, F>(&self, key: impl AsRef<str>, decode: F) -> Result<Option<T>, Error>
    where
        F: FnOnce(Vec<u8>) -> Result<T, Error>,
    {
        self.get(key).await?.map(decode).transpose()
    }

    /// Returns the value under `key` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails with a decode error if the value is not valid UTF-8.
    pub async fn get_as_string(&self, key: impl AsRef<str>) -> Result<Option<String>, Error> {
        self.get_with(key, decode::utf8).await
    }

    /// Returns the value under `key` as an integer.
    ///
    /// # Errors
    ///
    /// Fails with a decode error if the value is not an integer literal.
    pub async fn get_as_integer(&self, key: impl AsRef<str>) -> Result<Option<i64>, Error> {
        self.get_with(key, decode::integer).await
    }

    /// Returns the value under `key` as a float.
    ///
    /// # Errors
    ///
    /// Fails with a decode error if the value is not a numeric literal.
    pub async fn get_as_float(&self, key: impl AsRef<str>) -> Result<Option<f64>, Error> {
        self.get_with(key, decode::float).await
    }

    /// Returns how many times `operation` has been called, or 0 if never.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable, or a decode error if the
    /// counter was overwritten with a non-integer.
    pub async fn call_count(&self, operation: &OperationId) -> Result<i64, Error> {
        Ok(self
            .get_with(operation.counter_key(), decode::integer)
            .await?
            .unwrap_or_default())
    }

    /// Returns the recorded call trace of `operation`.
    ///
    /// # Errors
    ///
    /// See [`Replayer::replay`].
    pub async fn replay(&self, operation: &OperationId) -> Result<Replay, Error> {
        Replayer::new(self.store.as_ref()).replay(operation).await
    }

    /// Removes every value, counter and history list from the store.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable.
    pub async fn flush_all(&self) -> Result<(), Error> {
        self.store.flush_all().await
    }

    /// Returns the bounded, logging store the cache writes through.
    #[must_use]
    pub fn store_handle(&self) -> &StoreWrapper<S> {
        &self.store
    }
}
