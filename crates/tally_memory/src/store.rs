// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process store with lazy, clock-driven expiry.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tally_store::{Entry, Error, KeyedStore};
use tick::Clock;

use crate::builder::InMemoryStoreBuilder;

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    lists: HashMap<String, Vec<Vec<u8>>>,
}

impl State {
    /// Returns the live entry under `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str, clock: &Clock) -> Option<&Entry> {
        if self.entries.get(key).is_some_and(|entry| entry.is_expired(clock.system_time())) {
            self.entries.remove(key);
        }
        self.entries.get(key)
    }
}

/// An in-process [`KeyedStore`].
///
/// Values, counters and lists live behind a single mutex, so every operation is atomic
/// with respect to every other. Expiry is evaluated against the [`Clock`] supplied at
/// construction.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tally_memory::InMemoryStore;
/// use tally_store::KeyedStore;
/// use tick::ClockControl;
///
/// # futures::executor::block_on(async {
/// let control = ClockControl::new();
/// let store = InMemoryStore::new(control.to_clock());
///
/// store.put("page", b"<html/>".to_vec(), Some(Duration::from_secs(10))).await?;
/// control.advance(Duration::from_secs(10));
///
/// assert_eq!(store.get("page").await?, None);
/// # Ok::<(), tally_store::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Clock,
    name: Option<Arc<str>>,
}

impl InMemoryStore {
    /// Creates an empty store that evaluates TTLs against `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::builder(clock).build()
    }

    /// Creates a new builder for configuring an in-memory store.
    #[must_use]
    pub fn builder(clock: Clock) -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::new(clock)
    }

    pub(crate) fn from_builder(builder: InMemoryStoreBuilder) -> Self {
        let entries = builder.initial_capacity.map(HashMap::with_capacity).unwrap_or_default();

        Self {
            state: Arc::new(Mutex::new(State {
                entries,
                lists: HashMap::new(),
            })),
            clock: builder.clock,
            name: builder.name.map(Arc::from),
        }
    }

    /// Returns the configured name of this store, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Physically removes every expired entry and returns how many were dropped.
    ///
    /// Reads never depend on this: expired entries already behave as absent.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.system_time();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - state.entries.len();
        drop(state);

        tracing::debug!(store.name = self.name(), purged, "purged expired entries");
        purged
    }
}

impl KeyedStore for InMemoryStore {
    async fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), Error> {
        let entry = match ttl {
            Some(ttl) => Entry::with_ttl(payload, ttl, self.clock.system_time()),
            None => Entry::new(payload),
        };
        self.state.lock().entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut state = self.state.lock();
        Ok(state.live(key, &self.clock).map(|entry| entry.payload().to_vec()))
    }

    async fn increment(&self, key: &str) -> Result<i64, Error> {
        let mut state = self.state.lock();
        let (current, expires_at) = match state.live(key, &self.clock) {
            Some(entry) => (parse_counter(entry.payload())?, entry.expires_at()),
            None => (0, None),
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| Error::decode(format!("counter '{key}' would overflow")))?;

        state
            .entries
            .insert(key.to_owned(), Entry::with_expires_at(next.to_string().into_bytes(), expires_at));
        Ok(next)
    }

    async fn append_to_list(&self, key: &str, item: Vec<u8>) -> Result<(), Error> {
        self.state.lock().lists.entry(key.to_owned()).or_default().push(item);
        Ok(())
    }

    async fn read_list(&self, key: &str) -> Result<Vec<Vec<u8>>, Error> {
        Ok(self.state.lock().lists.get(key).cloned().unwrap_or_default())
    }

    async fn flush_all(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.entries.clear();
        state.lists.clear();
        drop(state);

        tracing::debug!(store.name = self.name(), "flushed all keys");
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        let state = self.state.lock();
        Some((state.entries.len() + state.lists.len()) as u64)
    }
}

fn parse_counter(raw: &[u8]) -> Result<i64, Error> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| Error::decode("value is not an integer"))
}
