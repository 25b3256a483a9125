// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides `MockStore`, an in-memory store that records all
//! operations and supports failure injection for testing error paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{Error, KeyedStore};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A put operation with the given key, payload and TTL.
    Put {
        /// The key that was written.
        key: String,
        /// The bytes that were written.
        payload: Vec<u8>,
        /// The requested TTL.
        ttl: Option<Duration>,
    },
    /// A get operation was performed with the given key.
    Get(String),
    /// An increment operation was performed with the given key.
    Increment(String),
    /// An append operation with the given list key and item.
    Append {
        /// The list key.
        key: String,
        /// The appended item.
        item: Vec<u8>,
    },
    /// A read of the list under the given key.
    ReadList(String),
    /// A flush of all state.
    FlushAll,
}

impl StoreOp {
    /// Returns the key the operation targeted, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Put { key, .. } | Self::Append { key, .. } => Some(key),
            Self::Get(key) | Self::Increment(key) | Self::ReadList(key) => Some(key),
            Self::FlushAll => None,
        }
    }
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

#[derive(Default)]
struct Data {
    values: HashMap<String, Vec<u8>>,
    lists: HashMap<String, Vec<Vec<u8>>>,
}

/// A configurable mock store for testing.
///
/// Values, counters and lists live in memory; TTLs are recorded but never enforced.
/// Operations matching the failure predicate fail with
/// [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable) and leave the data
/// untouched. All operations, failed or not, are recorded for later verification.
///
/// # Examples
///
/// ```
/// use tally_store::testing::{MockStore, StoreOp};
/// use tally_store::KeyedStore;
///
/// # futures::executor::block_on(async {
/// let store = MockStore::new();
///
/// store.put("key", b"42".to_vec(), None).await.unwrap();
/// assert_eq!(store.get("key").await.unwrap(), Some(b"42".to_vec()));
///
/// // Fail every list append from now on.
/// store.fail_when(|op| matches!(op, StoreOp::Append { .. }));
/// assert!(store.append_to_list("log", b"x".to_vec()).await.is_err());
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockStore {
    data: Arc<Mutex<Data>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a predicate that determines which operations fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_store::testing::{MockStore, StoreOp};
    ///
    /// let store = MockStore::new();
    ///
    /// // Fail all operations
    /// store.fail_when(|_| true);
    ///
    /// // Fail only writes to the output history of "store"
    /// store.fail_when(|op| op.key() == Some("store:outputs"));
    /// ```
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Returns the raw value under `key`, bypassing recording and failure injection.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().values.get(key).cloned()
    }

    /// Returns the list under `key`, bypassing recording and failure injection.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<Vec<u8>> {
        self.data.lock().lists.get(key).cloned().unwrap_or_default()
    }

    fn check(&self, op: StoreOp) -> Result<(), Error> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let message = format!("mock: {op:?} failed");
        self.operations.lock().push(op);

        if fail { Err(Error::store_unavailable(message)) } else { Ok(()) }
    }
}

impl KeyedStore for MockStore {
    async fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), Error> {
        self.check(StoreOp::Put {
            key: key.to_owned(),
            payload: payload.clone(),
            ttl,
        })?;
        self.data.lock().values.insert(key.to_owned(), payload);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.check(StoreOp::Get(key.to_owned()))?;
        Ok(self.data.lock().values.get(key).cloned())
    }

    async fn increment(&self, key: &str) -> Result<i64, Error> {
        self.check(StoreOp::Increment(key.to_owned()))?;
        let mut data = self.data.lock();
        let current = match data.values.get(key) {
            Some(raw) => std::str::from_utf8(raw)
                .ok()
                .and_then(|text| text.parse::<i64>().ok())
                .ok_or_else(|| Error::decode("mock: value is not an integer"))?,
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| Error::decode("mock: increment would overflow"))?;
        data.values.insert(key.to_owned(), next.to_string().into_bytes());
        Ok(next)
    }

    async fn append_to_list(&self, key: &str, item: Vec<u8>) -> Result<(), Error> {
        self.check(StoreOp::Append {
            key: key.to_owned(),
            item: item.clone(),
        })?;
        self.data.lock().lists.entry(key.to_owned()).or_default().push(item);
        Ok(())
    }

    async fn read_list(&self, key: &str) -> Result<Vec<Vec<u8>>, Error> {
        self.check(StoreOp::ReadList(key.to_owned()))?;
        Ok(self.data.lock().lists.get(key).cloned().unwrap_or_default())
    }

    async fn flush_all(&self) -> Result<(), Error> {
        self.check(StoreOp::FlushAll)?;
        let mut data = self.data.lock();
        data.values.clear();
        data.lists.clear();
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        let data = self.data.lock();
        Some((data.values.len() + data.lists.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn records_operations_in_order() {
        block_on(async {
            let store = MockStore::new();
            store.put("k", b"v".to_vec(), None).await.unwrap();
            store.get("k").await.unwrap();
            store.increment("c").await.unwrap();

            assert_eq!(
                store.operations(),
                vec![
                    StoreOp::Put {
                        key: "k".to_owned(),
                        payload: b"v".to_vec(),
                        ttl: None,
                    },
                    StoreOp::Get("k".to_owned()),
                    StoreOp::Increment("c".to_owned()),
                ]
            );
        });
    }

    #[test]
    fn failed_operation_is_recorded_and_leaves_data_untouched() {
        block_on(async {
            let store = MockStore::new();
            store.fail_when(|op| matches!(op, StoreOp::Put { .. }));

            let err = store.put("k", b"v".to_vec(), None).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
            assert_eq!(store.operations().len(), 1);
            assert!(store.value("k").is_none());

            store.clear_failures();
            store.put("k", b"v".to_vec(), None).await.unwrap();
            assert_eq!(store.value("k"), Some(b"v".to_vec()));
        });
    }

    #[test]
    fn increment_counts_from_zero_and_is_readable() {
        block_on(async {
            let store = MockStore::new();
            assert_eq!(store.increment("c").await.unwrap(), 1);
            assert_eq!(store.increment("c").await.unwrap(), 2);
            assert_eq!(store.get("c").await.unwrap(), Some(b"2".to_vec()));
        });
    }

    #[test]
    fn increment_on_text_is_a_decode_error() {
        block_on(async {
            let store = MockStore::new();
            store.put("c", b"hello".to_vec(), None).await.unwrap();
            assert_eq!(store.increment("c").await.unwrap_err().kind(), ErrorKind::Decode);
        });
    }

    #[test]
    fn op_key_reports_target() {
        assert_eq!(StoreOp::Get("a".to_owned()).key(), Some("a"));
        assert_eq!(StoreOp::FlushAll.key(), None);
    }
}
