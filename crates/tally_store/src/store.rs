// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for backing stores.
//!
//! [`KeyedStore`] defines the interface every backend implements. The trait is
//! designed for composition: implement the storage primitives, then use `tally`
//! to layer timeouts, logging, call counting and call history on top.

use std::{sync::Arc, time::Duration};

use crate::Error;

/// Trait for keyed byte stores.
///
/// All six operations are required. Implementations must treat an entry whose TTL has
/// elapsed as absent, whether or not it has been physically purged yet.
///
/// Operations that cannot reach the backing store fail with
/// [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable). Callers must
/// not swallow that error.
pub trait KeyedStore: Send + Sync {
    /// Stores `payload` under `key`, replacing any previous value and its TTL.
    fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the payload under `key`, or `None` if it is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send;

    /// Atomically increments the counter under `key`, starting from 0, and returns the new value.
    fn increment(&self, key: &str) -> impl Future<Output = Result<i64, Error>> + Send;

    /// Appends `item` to the end of the list under `key`, creating the list if needed.
    fn append_to_list(&self, key: &str, item: Vec<u8>) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the whole list under `key` in append order, or an empty list if absent.
    fn read_list(&self, key: &str) -> impl Future<Output = Result<Vec<Vec<u8>>, Error>> + Send;

    /// Removes every value, counter and list.
    fn flush_all(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the number of stored keys, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store holds no keys.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<S> KeyedStore for Arc<S>
where
    S: KeyedStore,
{
    fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).put(key, payload, ttl)
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send {
        (**self).get(key)
    }

    fn increment(&self, key: &str) -> impl Future<Output = Result<i64, Error>> + Send {
        (**self).increment(key)
    }

    fn append_to_list(&self, key: &str, item: Vec<u8>) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).append_to_list(key, item)
    }

    fn read_list(&self, key: &str) -> impl Future<Output = Result<Vec<Vec<u8>>, Error>> + Send {
        (**self).read_list(key)
    }

    fn flush_all(&self) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).flush_all()
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}

impl<S> KeyedStore for &S
where
    S: KeyedStore,
{
    fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).put(key, payload, ttl)
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send {
        (**self).get(key)
    }

    fn increment(&self, key: &str) -> impl Future<Output = Result<i64, Error>> + Send {
        (**self).increment(key)
    }

    fn append_to_list(&self, key: &str, item: Vec<u8>) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).append_to_list(key, item)
    }

    fn read_list(&self, key: &str) -> impl Future<Output = Result<Vec<Vec<u8>>, Error>> + Send {
        (**self).read_list(key)
    }

    fn flush_all(&self) -> impl Future<Output = Result<(), Error>> + Send {
        (**self).flush_all()
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}
