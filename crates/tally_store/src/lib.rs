// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Keyed byte store abstraction for building tally backends.
//!
//! This crate defines the [`KeyedStore`] trait that every backing store must satisfy,
//! along with [`Entry`] for payloads with an optional expiry and the [`Error`] type
//! shared by all tally crates.
//!
//! # Overview
//!
//! A keyed store maps opaque string keys to raw byte payloads with an optional
//! time-to-live, and additionally offers atomic counters and append-only lists. Those
//! three primitives are all the `tally` crate needs to count calls, record call history
//! and cache fetched pages.
//!
//! # Implementing a Store
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//! use std::time::Duration;
//!
//! use tally_store::{Error, KeyedStore};
//!
//! #[derive(Default)]
//! struct SimpleStore {
//!     values: Mutex<HashMap<String, Vec<u8>>>,
//!     lists: Mutex<HashMap<String, Vec<Vec<u8>>>>,
//! }
//!
//! impl KeyedStore for SimpleStore {
//!     async fn put(&self, key: &str, payload: Vec<u8>, _ttl: Option<Duration>) -> Result<(), Error> {
//!         self.values.lock().unwrap().insert(key.to_owned(), payload);
//!         Ok(())
//!     }
//!
//!     async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
//!         Ok(self.values.lock().unwrap().get(key).cloned())
//!     }
//!
//!     async fn increment(&self, key: &str) -> Result<i64, Error> {
//!         let mut values = self.values.lock().unwrap();
//!         let current = match values.get(key) {
//!             Some(raw) => std::str::from_utf8(raw)
//!                 .ok()
//!                 .and_then(|text| text.parse::<i64>().ok())
//!                 .ok_or_else(|| Error::decode("value is not an integer"))?,
//!             None => 0,
//!         };
//!         values.insert(key.to_owned(), (current + 1).to_string().into_bytes());
//!         Ok(current + 1)
//!     }
//!
//!     async fn append_to_list(&self, key: &str, item: Vec<u8>) -> Result<(), Error> {
//!         self.lists.lock().unwrap().entry(key.to_owned()).or_default().push(item);
//!         Ok(())
//!     }
//!
//!     async fn read_list(&self, key: &str) -> Result<Vec<Vec<u8>>, Error> {
//!         Ok(self.lists.lock().unwrap().get(key).cloned().unwrap_or_default())
//!     }
//!
//!     async fn flush_all(&self) -> Result<(), Error> {
//!         self.values.lock().unwrap().clear();
//!         self.lists.lock().unwrap().clear();
//!         Ok(())
//!     }
//! }
//! ```

mod entry;
pub mod error;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use entry::Entry;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use store::KeyedStore;
