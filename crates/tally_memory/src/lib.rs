// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process keyed store with clock-driven expiry.
//!
//! This crate provides [`InMemoryStore`], a [`KeyedStore`](tally_store::KeyedStore)
//! that keeps values, counters and lists in process memory. TTLs are evaluated against
//! a [`tick::Clock`], so tests control expiry by advancing a `ClockControl` instead of
//! sleeping.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use tally_memory::InMemoryStore;
//! use tally_store::KeyedStore;
//! use tick::Clock;
//!
//! # futures::executor::block_on(async {
//! let store = InMemoryStore::builder(Clock::new_frozen())
//!     .name("pages")
//!     .build();
//!
//! store.put("key", b"42".to_vec(), Some(Duration::from_secs(10))).await?;
//! assert_eq!(store.get("key").await?, Some(b"42".to_vec()));
//! # Ok::<(), tally_store::Error>(())
//! # });
//! ```
//!
//! # Semantics
//!
//! - **Lazy expiry**: an expired entry is reported absent on read and dropped at that
//!   point; [`InMemoryStore::purge_expired`] drops all of them at once.
//! - **Shared namespace**: counters are stored as decimal text next to ordinary values,
//!   so `get` on a counter key returns its current count.
//! - **Thread-safe**: clones share state and may be used from many tasks at once.

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use store::InMemoryStore;
